use crate::board::{FenceLayout, Walls};
use crate::path::both_players_have_path;
use crate::position::Position;
use crate::types::{FenceOrientation, FenceSlot, Move, MoveList, PawnDirection, Square};

/// Orthogonal steps paired with their straight-jump class and the two
/// diagonal side-steps used when the jump is blocked.
const ORTHOGONAL: [(PawnDirection, PawnDirection, [PawnDirection; 2]); 4] = [
    (
        PawnDirection::North,
        PawnDirection::NorthNorth,
        [PawnDirection::NorthWest, PawnDirection::NorthEast],
    ),
    (
        PawnDirection::East,
        PawnDirection::EastEast,
        [PawnDirection::NorthEast, PawnDirection::SouthEast],
    ),
    (
        PawnDirection::West,
        PawnDirection::WestWest,
        [PawnDirection::SouthWest, PawnDirection::NorthWest],
    ),
    (
        PawnDirection::South,
        PawnDirection::SouthSouth,
        [PawnDirection::SouthEast, PawnDirection::SouthWest],
    ),
];

/// Legal moves from exactly one position, with O(1) membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegalMoveSet {
    origin: Square,
    pawn_directions: u16,
    pawn_targets: u128,
    vertical: u64,
    horizontal: u64,
    moves: MoveList,
}

impl LegalMoveSet {
    pub fn contains(&self, mv: &Move) -> bool {
        match *mv {
            Move::Pawn { from, to } => {
                from == self.origin
                    && Square::new(to.row, to.col).is_some()
                    && self.pawn_targets & to.bit() != 0
            }
            Move::Fence { orientation, slot } => {
                FenceSlot::new(slot.row, slot.col).is_some()
                    && self.fence_mask(orientation) & slot.mask() != 0
            }
        }
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Move> + '_ {
        self.moves.iter()
    }

    pub fn as_slice(&self) -> &[Move] {
        &self.moves
    }

    pub fn pawn_moves(&self) -> impl Iterator<Item = &Move> + '_ {
        self.moves.iter().filter(|mv| mv.is_pawn())
    }

    pub fn fence_moves(&self) -> impl Iterator<Item = &Move> + '_ {
        self.moves.iter().filter(|mv| mv.is_fence())
    }

    pub const fn origin(&self) -> Square {
        self.origin
    }

    /// Direction-class bits of the legal pawn moves.
    pub const fn pawn_directions(&self) -> u16 {
        self.pawn_directions
    }

    pub const fn fence_mask(&self, orientation: FenceOrientation) -> u64 {
        match orientation {
            FenceOrientation::Vertical => self.vertical,
            FenceOrientation::Horizontal => self.horizontal,
        }
    }
}

impl<'a> IntoIterator for &'a LegalMoveSet {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}

pub fn generate_legal_moves(position: &Position) -> LegalMoveSet {
    let walls = position.walls();
    let origin = position.pawn(position.side_to_move);
    let pawn_directions = generate_pawn_directions_with_walls(position, &walls);
    let (vertical, horizontal) = generate_legal_fence_masks(position);

    let mut moves = MoveList::new();
    let mut pawn_targets = 0u128;

    for dir in PawnDirection::ALL {
        if pawn_directions & dir.bit() == 0 {
            continue;
        }
        let (d_row, d_col) = dir.delta();
        if let Some(to) = origin.offset(d_row, d_col) {
            pawn_targets |= to.bit();
            moves.push(Move::pawn(origin, to));
        }
    }

    for idx in 0..64u32 {
        let Some(slot) = FenceSlot::from_index(idx) else {
            continue;
        };
        if horizontal & slot.mask() != 0 {
            moves.push(Move::fence(FenceOrientation::Horizontal, slot));
        }
        if vertical & slot.mask() != 0 {
            moves.push(Move::fence(FenceOrientation::Vertical, slot));
        }
    }

    LegalMoveSet {
        origin,
        pawn_directions,
        pawn_targets,
        vertical,
        horizontal,
        moves,
    }
}

/// Direction-class bits of the side to move's legal pawn moves.
pub fn generate_pawn_directions(position: &Position) -> u16 {
    generate_pawn_directions_with_walls(position, &position.walls())
}

fn generate_pawn_directions_with_walls(position: &Position, walls: &Walls) -> u16 {
    let mover = position.side_to_move;
    let from = position.pawn(mover);
    let opponent = position.pawn(mover.opponent());
    let mut directions = 0u16;

    for (step, jump, sides) in ORTHOGONAL {
        let (d_row, d_col) = step.delta();
        if walls.blocks(from, d_row, d_col) {
            continue;
        }
        let Some(neighbor) = from.offset(d_row, d_col) else {
            continue;
        };

        if neighbor != opponent {
            directions |= step.bit();
            continue;
        }

        if !walls.blocks(opponent, d_row, d_col) && opponent.offset(d_row, d_col).is_some() {
            directions |= jump.bit();
            continue;
        }

        for side in sides {
            let (side_row, side_col) = side.delta();
            // Step from the opponent's cell perpendicular to the approach.
            let (perp_row, perp_col) = (side_row - d_row, side_col - d_col);
            if !walls.blocks(opponent, perp_row, perp_col)
                && opponent.offset(perp_row, perp_col).is_some()
            {
                directions |= side.bit();
            }
        }
    }

    directions
}

/// Fence placements that pass the overlap rule for the side to move, ignoring
/// connectivity. Returns `(vertical, horizontal)`.
pub fn pseudo_legal_fence_masks(position: &Position) -> (u64, u64) {
    if position.fences_left(position.side_to_move) == 0 {
        return (0, 0);
    }
    let layout = position.fences();
    (layout.free_vertical_slots(), layout.free_horizontal_slots())
}

/// Fence placements that also leave both players a path to their goal row.
/// Returns `(vertical, horizontal)`.
pub fn generate_legal_fence_masks(position: &Position) -> (u64, u64) {
    let (pseudo_vertical, pseudo_horizontal) = pseudo_legal_fence_masks(position);
    let layout = position.fences();
    (
        filter_connected(position, layout, FenceOrientation::Vertical, pseudo_vertical),
        filter_connected(position, layout, FenceOrientation::Horizontal, pseudo_horizontal),
    )
}

/// Whether placing the given fence keeps a route open for both players.
pub fn fence_keeps_paths(
    position: &Position,
    orientation: FenceOrientation,
    slot: FenceSlot,
) -> bool {
    let candidate = position.fences().with_fence(orientation, slot);
    both_players_have_path(&candidate, position.player_one, position.player_two)
}

fn filter_connected(
    position: &Position,
    layout: FenceLayout,
    orientation: FenceOrientation,
    candidates: u64,
) -> u64 {
    let mut legal = 0u64;
    let mut bits = candidates;
    while bits != 0 {
        let idx = bits.trailing_zeros();
        bits &= bits - 1;
        let Some(slot) = FenceSlot::from_index(idx) else {
            continue;
        };
        // A fence touching nothing cannot close off a region by itself.
        if !touches_obstacle(layout, orientation, slot) {
            legal |= slot.mask();
            continue;
        }
        if fence_keeps_paths(position, orientation, slot) {
            legal |= slot.mask();
        }
    }
    legal
}

/// True when either end of the fence meets the board edge or another fence.
fn touches_obstacle(layout: FenceLayout, orientation: FenceOrientation, slot: FenceSlot) -> bool {
    let (row, col) = (slot.row as i8, slot.col as i8);
    let edge = match orientation {
        FenceOrientation::Vertical => row == 0 || row == 7,
        FenceOrientation::Horizontal => col == 0 || col == 7,
    };
    if edge {
        return true;
    }

    let any_fence = layout.vertical | layout.horizontal;
    for d_row in -2..=2i8 {
        for d_col in -2..=2i8 {
            let (r, c) = (row + d_row, col + d_col);
            if !(0..8).contains(&r) || !(0..8).contains(&c) {
                continue;
            }
            if any_fence & FenceSlot::new_unchecked(r as u8, c as u8).mask() != 0 {
                return true;
            }
        }
    }
    false
}
