use std::sync::LazyLock;

use crate::constants::{FENCES_PER_PLAYER, NUM_FENCE_SLOTS, NUM_SQUARES};
use crate::position::Position;
use crate::types::{FenceOrientation, Player, Square};

const FENCE_COUNT_KEYS: usize = FENCES_PER_PLAYER as usize + 1;

static ZOBRIST_KEYS: LazyLock<ZobristKeys> = LazyLock::new(ZobristKeys::new);

#[derive(Debug, Clone)]
pub struct ZobristKeys {
    fences: [[u64; NUM_FENCE_SLOTS]; 2],
    pawns: [[u64; NUM_SQUARES]; 2],
    fence_counts: [[u64; FENCE_COUNT_KEYS]; 2],
    side_to_move: u64,
}

pub fn zobrist_keys() -> &'static ZobristKeys {
    &ZOBRIST_KEYS
}

impl ZobristKeys {
    fn new() -> Self {
        let mut state = 0x9E37_79B9_7F4A_7C15u64;

        let mut fences = [[0u64; NUM_FENCE_SLOTS]; 2];
        for key in fences.iter_mut().flatten() {
            *key = next_u64(&mut state);
        }

        let mut pawns = [[0u64; NUM_SQUARES]; 2];
        for key in pawns.iter_mut().flatten() {
            *key = next_u64(&mut state);
        }

        let mut fence_counts = [[0u64; FENCE_COUNT_KEYS]; 2];
        for key in fence_counts.iter_mut().flatten() {
            *key = next_u64(&mut state);
        }

        Self {
            fences,
            pawns,
            fence_counts,
            side_to_move: next_u64(&mut state),
        }
    }

    pub fn fence_key(&self, orientation: FenceOrientation, slot_index: u32) -> u64 {
        let table = match orientation {
            FenceOrientation::Vertical => &self.fences[0],
            FenceOrientation::Horizontal => &self.fences[1],
        };
        table[slot_index as usize % NUM_FENCE_SLOTS]
    }

    pub fn pawn_key(&self, player: Player, square: Square) -> u64 {
        self.pawns[player.index()][square.index() % NUM_SQUARES]
    }

    pub fn fence_count_key(&self, player: Player, count: u8) -> u64 {
        self.fence_counts[player.index()][usize::from(count).min(FENCE_COUNT_KEYS - 1)]
    }

    pub fn side_to_move_key(&self) -> u64 {
        self.side_to_move
    }

    pub fn hash_position(&self, position: &Position) -> u64 {
        let mut hash = 0u64;

        for (orientation, mask) in [
            (FenceOrientation::Vertical, position.vertical_fences),
            (FenceOrientation::Horizontal, position.horizontal_fences),
        ] {
            let mut bits = mask;
            while bits != 0 {
                hash ^= self.fence_key(orientation, bits.trailing_zeros());
                bits &= bits - 1;
            }
        }

        for player in [Player::One, Player::Two] {
            hash ^= self.pawn_key(player, position.pawn(player));
            hash ^= self.fence_count_key(player, position.fences_left(player));
        }

        if position.side_to_move == Player::Two {
            hash ^= self.side_to_move;
        }

        hash
    }
}

fn next_u64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9E37_79B9_7F4A_7C15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{FenceSlot, Move};

    #[test]
    fn hash_is_stable_across_apply_unapply() {
        let position = Position::new();
        let mv = Move::fence(FenceOrientation::Vertical, FenceSlot::new_unchecked(4, 4));
        let next = position.apply(&mv).unwrap();
        assert_ne!(position.zobrist_hash(), next.zobrist_hash());
        assert_eq!(
            next.unapply(&mv).unwrap().zobrist_hash(),
            position.zobrist_hash()
        );
    }

    #[test]
    fn side_to_move_changes_hash() {
        let position = Position::new();
        let flipped = Position {
            side_to_move: Player::Two,
            ..position
        };
        assert_eq!(
            position.zobrist_hash() ^ flipped.zobrist_hash(),
            zobrist_keys().side_to_move_key()
        );
    }
}
