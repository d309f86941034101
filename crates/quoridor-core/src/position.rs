use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{FenceLayout, Walls};
use crate::constants::{
    BOARD_SIZE, FENCES_PER_PLAYER, FENCE_GRID_SIZE, PLAYER_ONE_START, PLAYER_TWO_START,
};
use crate::movegen::{generate_legal_moves, LegalMoveSet};
use crate::types::{FenceOrientation, FenceSlot, Move, Player, Square};
use crate::zobrist::zobrist_keys;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PositionError {
    #[error("illegal application: {0}")]
    IllegalApplication(&'static str),
}

/// Immutable game snapshot. Every move produces a new value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub vertical_fences: u64,
    pub horizontal_fences: u64,
    pub player_one: Square,
    pub player_two: Square,
    pub player_one_fences: u8,
    pub player_two_fences: u8,
    pub side_to_move: Player,
}

impl Position {
    pub const fn new() -> Self {
        Self {
            vertical_fences: 0,
            horizontal_fences: 0,
            player_one: PLAYER_ONE_START,
            player_two: PLAYER_TWO_START,
            player_one_fences: FENCES_PER_PLAYER,
            player_two_fences: FENCES_PER_PLAYER,
            side_to_move: Player::One,
        }
    }

    pub const fn fences(&self) -> FenceLayout {
        FenceLayout::new(self.vertical_fences, self.horizontal_fences)
    }

    pub fn walls(&self) -> Walls {
        Walls::from_layout(&self.fences())
    }

    pub const fn pawn(&self, player: Player) -> Square {
        match player {
            Player::One => self.player_one,
            Player::Two => self.player_two,
        }
    }

    pub const fn fences_left(&self, player: Player) -> u8 {
        match player {
            Player::One => self.player_one_fences,
            Player::Two => self.player_two_fences,
        }
    }

    pub fn legal_moves(&self) -> LegalMoveSet {
        generate_legal_moves(self)
    }

    pub const fn is_terminal(&self) -> bool {
        self.winner().is_some()
    }

    pub const fn winner(&self) -> Option<Player> {
        if self.player_one.row == Player::One.goal_row() {
            Some(Player::One)
        } else if self.player_two.row == Player::Two.goal_row() {
            Some(Player::Two)
        } else {
            None
        }
    }

    pub fn zobrist_hash(&self) -> u64 {
        zobrist_keys().hash_position(self)
    }

    /// Applies `mv` for the side to move. Only cheap invariants are checked;
    /// callers are expected to pass moves from [`Position::legal_moves`].
    pub fn apply(&self, mv: &Move) -> Result<Self, PositionError> {
        let mover = self.side_to_move;
        let mut next = *self;

        match *mv {
            Move::Pawn { from, to } => {
                if from != self.pawn(mover) {
                    return Err(PositionError::IllegalApplication(
                        "pawn origin is not the mover's square",
                    ));
                }
                if Square::new(to.row, to.col).is_none() {
                    return Err(PositionError::IllegalApplication(
                        "pawn destination is off the board",
                    ));
                }
                *next.pawn_mut(mover) = to;
            }
            Move::Fence { orientation, slot } => {
                check_slot(slot)?;
                if self.fences().is_set(orientation, slot) {
                    return Err(PositionError::IllegalApplication("fence slot is occupied"));
                }
                let count = next.fences_left_mut(mover);
                if *count == 0 {
                    return Err(PositionError::IllegalApplication("no fences left to place"));
                }
                *count -= 1;
                *next.fence_mask_mut(orientation) |= slot.mask();
            }
        }

        next.side_to_move = mover.opponent();
        Ok(next)
    }

    /// Exact inverse of [`Position::apply`] for the move that produced `self`.
    pub fn unapply(&self, mv: &Move) -> Result<Self, PositionError> {
        let mover = self.side_to_move.opponent();
        let mut prev = *self;

        match *mv {
            Move::Pawn { from, to } => {
                if to != self.pawn(mover) {
                    return Err(PositionError::IllegalApplication(
                        "pawn destination is not the previous mover's square",
                    ));
                }
                if Square::new(from.row, from.col).is_none() {
                    return Err(PositionError::IllegalApplication(
                        "pawn origin is off the board",
                    ));
                }
                *prev.pawn_mut(mover) = from;
            }
            Move::Fence { orientation, slot } => {
                check_slot(slot)?;
                if !self.fences().is_set(orientation, slot) {
                    return Err(PositionError::IllegalApplication("no fence in this slot"));
                }
                let count = prev.fences_left_mut(mover);
                if *count >= FENCES_PER_PLAYER {
                    return Err(PositionError::IllegalApplication(
                        "fence count already at maximum",
                    ));
                }
                *count += 1;
                *prev.fence_mask_mut(orientation) &= !slot.mask();
            }
        }

        prev.side_to_move = mover;
        Ok(prev)
    }

    fn pawn_mut(&mut self, player: Player) -> &mut Square {
        match player {
            Player::One => &mut self.player_one,
            Player::Two => &mut self.player_two,
        }
    }

    fn fences_left_mut(&mut self, player: Player) -> &mut u8 {
        match player {
            Player::One => &mut self.player_one_fences,
            Player::Two => &mut self.player_two_fences,
        }
    }

    fn fence_mask_mut(&mut self, orientation: FenceOrientation) -> &mut u64 {
        match orientation {
            FenceOrientation::Vertical => &mut self.vertical_fences,
            FenceOrientation::Horizontal => &mut self.horizontal_fences,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

fn check_slot(slot: FenceSlot) -> Result<(), PositionError> {
    if FenceSlot::new(slot.row, slot.col).is_none() {
        return Err(PositionError::IllegalApplication(
            "fence slot is off the board",
        ));
    }
    Ok(())
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let layout = self.fences();
        let grid = FENCE_GRID_SIZE;

        write!(f, "  ")?;
        for col in 0..BOARD_SIZE {
            write!(f, " {}  ", char::from(b'a' + col))?;
        }
        writeln!(f)?;

        for row in 0..BOARD_SIZE {
            write!(f, "{} ", BOARD_SIZE - row)?;
            for col in 0..BOARD_SIZE {
                let square = Square::new_unchecked(row, col);
                let cell = if square == self.player_one {
                    '1'
                } else if square == self.player_two {
                    '2'
                } else {
                    '.'
                };
                write!(f, " {cell} ")?;

                if col < grid {
                    let above = row > 0
                        && layout.is_set(
                            FenceOrientation::Vertical,
                            FenceSlot::new_unchecked(row - 1, col),
                        );
                    let below = row < grid
                        && layout.is_set(
                            FenceOrientation::Vertical,
                            FenceSlot::new_unchecked(row, col),
                        );
                    write!(f, "{}", if above || below { '|' } else { ' ' })?;
                }
            }
            writeln!(f)?;

            if row < grid {
                write!(f, "  ")?;
                for col in 0..BOARD_SIZE {
                    let here = col < grid
                        && layout.is_set(
                            FenceOrientation::Horizontal,
                            FenceSlot::new_unchecked(row, col),
                        );
                    let left = col > 0
                        && layout.is_set(
                            FenceOrientation::Horizontal,
                            FenceSlot::new_unchecked(row, col - 1),
                        );
                    write!(f, "{}", if here || left { "---" } else { "   " })?;
                    if col < grid {
                        let joint = here
                            || layout.is_set(
                                FenceOrientation::Vertical,
                                FenceSlot::new_unchecked(row, col),
                            );
                        let symbol = if here {
                            '-'
                        } else if joint {
                            '|'
                        } else {
                            ' '
                        };
                        write!(f, "{symbol}")?;
                    }
                }
                writeln!(f)?;
            }
        }

        writeln!(
            f,
            "fences: 1={} 2={}",
            self.player_one_fences, self.player_two_fences
        )?;
        write!(f, "to move: {}", self.side_to_move.to_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_position_layout() {
        let position = Position::new();
        assert_eq!(position.player_one, Square::new_unchecked(8, 4));
        assert_eq!(position.player_two, Square::new_unchecked(0, 4));
        assert_eq!(position.player_one_fences, 10);
        assert_eq!(position.player_two_fences, 10);
        assert_eq!(position.side_to_move, Player::One);
        assert_eq!(position.fences().count(), 0);
        assert!(!position.is_terminal());
    }

    #[test]
    fn apply_pawn_rejects_wrong_origin() {
        let position = Position::new();
        let mv = Move::pawn(Square::new_unchecked(7, 4), Square::new_unchecked(6, 4));
        assert!(matches!(
            position.apply(&mv),
            Err(PositionError::IllegalApplication(_))
        ));
    }

    #[test]
    fn apply_fence_decrements_mover_count() {
        let position = Position::new();
        let slot = FenceSlot::new_unchecked(2, 2);
        let next = position
            .apply(&Move::fence(FenceOrientation::Vertical, slot))
            .unwrap();
        assert_eq!(next.player_one_fences, 9);
        assert_eq!(next.player_two_fences, 10);
        assert_eq!(next.vertical_fences, slot.mask());
        assert_eq!(next.side_to_move, Player::Two);
    }

    #[test]
    fn fence_apply_fails_without_fences() {
        let position = Position {
            player_one_fences: 0,
            ..Position::new()
        };
        let mv = Move::fence(FenceOrientation::Horizontal, FenceSlot::new_unchecked(0, 0));
        assert_eq!(
            position.apply(&mv),
            Err(PositionError::IllegalApplication("no fences left to place"))
        );
    }

    #[test]
    fn unapply_restores_previous_snapshot() {
        let position = Position::new();
        let mv = Move::fence(FenceOrientation::Horizontal, FenceSlot::new_unchecked(5, 1));
        let next = position.apply(&mv).unwrap();
        assert_eq!(next.unapply(&mv).unwrap(), position);
        assert!(position.unapply(&mv).is_err());
    }

    #[test]
    fn winner_detection() {
        let position = Position {
            player_one: Square::new_unchecked(0, 3),
            ..Position::new()
        };
        assert_eq!(position.winner(), Some(Player::One));

        let position = Position {
            player_two: Square::new_unchecked(8, 0),
            side_to_move: Player::One,
            ..Position::new()
        };
        assert_eq!(position.winner(), Some(Player::Two));
    }

    #[test]
    fn display_marks_pawns_and_fences() {
        let position = Position::new()
            .apply(&Move::fence(
                FenceOrientation::Horizontal,
                FenceSlot::new_unchecked(0, 0),
            ))
            .unwrap();
        let text = position.to_string();
        assert!(text.contains(" 1 "));
        assert!(text.contains(" 2 "));
        assert!(text.contains("------"));
        assert!(text.ends_with("to move: 2"));
    }
}
