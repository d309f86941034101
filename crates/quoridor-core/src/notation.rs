use thiserror::Error;

use crate::constants::{BOARD_SIZE, NOTATION_HORIZONTAL, NOTATION_VERTICAL};
use crate::position::Position;
use crate::types::{FenceOrientation, Move};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotationError {
    #[error("malformed notation: {0}")]
    Malformed(String),
    #[error("illegal move: {0}")]
    Illegal(String),
}

/// Renders `<row><col><suffix>`: rows count down from the far edge, fences
/// sit one row lower because their grid is 8 wide.
pub fn move_to_notation(mv: &Move) -> String {
    let (row, col, suffix) = match *mv {
        Move::Pawn { to, .. } => (BOARD_SIZE - to.row, to.col, None),
        Move::Fence { orientation, slot } => {
            let suffix = match orientation {
                FenceOrientation::Vertical => NOTATION_VERTICAL,
                FenceOrientation::Horizontal => NOTATION_HORIZONTAL,
            };
            (BOARD_SIZE - 1 - slot.row, slot.col, Some(suffix))
        }
    };

    let mut out = String::with_capacity(3);
    out.push_str(&row.to_string());
    out.push(char::from(b'a' + col));
    if let Some(suffix) = suffix {
        out.push(suffix);
    }
    out
}

/// Resolves `text` against the legal moves of `position`.
pub fn parse_notation(position: &Position, text: &str) -> Result<Move, NotationError> {
    let normalized = text.trim().to_ascii_lowercase();
    if !is_well_formed(&normalized) {
        return Err(NotationError::Malformed(text.to_string()));
    }

    position
        .legal_moves()
        .iter()
        .find(|mv| move_to_notation(mv) == normalized)
        .copied()
        .ok_or(NotationError::Illegal(normalized))
}

fn is_well_formed(text: &str) -> bool {
    let bytes = text.as_bytes();
    let (body, suffix) = match bytes.len() {
        2 => (bytes, None),
        3 => (&bytes[..2], Some(char::from(bytes[2]))),
        _ => return false,
    };
    let row_ok = (b'1'..=b'9').contains(&body[0]);
    let col_ok = (b'a'..=b'i').contains(&body[1]);
    let suffix_ok = match suffix {
        None => true,
        Some(c) => {
            (c == NOTATION_VERTICAL || c == NOTATION_HORIZONTAL)
                && body[0] != b'9'
                && body[1] != b'i'
        }
    };
    row_ok && col_ok && suffix_ok
}
