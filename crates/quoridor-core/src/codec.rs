//! Fixed-size encodings for positions and moves.
//!
//! The position layout is 23 bytes, little-endian:
//! `vertical(8) horizontal(8) p1_row p1_col p2_row p2_col p1_fences p2_fences side`.
//! A move is a kind tag plus a payload holding either one pawn direction bit
//! or a fence mask with exactly one set bit.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::FenceLayout;
use crate::constants::FENCES_PER_PLAYER;
use crate::position::Position;
use crate::types::{FenceOrientation, FenceSlot, Move, PawnDirection, Player, Square};

pub const ENCODED_POSITION_LEN: usize = 23;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid move: {0}")]
    InvalidMove(&'static str),
    #[error("malformed position: {0}")]
    MalformedPosition(&'static str),
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKind {
    VerticalFence = 1,
    HorizontalFence = 2,
    Pawn = 3,
}

impl MoveKind {
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::VerticalFence),
            2 => Some(Self::HorizontalFence),
            3 => Some(Self::Pawn),
            _ => None,
        }
    }

    pub const fn to_code(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncodedMove {
    pub kind: MoveKind,
    pub payload: u64,
}

pub fn encode_position(position: &Position) -> [u8; ENCODED_POSITION_LEN] {
    let mut out = [0u8; ENCODED_POSITION_LEN];
    out[0..8].copy_from_slice(&position.vertical_fences.to_le_bytes());
    out[8..16].copy_from_slice(&position.horizontal_fences.to_le_bytes());
    out[16] = position.player_one.row;
    out[17] = position.player_one.col;
    out[18] = position.player_two.row;
    out[19] = position.player_two.col;
    out[20] = position.player_one_fences;
    out[21] = position.player_two_fences;
    out[22] = position.side_to_move.to_code();
    out
}

pub fn decode_position(bytes: &[u8]) -> Result<Position, CodecError> {
    if bytes.len() != ENCODED_POSITION_LEN {
        return Err(CodecError::MalformedPosition("expected 23 bytes"));
    }

    let vertical_fences = read_u64(&bytes[0..8]);
    let horizontal_fences = read_u64(&bytes[8..16]);
    if !FenceLayout::new(vertical_fences, horizontal_fences).is_consistent() {
        return Err(CodecError::MalformedPosition("overlapping fences"));
    }

    let player_one = Square::new(bytes[16], bytes[17])
        .ok_or(CodecError::MalformedPosition("player one off the board"))?;
    let player_two = Square::new(bytes[18], bytes[19])
        .ok_or(CodecError::MalformedPosition("player two off the board"))?;
    if player_one == player_two {
        return Err(CodecError::MalformedPosition("pawns share a square"));
    }

    let player_one_fences = bytes[20];
    let player_two_fences = bytes[21];
    if player_one_fences > FENCES_PER_PLAYER || player_two_fences > FENCES_PER_PLAYER {
        return Err(CodecError::MalformedPosition("fence count out of range"));
    }

    let side_to_move = Player::from_code(bytes[22])
        .ok_or(CodecError::MalformedPosition("unknown side to move"))?;

    Ok(Position {
        vertical_fences,
        horizontal_fences,
        player_one,
        player_two,
        player_one_fences,
        player_two_fences,
        side_to_move,
    })
}

pub fn encode_move(mv: &Move) -> Result<EncodedMove, CodecError> {
    match *mv {
        Move::Pawn { .. } => {
            let dir = mv
                .pawn_direction()
                .ok_or(CodecError::InvalidMove("pawn delta has no direction class"))?;
            Ok(EncodedMove {
                kind: MoveKind::Pawn,
                payload: u64::from(dir.bit()),
            })
        }
        Move::Fence { orientation, slot } => {
            if FenceSlot::new(slot.row, slot.col).is_none() {
                return Err(CodecError::InvalidMove("fence slot off the board"));
            }
            let kind = match orientation {
                FenceOrientation::Vertical => MoveKind::VerticalFence,
                FenceOrientation::Horizontal => MoveKind::HorizontalFence,
            };
            Ok(EncodedMove {
                kind,
                payload: slot.mask(),
            })
        }
    }
}

/// Decodes `encoded` relative to `position`; pawn moves start from the side
/// to move's square.
pub fn decode_move(position: &Position, encoded: EncodedMove) -> Result<Move, CodecError> {
    match encoded.kind {
        MoveKind::Pawn => {
            let bits = u16::try_from(encoded.payload)
                .map_err(|_| CodecError::InvalidMove("pawn payload wider than 16 bits"))?;
            let dir = PawnDirection::from_bit(bits)
                .ok_or(CodecError::InvalidMove("pawn payload is not one direction"))?;
            let from = position.pawn(position.side_to_move);
            let (d_row, d_col) = dir.delta();
            let to = from
                .offset(d_row, d_col)
                .ok_or(CodecError::InvalidMove("pawn destination off the board"))?;
            Ok(Move::pawn(from, to))
        }
        MoveKind::VerticalFence | MoveKind::HorizontalFence => {
            let slot = decode_fence_mask(encoded.payload)?;
            let orientation = if encoded.kind == MoveKind::VerticalFence {
                FenceOrientation::Vertical
            } else {
                FenceOrientation::Horizontal
            };
            Ok(Move::fence(orientation, slot))
        }
    }
}

pub fn decode_fence_mask(mask: u64) -> Result<FenceSlot, CodecError> {
    if mask.count_ones() != 1 {
        return Err(CodecError::InvalidMove("fence mask must have exactly one bit"));
    }
    FenceSlot::from_index(mask.trailing_zeros())
        .ok_or(CodecError::InvalidMove("fence index out of range"))
}

fn read_u64(bytes: &[u8]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(bytes);
    u64::from_le_bytes(buf)
}
