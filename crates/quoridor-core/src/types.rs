use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::constants::{BOARD_SIZE, FENCE_GRID_SIZE, PLAYER_ONE_GOAL_ROW, PLAYER_TWO_GOAL_ROW};

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One = 1,
    Two = 2,
}

impl Player {
    pub const fn opponent(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    pub const fn goal_row(self) -> u8 {
        match self {
            Self::One => PLAYER_ONE_GOAL_ROW,
            Self::Two => PLAYER_TWO_GOAL_ROW,
        }
    }

    pub const fn index(self) -> usize {
        match self {
            Self::One => 0,
            Self::Two => 1,
        }
    }

    pub const fn to_code(self) -> u8 {
        self as u8
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            _ => None,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Square {
    pub row: u8,
    pub col: u8,
}

impl Square {
    pub const fn new(row: u8, col: u8) -> Option<Self> {
        if row < BOARD_SIZE && col < BOARD_SIZE {
            Some(Self { row, col })
        } else {
            None
        }
    }

    pub const fn new_unchecked(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    pub const fn index(self) -> usize {
        self.row as usize * BOARD_SIZE as usize + self.col as usize
    }

    pub const fn bit(self) -> u128 {
        1u128 << self.index()
    }

    pub const fn from_index(index: usize) -> Option<Self> {
        if index < (BOARD_SIZE as usize * BOARD_SIZE as usize) {
            Some(Self {
                row: (index / BOARD_SIZE as usize) as u8,
                col: (index % BOARD_SIZE as usize) as u8,
            })
        } else {
            None
        }
    }

    /// Offsets the square, returning `None` when it leaves the board.
    pub fn offset(self, d_row: i8, d_col: i8) -> Option<Self> {
        let row = i16::from(self.row) + i16::from(d_row);
        let col = i16::from(self.col) + i16::from(d_col);
        if (0..i16::from(BOARD_SIZE)).contains(&row) && (0..i16::from(BOARD_SIZE)).contains(&col) {
            Some(Self::new_unchecked(row as u8, col as u8))
        } else {
            None
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FenceSlot {
    pub row: u8,
    pub col: u8,
}

impl FenceSlot {
    pub const fn new(row: u8, col: u8) -> Option<Self> {
        if row < FENCE_GRID_SIZE && col < FENCE_GRID_SIZE {
            Some(Self { row, col })
        } else {
            None
        }
    }

    pub const fn new_unchecked(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    pub const fn index(self) -> u32 {
        self.row as u32 * FENCE_GRID_SIZE as u32 + self.col as u32
    }

    pub const fn mask(self) -> u64 {
        1u64 << self.index()
    }

    pub const fn from_index(index: u32) -> Option<Self> {
        if index < 64 {
            Some(Self {
                row: (index / FENCE_GRID_SIZE as u32) as u8,
                col: (index % FENCE_GRID_SIZE as u32) as u8,
            })
        } else {
            None
        }
    }
}

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FenceOrientation {
    Vertical = 1,
    Horizontal = 2,
}

/// Pawn move classes relative to the moving pawn. North is toward row 0.
///
/// Double letters are straight jumps over an adjacent opponent; mixed
/// letters are diagonal side-steps taken when the straight jump is blocked.
#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PawnDirection {
    North = 1 << 0,
    East = 1 << 1,
    South = 1 << 2,
    West = 1 << 3,
    NorthNorth = 1 << 4,
    EastEast = 1 << 5,
    SouthSouth = 1 << 6,
    WestWest = 1 << 7,
    NorthEast = 1 << 8,
    NorthWest = 1 << 9,
    SouthEast = 1 << 10,
    SouthWest = 1 << 11,
}

pub const PAWN_DIRECTION_TABLE: [(PawnDirection, i8, i8); 12] = [
    (PawnDirection::North, -1, 0),
    (PawnDirection::East, 0, 1),
    (PawnDirection::South, 1, 0),
    (PawnDirection::West, 0, -1),
    (PawnDirection::NorthNorth, -2, 0),
    (PawnDirection::EastEast, 0, 2),
    (PawnDirection::SouthSouth, 2, 0),
    (PawnDirection::WestWest, 0, -2),
    (PawnDirection::NorthEast, -1, 1),
    (PawnDirection::NorthWest, -1, -1),
    (PawnDirection::SouthEast, 1, 1),
    (PawnDirection::SouthWest, 1, -1),
];

impl PawnDirection {
    pub const ALL: [Self; 12] = [
        Self::North,
        Self::East,
        Self::South,
        Self::West,
        Self::NorthNorth,
        Self::EastEast,
        Self::SouthSouth,
        Self::WestWest,
        Self::NorthEast,
        Self::NorthWest,
        Self::SouthEast,
        Self::SouthWest,
    ];

    pub const fn bit(self) -> u16 {
        self as u16
    }

    pub const fn delta(self) -> (i8, i8) {
        let entry = PAWN_DIRECTION_TABLE[(self as u16).trailing_zeros() as usize];
        (entry.1, entry.2)
    }

    pub fn from_delta(d_row: i8, d_col: i8) -> Option<Self> {
        PAWN_DIRECTION_TABLE
            .iter()
            .find(|(_, r, c)| *r == d_row && *c == d_col)
            .map(|(dir, _, _)| *dir)
    }

    /// Accepts exactly one set bit.
    pub const fn from_bit(bits: u16) -> Option<Self> {
        if bits.count_ones() != 1 || bits.trailing_zeros() >= 12 {
            return None;
        }
        Some(PAWN_DIRECTION_TABLE[bits.trailing_zeros() as usize].0)
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::North => "N",
            Self::East => "E",
            Self::South => "S",
            Self::West => "W",
            Self::NorthNorth => "NN",
            Self::EastEast => "EE",
            Self::SouthSouth => "SS",
            Self::WestWest => "WW",
            Self::NorthEast => "NE",
            Self::NorthWest => "NW",
            Self::SouthEast => "SE",
            Self::SouthWest => "SW",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    Pawn {
        from: Square,
        to: Square,
    },
    Fence {
        orientation: FenceOrientation,
        slot: FenceSlot,
    },
}

impl Move {
    pub const fn pawn(from: Square, to: Square) -> Self {
        Self::Pawn { from, to }
    }

    pub const fn fence(orientation: FenceOrientation, slot: FenceSlot) -> Self {
        Self::Fence { orientation, slot }
    }

    pub const fn is_pawn(&self) -> bool {
        matches!(self, Self::Pawn { .. })
    }

    pub const fn is_fence(&self) -> bool {
        matches!(self, Self::Fence { .. })
    }

    /// Direction class of a pawn move, `None` for fences or unknown deltas.
    pub fn pawn_direction(&self) -> Option<PawnDirection> {
        match *self {
            Self::Pawn { from, to } => {
                let d_row = i16::from(to.row) - i16::from(from.row);
                let d_col = i16::from(to.col) - i16::from(from.col);
                let d_row = i8::try_from(d_row).ok()?;
                let d_col = i8::try_from(d_col).ok()?;
                PawnDirection::from_delta(d_row, d_col)
            }
            Self::Fence { .. } => None,
        }
    }
}

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Score(pub i32);

/// Upper bound: at most 5 pawn moves plus 128 fence placements.
pub type MoveList = ArrayVec<Move, 140>;
