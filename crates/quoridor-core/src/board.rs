use serde::{Deserialize, Serialize};

use crate::constants::{
    BOARD_MASK, COL_0_MASK, COL_8_MASK, FENCE_GRID_SIZE, ROW_0_MASK, ROW_8_MASK, SLOT_COL_0_MASK,
    SLOT_COL_7_MASK,
};
use crate::types::{FenceOrientation, FenceSlot, Square};

/// Fence masks independent of pawns, so hypothetical layouts can be checked
/// without building a full position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FenceLayout {
    pub vertical: u64,
    pub horizontal: u64,
}

impl FenceLayout {
    pub const fn new(vertical: u64, horizontal: u64) -> Self {
        Self {
            vertical,
            horizontal,
        }
    }

    pub const fn mask(&self, orientation: FenceOrientation) -> u64 {
        match orientation {
            FenceOrientation::Vertical => self.vertical,
            FenceOrientation::Horizontal => self.horizontal,
        }
    }

    pub const fn is_set(&self, orientation: FenceOrientation, slot: FenceSlot) -> bool {
        self.mask(orientation) & slot.mask() != 0
    }

    pub const fn with_fence(self, orientation: FenceOrientation, slot: FenceSlot) -> Self {
        match orientation {
            FenceOrientation::Vertical => Self::new(self.vertical | slot.mask(), self.horizontal),
            FenceOrientation::Horizontal => Self::new(self.vertical, self.horizontal | slot.mask()),
        }
    }

    pub const fn count(&self) -> u32 {
        self.vertical.count_ones() + self.horizontal.count_ones()
    }

    /// Slots where a vertical fence would not overlap anything already placed.
    pub const fn free_vertical_slots(&self) -> u64 {
        let v = self.vertical;
        !(v | (v << FENCE_GRID_SIZE) | (v >> FENCE_GRID_SIZE) | self.horizontal)
    }

    /// Slots where a horizontal fence would not overlap anything already placed.
    pub const fn free_horizontal_slots(&self) -> u64 {
        let h = self.horizontal;
        !(h | ((h << 1) & !SLOT_COL_0_MASK) | ((h >> 1) & !SLOT_COL_7_MASK) | self.vertical)
    }

    /// True when no two fences share a slot or overlap along their length.
    pub fn is_consistent(&self) -> bool {
        let v = self.vertical;
        let h = self.horizontal;
        v & h == 0 && v & (v << FENCE_GRID_SIZE) == 0 && h & ((h << 1) & !SLOT_COL_0_MASK) == 0
    }
}

/// Per-direction blocking masks over the 81 cells, border included. A set
/// bit means a pawn on that cell cannot step in that direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Walls {
    pub north: u128,
    pub east: u128,
    pub south: u128,
    pub west: u128,
}

impl Walls {
    pub fn from_layout(layout: &FenceLayout) -> Self {
        let mut walls = Self {
            north: ROW_0_MASK,
            east: COL_8_MASK,
            south: ROW_8_MASK,
            west: COL_0_MASK,
        };

        let mut horizontal = layout.horizontal;
        while horizontal != 0 {
            let idx = horizontal.trailing_zeros();
            horizontal &= horizontal - 1;
            let (row, col) = slot_coords(idx);
            let upper = cell_bit(row, col) | cell_bit(row, col + 1);
            walls.south |= upper;
            walls.north |= upper << 9;
        }

        let mut vertical = layout.vertical;
        while vertical != 0 {
            let idx = vertical.trailing_zeros();
            vertical &= vertical - 1;
            let (row, col) = slot_coords(idx);
            let left = cell_bit(row, col) | cell_bit(row + 1, col);
            walls.east |= left;
            walls.west |= left << 1;
        }

        walls
    }

    pub const fn blocks(&self, square: Square, d_row: i8, d_col: i8) -> bool {
        let bit = square.bit();
        match (d_row, d_col) {
            (-1, 0) => self.north & bit != 0,
            (1, 0) => self.south & bit != 0,
            (0, 1) => self.east & bit != 0,
            (0, -1) => self.west & bit != 0,
            _ => true,
        }
    }

    /// One breadth-first expansion step of `cells` along open edges.
    pub const fn expand(&self, cells: u128) -> u128 {
        let north = (cells & !self.north) >> 9;
        let south = (cells & !self.south) << 9;
        let east = (cells & !self.east) << 1;
        let west = (cells & !self.west) >> 1;
        (cells | north | south | east | west) & BOARD_MASK
    }
}

const fn slot_coords(idx: u32) -> (u32, u32) {
    (idx / FENCE_GRID_SIZE as u32, idx % FENCE_GRID_SIZE as u32)
}

const fn cell_bit(row: u32, col: u32) -> u128 {
    1u128 << (row * 9 + col)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_layout_only_blocks_border() {
        let walls = Walls::from_layout(&FenceLayout::default());
        let center = Square::new_unchecked(4, 4);
        assert!(!walls.blocks(center, -1, 0));
        assert!(!walls.blocks(center, 0, 1));
        assert!(walls.blocks(Square::new_unchecked(0, 3), -1, 0));
        assert!(walls.blocks(Square::new_unchecked(3, 8), 0, 1));
        assert!(walls.blocks(Square::new_unchecked(8, 3), 1, 0));
        assert!(walls.blocks(Square::new_unchecked(3, 0), 0, -1));
    }

    #[test]
    fn horizontal_fence_blocks_two_columns_both_ways() {
        let layout = FenceLayout::default()
            .with_fence(FenceOrientation::Horizontal, FenceSlot::new_unchecked(2, 3));
        let walls = Walls::from_layout(&layout);
        assert!(walls.blocks(Square::new_unchecked(2, 3), 1, 0));
        assert!(walls.blocks(Square::new_unchecked(2, 4), 1, 0));
        assert!(walls.blocks(Square::new_unchecked(3, 3), -1, 0));
        assert!(walls.blocks(Square::new_unchecked(3, 4), -1, 0));
        assert!(!walls.blocks(Square::new_unchecked(2, 5), 1, 0));
        assert!(!walls.blocks(Square::new_unchecked(2, 3), 0, 1));
    }

    #[test]
    fn vertical_fence_blocks_two_rows_both_ways() {
        let layout = FenceLayout::default()
            .with_fence(FenceOrientation::Vertical, FenceSlot::new_unchecked(5, 7));
        let walls = Walls::from_layout(&layout);
        assert!(walls.blocks(Square::new_unchecked(5, 7), 0, 1));
        assert!(walls.blocks(Square::new_unchecked(6, 7), 0, 1));
        assert!(walls.blocks(Square::new_unchecked(5, 8), 0, -1));
        assert!(walls.blocks(Square::new_unchecked(6, 8), 0, -1));
        assert!(!walls.blocks(Square::new_unchecked(7, 7), 0, 1));
    }

    #[test]
    fn free_slots_respect_overlap_rules() {
        let layout = FenceLayout::default()
            .with_fence(FenceOrientation::Horizontal, FenceSlot::new_unchecked(3, 0));
        let free_h = layout.free_horizontal_slots();
        let free_v = layout.free_vertical_slots();

        assert_eq!(free_h & FenceSlot::new_unchecked(3, 0).mask(), 0);
        assert_eq!(free_h & FenceSlot::new_unchecked(3, 1).mask(), 0);
        assert_ne!(free_h & FenceSlot::new_unchecked(3, 2).mask(), 0);
        // No wrap into the previous row's last slot.
        assert_ne!(free_h & FenceSlot::new_unchecked(2, 7).mask(), 0);
        assert_eq!(free_v & FenceSlot::new_unchecked(3, 0).mask(), 0);
        assert_ne!(free_v & FenceSlot::new_unchecked(2, 0).mask(), 0);
    }

    #[test]
    fn vertical_neighbours_overlap() {
        let layout = FenceLayout::default()
            .with_fence(FenceOrientation::Vertical, FenceSlot::new_unchecked(4, 4));
        let free_v = layout.free_vertical_slots();
        assert_eq!(free_v & FenceSlot::new_unchecked(3, 4).mask(), 0);
        assert_eq!(free_v & FenceSlot::new_unchecked(5, 4).mask(), 0);
        assert_ne!(free_v & FenceSlot::new_unchecked(6, 4).mask(), 0);
        assert!(layout.is_consistent());
        assert!(!layout
            .with_fence(FenceOrientation::Horizontal, FenceSlot::new_unchecked(4, 4))
            .is_consistent());
    }
}
