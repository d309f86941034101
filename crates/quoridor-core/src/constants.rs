use crate::types::Square;

pub const BOARD_SIZE: u8 = 9;
pub const FENCE_GRID_SIZE: u8 = BOARD_SIZE - 1;
pub const NUM_SQUARES: usize = (BOARD_SIZE as usize) * (BOARD_SIZE as usize);
pub const NUM_FENCE_SLOTS: usize = (FENCE_GRID_SIZE as usize) * (FENCE_GRID_SIZE as usize);

pub const FENCES_PER_PLAYER: u8 = 10;

pub const PLAYER_ONE_START: Square = Square::new_unchecked(BOARD_SIZE - 1, (BOARD_SIZE - 1) / 2);
pub const PLAYER_TWO_START: Square = Square::new_unchecked(0, (BOARD_SIZE - 1) / 2);

pub const PLAYER_ONE_GOAL_ROW: u8 = 0;
pub const PLAYER_TWO_GOAL_ROW: u8 = BOARD_SIZE - 1;

pub const NOTATION_VERTICAL: char = 'v';
pub const NOTATION_HORIZONTAL: char = 'h';

/// All 81 cells, bit `row * 9 + col`.
pub const BOARD_MASK: u128 = (1u128 << NUM_SQUARES) - 1;

pub const ROW_0_MASK: u128 = 0b1_1111_1111;
pub const ROW_8_MASK: u128 = ROW_0_MASK << (9 * 8);

pub const COL_0_MASK: u128 = column_mask(0);
pub const COL_8_MASK: u128 = column_mask(8);

/// Fence slots in column 0 / column 7 of the 8x8 slot grid.
pub const SLOT_COL_0_MASK: u64 = 0x0101_0101_0101_0101;
pub const SLOT_COL_7_MASK: u64 = SLOT_COL_0_MASK << 7;

pub const SQUARES: [Square; NUM_SQUARES] = {
    let mut squares = [Square::new_unchecked(0, 0); NUM_SQUARES];
    let mut idx = 0;
    while idx < NUM_SQUARES {
        squares[idx] = Square::new_unchecked((idx / 9) as u8, (idx % 9) as u8);
        idx += 1;
    }
    squares
};

pub const fn row_mask(row: u8) -> u128 {
    ROW_0_MASK << (9 * row as u32)
}

const fn column_mask(col: u8) -> u128 {
    let mut mask = 0u128;
    let mut row = 0;
    while row < BOARD_SIZE {
        mask |= 1u128 << (row as u32 * 9 + col as u32);
        row += 1;
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_cover_expected_cells() {
        assert_eq!(BOARD_MASK.count_ones(), 81);
        assert_eq!(ROW_8_MASK, row_mask(8));
        assert_eq!(COL_0_MASK.count_ones(), 9);
        assert_eq!(COL_8_MASK & ROW_0_MASK, 1 << 8);
        assert_eq!(SLOT_COL_7_MASK & 0xFF, 0x80);
    }

    #[test]
    fn squares_are_row_major() {
        assert_eq!(SQUARES[0], Square::new_unchecked(0, 0));
        assert_eq!(SQUARES[10], Square::new_unchecked(1, 1));
        assert_eq!(SQUARES[80], Square::new_unchecked(8, 8));
    }
}
