//! Goal-row reachability over a fence layout.
//!
//! The search is a breadth-first flood fill on the 81-cell bitboard: each
//! round adds every cell reachable in one more step, so a call does at most
//! 81 rounds of constant-width bit operations.

use crate::board::{FenceLayout, Walls};
use crate::constants::row_mask;
use crate::types::{Player, Square};

/// Shortest number of pawn steps from `from` to any cell of `goal_row`,
/// ignoring pawns. `None` when the goal row is unreachable.
pub fn shortest_path_len(walls: &Walls, from: Square, goal_row: u8) -> Option<u8> {
    let goal = row_mask(goal_row);
    let mut reached = from.bit();
    let mut steps = 0u8;

    loop {
        if reached & goal != 0 {
            return Some(steps);
        }
        let next = walls.expand(reached);
        if next == reached {
            return None;
        }
        reached = next;
        steps += 1;
    }
}

pub fn has_path(walls: &Walls, from: Square, goal_row: u8) -> bool {
    shortest_path_len(walls, from, goal_row).is_some()
}

/// True when both pawns can still reach their goal rows under `layout`.
pub fn both_players_have_path(layout: &FenceLayout, player_one: Square, player_two: Square) -> bool {
    let walls = Walls::from_layout(layout);
    has_path(&walls, player_one, Player::One.goal_row())
        && has_path(&walls, player_two, Player::Two.goal_row())
}
