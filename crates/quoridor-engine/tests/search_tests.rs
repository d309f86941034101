use std::time::Duration;

use quoridor_core::{
    FenceOrientation, FenceSlot, Move, Player, Position, SearchError, SearchLimits, Searcher,
    Square,
};
use quoridor_engine::{
    best_move, AlphaBetaConfig, AlphaBetaSearcher, EngineConfig, SearchTask, TaskError,
    WIN_SCORE,
};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

fn sq(row: u8, col: u8) -> Square {
    Square::new_unchecked(row, col)
}

fn one_step_from_goal() -> Position {
    Position {
        player_one: sq(1, 4),
        player_two: sq(5, 0),
        ..Position::new()
    }
}

#[test]
fn picks_immediate_win_at_every_depth() {
    let position = one_step_from_goal();
    let winning = Move::pawn(sq(1, 4), sq(0, 4));
    for depth in 1..=3 {
        assert_eq!(best_move(&position, depth), Ok(winning), "depth {depth}");
    }
}

#[test]
fn winning_score_prefers_fastest_finish() {
    let mut searcher = AlphaBetaSearcher::new(AlphaBetaConfig {
        tt_size_mb: 1,
        max_depth: 3,
    });
    let result = searcher.search_with_info(&one_step_from_goal(), SearchLimits::depth(3));
    assert_eq!(result.score.0, WIN_SCORE - 1);
}

#[test]
fn stops_opponent_who_is_about_to_win() {
    // Player Two needs one step to reach row 8; Player One cannot win first
    // and must wall off the approach.
    let position = Position {
        player_one: sq(8, 0),
        player_two: sq(7, 6),
        ..Position::new()
    };
    let chosen = best_move(&position, 2).unwrap();
    let next = position.apply(&chosen).unwrap();
    assert!(
        !next.legal_moves().iter().any(|mv| matches!(
            mv,
            Move::Pawn { to, .. } if to.row == Player::Two.goal_row()
        )),
        "{chosen:?} leaves an immediate win"
    );
}

#[test]
fn rejects_decided_positions_and_zero_depth() {
    let decided = Position {
        player_one: sq(0, 2),
        side_to_move: Player::Two,
        ..Position::new()
    };
    assert!(matches!(
        best_move(&decided, 3),
        Err(SearchError::InvalidState(_))
    ));
    assert!(matches!(
        best_move(&Position::new(), 0),
        Err(SearchError::InvalidState(_))
    ));
}

#[test]
fn result_is_always_a_legal_root_move() {
    let position = Position::new()
        .apply(&Move::fence(
            FenceOrientation::Horizontal,
            FenceSlot::new_unchecked(6, 3),
        ))
        .unwrap();
    let mv = best_move(&position, 2).unwrap();
    assert!(position.legal_moves().contains(&mv));
}

#[test]
fn node_limit_keeps_completed_iteration() {
    let mut searcher = AlphaBetaSearcher::default();
    let result = searcher.search(
        &Position::new(),
        SearchLimits {
            depth: Some(6),
            nodes: Some(4_096),
            time_ms: None,
        },
    );
    let mv = result.best_move.expect("a move is always returned");
    assert!(Position::new().legal_moves().contains(&mv));
    assert!(result.nodes_searched >= 4_096);
}

#[test]
fn task_reports_ready_then_result() {
    let mut task = SearchTask::spawn(EngineConfig {
        tt_size_mb: 1,
        ..EngineConfig::default()
    })
    .unwrap();
    task.wait_ready().unwrap();
    task.submit(one_step_from_goal(), SearchLimits::depth(2)).unwrap();
    assert_eq!(
        task.wait_result().unwrap(),
        Ok(Move::pawn(sq(1, 4), sq(0, 4)))
    );
    assert!(matches!(
        task.submit(Position::new(), SearchLimits::depth(1)),
        Err(TaskError::AlreadySubmitted)
    ));
}

#[test]
fn cancelled_task_still_answers() {
    let mut task = SearchTask::spawn(EngineConfig {
        tt_size_mb: 1,
        ..EngineConfig::default()
    })
    .unwrap();
    task.submit(Position::new(), SearchLimits::depth(6)).unwrap();
    task.cancel();
    let outcome = task
        .wait_result_timeout(Duration::from_secs(30))
        .unwrap()
        .expect("cancelled search answers promptly");
    let mv = outcome.unwrap();
    assert!(Position::new().legal_moves().contains(&mv));
}

#[test]
fn task_forwards_invalid_state() {
    let mut task = SearchTask::spawn(EngineConfig::default()).unwrap();
    let decided = Position {
        player_two: sq(8, 3),
        ..Position::new()
    };
    task.submit(decided, SearchLimits::depth(2)).unwrap();
    assert!(matches!(
        task.wait_result().unwrap(),
        Err(SearchError::InvalidState(_))
    ));
}

fn random_midgames(seed: u64, count: usize, plies: usize) -> Vec<Position> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut positions = Vec::new();
    while positions.len() < count {
        let mut position = Position::new();
        for _ in 0..plies {
            let moves = position.legal_moves();
            let Some(mv) = moves.as_slice().choose(&mut rng) else {
                break;
            };
            position = position.apply(mv).unwrap();
            if position.is_terminal() {
                break;
            }
        }
        if !position.is_terminal() {
            positions.push(position);
        }
    }
    positions
}

/// Root-player value of `mv` as seen by a fresh depth-`depth` search below it.
fn value_after(position: &Position, mv: &Move, depth: u8) -> i32 {
    let child = position.apply(mv).unwrap();
    if child.is_terminal() {
        return WIN_SCORE - 1;
    }
    let mut searcher = AlphaBetaSearcher::new(AlphaBetaConfig {
        tt_size_mb: 1,
        max_depth: depth,
    });
    -searcher.search_with_info(&child, SearchLimits::depth(depth)).score.0
}

fn assert_deeper_choice_is_no_worse(position: &Position, depth: u8) {
    let shallow = best_move(position, depth).unwrap();
    let deep = best_move(position, depth + 1).unwrap();
    let shallow_value = value_after(position, &shallow, depth);
    let deep_value = value_after(position, &deep, depth);
    assert!(
        deep_value >= shallow_value,
        "depth {depth}: {deep:?} ({deep_value}) worse than {shallow:?} ({shallow_value})\n{position}"
    );
}

#[test]
fn deeper_search_never_picks_a_worse_move() {
    for position in random_midgames(7, 10, 12) {
        assert_deeper_choice_is_no_worse(&position, 1);
    }
    for position in random_midgames(11, 2, 8) {
        assert_deeper_choice_is_no_worse(&position, 2);
    }
}
