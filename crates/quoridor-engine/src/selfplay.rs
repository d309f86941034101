use quoridor_core::{
    move_to_notation, parse_notation, Move, NotationError, Player, Position, SearchLimits,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::alphabeta::{AlphaBetaConfig, AlphaBetaSearcher};
use crate::config::Difficulty;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    PlayerOneWin,
    PlayerTwoWin,
    /// Ply cap reached before either pawn got home.
    Unfinished,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub moves: Vec<String>,
    pub result: GameResult,
    pub total_plies: u32,
    pub random_plies: u32,
    pub final_position: Position,
}

#[derive(Debug, Clone, Copy)]
pub struct SelfPlayConfig {
    pub search: AlphaBetaConfig,
    pub player_one: Difficulty,
    pub player_two: Difficulty,
    /// Uniformly random legal moves played before the engines take over.
    pub random_opening_plies: u32,
    pub seed: u64,
    pub max_plies: u32,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self {
            search: AlphaBetaConfig::default(),
            player_one: Difficulty::default(),
            player_two: Difficulty::default(),
            random_opening_plies: 0,
            seed: 0,
            max_plies: 200,
        }
    }
}

pub fn play_game(config: &SelfPlayConfig) -> GameRecord {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut searchers = [
        AlphaBetaSearcher::new(config.search),
        AlphaBetaSearcher::new(config.search),
    ];
    let mut position = Position::new();
    let mut moves = Vec::new();
    let mut total_plies = 0u32;
    let mut random_plies = 0u32;

    while total_plies < config.max_plies && !position.is_terminal() {
        let mover = position.side_to_move;
        let chosen = if random_plies < config.random_opening_plies {
            let legal = position.legal_moves();
            let Some(mv) = legal.as_slice().choose(&mut rng).copied() else {
                break;
            };
            random_plies += 1;
            mv
        } else {
            let depth = match mover {
                Player::One => config.player_one.depth(),
                Player::Two => config.player_two.depth(),
            };
            match searchers[mover.index()].best_move(&position, SearchLimits::depth(depth)) {
                Ok(mv) => mv,
                Err(err) => {
                    warn!(%err, ply = total_plies, "search failed, ending game");
                    break;
                }
            }
        };

        let Ok(next) = position.apply(&chosen) else {
            break;
        };
        moves.push(move_to_notation(&chosen));
        position = next;
        total_plies += 1;
    }

    let result = match position.winner() {
        Some(Player::One) => GameResult::PlayerOneWin,
        Some(Player::Two) => GameResult::PlayerTwoWin,
        None => GameResult::Unfinished,
    };
    info!(?result, total_plies, seed = config.seed, "self-play game finished");

    GameRecord {
        moves,
        result,
        total_plies,
        random_plies,
        final_position: position,
    }
}

/// Replays a record's notation from the start position.
pub fn replay(record: &GameRecord) -> Result<Vec<Move>, NotationError> {
    let mut position = Position::new();
    let mut played = Vec::with_capacity(record.moves.len());
    for text in &record.moves {
        let mv = parse_notation(&position, text)?;
        position = position
            .apply(&mv)
            .map_err(|_| NotationError::Illegal(text.clone()))?;
        played.push(mv);
    }
    Ok(played)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config(seed: u64) -> SelfPlayConfig {
        SelfPlayConfig {
            search: AlphaBetaConfig {
                tt_size_mb: 1,
                max_depth: 1,
            },
            player_one: Difficulty::clamped(1),
            player_two: Difficulty::clamped(1),
            random_opening_plies: 2,
            seed,
            max_plies: 12,
        }
    }

    #[test]
    fn record_replays_to_final_position() {
        let record = play_game(&quick_config(7));
        assert_eq!(record.moves.len() as u32, record.total_plies);
        assert_eq!(record.random_plies, 2);

        let played = replay(&record).unwrap();
        let end = played
            .iter()
            .try_fold(Position::new(), |position, mv| position.apply(mv))
            .unwrap();
        assert_eq!(end, record.final_position);
    }

    #[test]
    fn same_seed_same_game() {
        let a = play_game(&quick_config(3));
        let b = play_game(&quick_config(3));
        assert_eq!(a.moves, b.moves);
    }

    #[test]
    fn ply_cap_is_respected() {
        let record = play_game(&SelfPlayConfig {
            max_plies: 3,
            ..quick_config(1)
        });
        assert!(record.total_plies <= 3);
        assert_eq!(record.result, GameResult::Unfinished);
    }
}
