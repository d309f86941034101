pub mod alphabeta;
pub mod classical;
pub mod config;
pub mod eval_format;
pub mod selfplay;
pub mod task;
pub mod tt;

pub use alphabeta::{best_move, AlphaBetaConfig, AlphaBetaResult, AlphaBetaSearcher};
pub use classical::{ClassicalEval, EvalWeights};
pub use config::{Difficulty, EngineConfig};
pub use eval_format::{format_score, format_score_for_display, is_win_score, win_in_n, WIN_SCORE};
pub use selfplay::{play_game, replay, GameRecord, GameResult, SelfPlayConfig};
pub use task::{SearchOutcome, SearchTask, TaskError, TaskMessage};
pub use tt::{Bound, Entry as TTEntry, TranspositionTable};
