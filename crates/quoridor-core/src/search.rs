use thiserror::Error;

use crate::position::Position;
use crate::types::{Move, Score};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SearchError {
    #[error("invalid search state: {0}")]
    InvalidState(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SearchLimits {
    pub depth: Option<u8>,
    pub nodes: Option<u64>,
    pub time_ms: Option<u64>,
}

impl SearchLimits {
    pub const fn depth(depth: u8) -> Self {
        Self {
            depth: Some(depth),
            nodes: None,
            time_ms: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub best_move: Option<Move>,
    pub score: Score,
    pub nodes_searched: u64,
}

pub trait Searcher {
    fn search(&mut self, position: &Position, limits: SearchLimits) -> SearchResult;
}
