use std::env;

use quoridor_core::SearchLimits;
use serde::{Deserialize, Serialize};

use crate::alphabeta::AlphaBetaConfig;

const DEFAULT_TT_MB: usize = 16;
const DEFAULT_MAX_DEPTH: u8 = 4;

/// Search settings resolved from the process environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub tt_size_mb: usize,
    pub max_depth: u8,
    pub time_ms: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tt_size_mb: DEFAULT_TT_MB,
            max_depth: DEFAULT_MAX_DEPTH,
            time_ms: None,
        }
    }
}

impl EngineConfig {
    /// Reads `QUORIDOR_TT_MB`, `QUORIDOR_MAX_DEPTH` and `QUORIDOR_TIME_MS`,
    /// falling back to defaults for missing or unparsable values.
    pub fn from_env() -> Self {
        let tt_size_mb = env_usize("QUORIDOR_TT_MB", DEFAULT_TT_MB).max(1);
        let max_depth = Difficulty::clamped(env_u8("QUORIDOR_MAX_DEPTH", DEFAULT_MAX_DEPTH)).depth();
        let time_ms = env_u64("QUORIDOR_TIME_MS").filter(|&ms| ms > 0);

        Self {
            tt_size_mb,
            max_depth,
            time_ms,
        }
    }

    pub fn searcher_config(&self) -> AlphaBetaConfig {
        AlphaBetaConfig {
            tt_size_mb: self.tt_size_mb,
            max_depth: self.max_depth,
        }
    }

    pub fn limits(&self) -> SearchLimits {
        SearchLimits {
            depth: Some(self.max_depth),
            nodes: None,
            time_ms: self.time_ms,
        }
    }
}

/// AI strength, one level per ply of search depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 6;

    pub fn new(level: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&level).then_some(Self(level))
    }

    pub fn clamped(level: u8) -> Self {
        Self(level.clamp(Self::MIN, Self::MAX))
    }

    pub const fn level(self) -> u8 {
        self.0
    }

    pub const fn depth(self) -> u8 {
        self.0
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self(DEFAULT_MAX_DEPTH)
    }
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_u8(key: &str, default: u8) -> u8 {
    env::var(key)
        .ok()
        .and_then(|s| s.parse::<u8>().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|s| s.parse::<u64>().ok())
}
