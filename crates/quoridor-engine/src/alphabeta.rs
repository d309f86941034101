use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use quoridor_core::constants::NUM_SQUARES;
use quoridor_core::path::shortest_path_len;
use quoridor_core::{
    move_to_notation, Evaluator, FenceOrientation, Move, Position, Score, SearchError,
    SearchLimits, SearchResult, Searcher,
};
use tracing::debug;

use crate::classical::ClassicalEval;
use crate::eval_format::{format_score, WIN_SCORE};
use crate::tt::{Bound, Entry, TranspositionTable};

const DEFAULT_MAX_DEPTH: u8 = 4;
const CHECK_INTERVAL_NODES: u64 = 2_048;
const PV_WALK_MAX_DEPTH: usize = 16;
const ASPIRATION_DELTA: i32 = 25;
const MAX_PLY: usize = 64;

const TT_MOVE_KEY: i32 = 1_000_000;
const SHORTENING_PAWN_KEY: i32 = 500_000;
const KILLER_KEY: i32 = 400_000;

#[derive(Debug, Clone, Copy)]
pub struct AlphaBetaConfig {
    pub tt_size_mb: usize,
    pub max_depth: u8,
}

impl Default for AlphaBetaConfig {
    fn default() -> Self {
        Self {
            tt_size_mb: 16,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaBetaResult {
    pub best_move: Option<Move>,
    pub score: Score,
    pub depth: u8,
    pub nodes: u64,
    pub pv: Vec<Move>,
}

pub struct AlphaBetaSearcher {
    tt: TranspositionTable,
    eval: Box<dyn Evaluator + Send>,
    max_depth: u8,
    nodes: u64,
    stop: bool,
    stop_flag: Arc<AtomicBool>,
    node_limit: Option<u64>,
    time_limit: Option<Duration>,
    started_at: Option<Instant>,
    last_completed_depth: u8,
    killers: [[Option<Move>; 2]; MAX_PLY],
    /// Cutoff history: row 0 pawn destinations, rows 1 and 2 vertical and
    /// horizontal fence slots.
    history: [[i32; NUM_SQUARES]; 3],
}

impl std::fmt::Debug for AlphaBetaSearcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlphaBetaSearcher")
            .field("tt", &self.tt.len())
            .field("eval", &"<Evaluator>")
            .field("max_depth", &self.max_depth)
            .field("nodes", &self.nodes)
            .field("stop", &self.stop)
            .field("node_limit", &self.node_limit)
            .field("time_limit", &self.time_limit)
            .field("last_completed_depth", &self.last_completed_depth)
            .finish()
    }
}

impl AlphaBetaSearcher {
    pub fn new(config: AlphaBetaConfig) -> Self {
        Self::with_eval(config, Box::new(ClassicalEval::new()))
    }

    pub fn with_eval(config: AlphaBetaConfig, eval: Box<dyn Evaluator + Send>) -> Self {
        Self {
            tt: TranspositionTable::with_size_mb(config.tt_size_mb),
            eval,
            max_depth: config.max_depth,
            nodes: 0,
            stop: false,
            stop_flag: Arc::new(AtomicBool::new(false)),
            node_limit: None,
            time_limit: None,
            started_at: None,
            last_completed_depth: 0,
            killers: [[None; 2]; MAX_PLY],
            history: [[0; NUM_SQUARES]; 3],
        }
    }

    /// Shares an external cancellation flag. Setting it makes the running
    /// search unwind and report the deepest completed iteration.
    pub fn with_stop_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.stop_flag = flag;
        self
    }

    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop_flag)
    }

    pub fn transposition_table_len(&self) -> usize {
        self.tt.len()
    }

    /// Validates the root and returns exactly one legal move.
    pub fn best_move(
        &mut self,
        position: &Position,
        limits: SearchLimits,
    ) -> Result<Move, SearchError> {
        if position.is_terminal() {
            return Err(SearchError::InvalidState("position is already decided"));
        }
        if limits.depth == Some(0) {
            return Err(SearchError::InvalidState("search depth must be positive"));
        }
        if position.legal_moves().is_empty() {
            return Err(SearchError::InvalidState("no legal moves"));
        }

        self.search_with_info(position, limits)
            .best_move
            .ok_or(SearchError::InvalidState("search produced no move"))
    }

    pub fn search_with_info(&mut self, position: &Position, limits: SearchLimits) -> AlphaBetaResult {
        self.nodes = 0;
        self.stop = false;
        self.last_completed_depth = 0;
        self.node_limit = limits.nodes;
        self.time_limit = limits.time_ms.map(Duration::from_millis);
        self.started_at = self.time_limit.map(|_| Instant::now());
        self.clear_killers();
        self.age_history();

        if position.is_terminal() {
            return AlphaBetaResult {
                best_move: None,
                score: Score(-WIN_SCORE),
                depth: 0,
                nodes: 0,
                pv: Vec::new(),
            };
        }

        let max_depth = limits.depth.unwrap_or(self.max_depth);
        let mut best_move = None;
        let mut best_score = 0;
        let mut pv = Vec::new();

        for depth in 1..=max_depth {
            if self.should_stop() {
                break;
            }

            let mut delta = ASPIRATION_DELTA;
            let (mut alpha_window, mut beta_window) = if depth > 1 {
                (best_score - delta, best_score + delta)
            } else {
                (-WIN_SCORE, WIN_SCORE)
            };
            let mut failures = 0;

            let outcome = loop {
                match self.search_root(position, depth, alpha_window, beta_window) {
                    Ok((candidate, score))
                        if (score > alpha_window && score < beta_window)
                            || (alpha_window == -WIN_SCORE && beta_window == WIN_SCORE) =>
                    {
                        break Ok((candidate, score));
                    }
                    Ok(_) => {
                        failures += 1;
                        if failures >= 2 {
                            alpha_window = -WIN_SCORE;
                            beta_window = WIN_SCORE;
                        } else {
                            delta *= 4;
                            alpha_window = best_score - delta;
                            beta_window = best_score + delta;
                        }
                    }
                    Err(err) => break Err(err),
                }
            };

            match outcome {
                Ok((candidate, score)) => {
                    best_move = candidate;
                    best_score = score;
                    self.last_completed_depth = depth;
                    pv = self.extract_pv_line(position);
                    debug!(
                        depth,
                        score = %format_score(score),
                        nodes = self.nodes,
                        best = ?best_move.as_ref().map(move_to_notation),
                        "iteration complete"
                    );
                }
                Err(AbortSearch) => {
                    debug!(depth, nodes = self.nodes, "iteration aborted");
                    break;
                }
            }
        }

        if best_move.is_none() {
            let legal = position.legal_moves();
            let mut moves: Vec<Move> = legal.iter().copied().collect();
            self.order_moves(position, &mut moves, None, 0);
            best_move = moves.first().copied();
        }

        AlphaBetaResult {
            best_move,
            score: Score(best_score),
            depth: self.last_completed_depth,
            nodes: self.nodes,
            pv,
        }
    }

    fn search_root(
        &mut self,
        position: &Position,
        depth: u8,
        mut alpha: i32,
        beta: i32,
    ) -> Result<(Option<Move>, i32), AbortSearch> {
        self.bump_nodes()?;

        let key = position.zobrist_hash();
        let tt_move = self.tt.best_move(key);
        let mut moves: Vec<Move> = position.legal_moves().iter().copied().collect();
        self.order_moves(position, &mut moves, tt_move.as_ref(), 0);

        let original_alpha = alpha;
        let mut best_score = -WIN_SCORE;
        let mut best_move = None;
        let mut searched_moves = 0usize;

        for mv in moves {
            let Ok(child) = position.apply(&mv) else {
                continue;
            };
            let score = if searched_moves == 0 {
                -self.negamax(&child, depth - 1, -beta, -alpha, 1)?
            } else {
                let mut score = -self.negamax(&child, depth - 1, -alpha - 1, -alpha, 1)?;
                if score > alpha && score < beta {
                    score = -self.negamax(&child, depth - 1, -beta, -alpha, 1)?;
                }
                score
            };
            searched_moves += 1;

            if score > best_score || best_move.is_none() {
                best_score = score;
                best_move = Some(mv);
            }
            alpha = alpha.max(score);
            if alpha >= beta {
                break;
            }
        }

        self.tt.store(
            Entry {
                key,
                depth,
                score: best_score,
                bound: Bound::classify(best_score, original_alpha, beta),
                best_move,
            },
            0,
        );

        Ok((best_move, best_score))
    }

    fn negamax(
        &mut self,
        position: &Position,
        depth: u8,
        mut alpha: i32,
        beta: i32,
        ply: u8,
    ) -> Result<i32, AbortSearch> {
        self.bump_nodes()?;

        // The player who just moved reached their goal row.
        if position.is_terminal() {
            return Ok(-(WIN_SCORE - i32::from(ply)));
        }
        if depth == 0 {
            return Ok(self.eval.evaluate(position).0);
        }

        let key = position.zobrist_hash();
        let mut tt_move = None;
        if let Some(entry) = self.tt.probe(key, ply) {
            if let Some(score) = entry.cutoff(depth, alpha, beta) {
                return Ok(score);
            }
            tt_move = entry.best_move;
        }

        let legal = position.legal_moves();
        if legal.is_empty() {
            return Ok(self.eval.evaluate(position).0);
        }
        let mut moves: Vec<Move> = legal.iter().copied().collect();
        // A hash collision could hand back a move from another position.
        if tt_move.is_some_and(|mv| !legal.contains(&mv)) {
            tt_move = None;
        }
        self.order_moves(position, &mut moves, tt_move.as_ref(), ply);

        let original_alpha = alpha;
        let mut best_score = -WIN_SCORE;
        let mut best_move = None;
        let mut searched_moves = 0usize;

        for mv in moves {
            let Ok(child) = position.apply(&mv) else {
                continue;
            };

            let reduction = if depth >= 3
                && searched_moves >= 4
                && mv.is_fence()
                && !self.is_killer(&mv, ply)
            {
                1
            } else {
                0
            };
            let next_depth = depth - 1;

            let score = if searched_moves == 0 {
                -self.negamax(&child, next_depth, -beta, -alpha, ply + 1)?
            } else {
                let mut score =
                    -self.negamax(&child, next_depth - reduction, -alpha - 1, -alpha, ply + 1)?;
                if reduction > 0 && score > alpha {
                    score = -self.negamax(&child, next_depth, -alpha - 1, -alpha, ply + 1)?;
                }
                if score > alpha && score < beta {
                    score = -self.negamax(&child, next_depth, -beta, -alpha, ply + 1)?;
                }
                score
            };
            searched_moves += 1;

            if score > best_score {
                best_score = score;
                best_move = Some(mv);
            }
            if score > alpha {
                alpha = score;
            }
            if alpha >= beta {
                self.store_killer(&mv, ply);
                self.bump_history(&mv, depth);
                break;
            }
        }

        self.tt.store(
            Entry {
                key,
                depth,
                score: best_score,
                bound: Bound::classify(best_score, original_alpha, beta),
                best_move,
            },
            ply,
        );

        Ok(best_score)
    }

    fn extract_pv_line(&self, position: &Position) -> Vec<Move> {
        let mut pv = Vec::new();
        let mut seen = HashSet::new();
        let mut current = *position;

        while pv.len() < PV_WALK_MAX_DEPTH && !current.is_terminal() {
            let key = current.zobrist_hash();
            if !seen.insert(key) {
                break;
            }
            let Some(best_move) = self.tt.best_move(key) else {
                break;
            };
            if !current.legal_moves().contains(&best_move) {
                break;
            }
            let Ok(next) = current.apply(&best_move) else {
                break;
            };
            pv.push(best_move);
            current = next;
        }

        pv
    }

    /// Stable ordering: hash move, path-shortening pawn moves, killers, then
    /// history; ties keep generation order.
    fn order_moves(&self, position: &Position, moves: &mut [Move], tt_move: Option<&Move>, ply: u8) {
        let mover = position.side_to_move;
        let walls = position.walls();
        let goal = mover.goal_row();
        let current = shortest_path_len(&walls, position.pawn(mover), goal);

        moves.sort_by_cached_key(|mv| {
            if tt_move.is_some_and(|tt| tt == mv) {
                return -TT_MOVE_KEY;
            }
            if let (Move::Pawn { to, .. }, Some(before)) = (*mv, current) {
                if let Some(after) = shortest_path_len(&walls, to, goal) {
                    if after < before {
                        return -(SHORTENING_PAWN_KEY + i32::from(before - after));
                    }
                }
            }
            if self.is_killer(mv, ply) {
                return -KILLER_KEY;
            }
            let (table, idx) = history_index(mv);
            -self.history[table][idx]
        });
    }

    fn is_killer(&self, mv: &Move, ply: u8) -> bool {
        let slot = &self.killers[usize::from(ply).min(MAX_PLY - 1)];
        slot.iter().any(|killer| killer.as_ref() == Some(mv))
    }

    fn store_killer(&mut self, mv: &Move, ply: u8) {
        let slot = &mut self.killers[usize::from(ply).min(MAX_PLY - 1)];
        if slot[0].as_ref() == Some(mv) {
            return;
        }
        slot[1] = slot[0];
        slot[0] = Some(*mv);
    }

    fn bump_history(&mut self, mv: &Move, depth: u8) {
        let (table, idx) = history_index(mv);
        let bonus = i32::from(depth) * i32::from(depth);
        self.history[table][idx] = self.history[table][idx].saturating_add(bonus);
    }

    fn clear_killers(&mut self) {
        self.killers = [[None; 2]; MAX_PLY];
    }

    fn age_history(&mut self) {
        for table in &mut self.history {
            for score in table {
                *score /= 2;
            }
        }
    }

    fn bump_nodes(&mut self) -> Result<(), AbortSearch> {
        self.nodes = self.nodes.saturating_add(1);
        if self.nodes % CHECK_INTERVAL_NODES == 0 && self.should_stop() {
            return Err(AbortSearch);
        }
        Ok(())
    }

    fn should_stop(&mut self) -> bool {
        if self.stop {
            return true;
        }

        if self.stop_flag.load(Ordering::Relaxed) {
            self.stop = true;
            return true;
        }

        if self.node_limit.is_some_and(|limit| self.nodes >= limit) {
            self.stop = true;
            return true;
        }

        if let (Some(limit), Some(started_at)) = (self.time_limit, self.started_at) {
            if started_at.elapsed() >= limit {
                self.stop = true;
                return true;
            }
        }

        false
    }
}

impl Default for AlphaBetaSearcher {
    fn default() -> Self {
        Self::new(AlphaBetaConfig::default())
    }
}

impl Searcher for AlphaBetaSearcher {
    fn search(&mut self, position: &Position, limits: SearchLimits) -> SearchResult {
        let result = self.search_with_info(position, limits);
        SearchResult {
            best_move: result.best_move,
            score: result.score,
            nodes_searched: result.nodes,
        }
    }
}

/// Fixed-depth search with a fresh default searcher.
pub fn best_move(position: &Position, depth: u8) -> Result<Move, SearchError> {
    let mut searcher = AlphaBetaSearcher::new(AlphaBetaConfig {
        max_depth: depth,
        ..AlphaBetaConfig::default()
    });
    searcher.best_move(position, SearchLimits::depth(depth))
}

#[derive(Debug, Clone, Copy)]
struct AbortSearch;

fn history_index(mv: &Move) -> (usize, usize) {
    match *mv {
        Move::Pawn { to, .. } => (0, to.index()),
        Move::Fence {
            orientation: FenceOrientation::Vertical,
            slot,
        } => (1, slot.index() as usize),
        Move::Fence {
            orientation: FenceOrientation::Horizontal,
            slot,
        } => (2, slot.index() as usize),
    }
}
