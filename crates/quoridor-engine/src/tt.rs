//! Transposition table keyed by Zobrist hash.
//!
//! Win scores are stored as a distance from the node that produced them, not
//! from the search root, so an entry reads correctly when the position comes
//! back at a different ply or under a later root.

use core::mem::size_of;

use quoridor_core::Move;

use crate::eval_format::is_win_score;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Exact,
    Lower,
    Upper,
}

impl Bound {
    /// Bound type of a node result searched with the window `(alpha, beta)`.
    pub fn classify(score: i32, alpha: i32, beta: i32) -> Self {
        if score <= alpha {
            Self::Upper
        } else if score >= beta {
            Self::Lower
        } else {
            Self::Exact
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    pub key: u64,
    pub depth: u8,
    pub score: i32,
    pub bound: Bound,
    pub best_move: Option<Move>,
}

impl Entry {
    /// The stored score if it settles a node searched to `depth` with the
    /// window `(alpha, beta)`.
    pub fn cutoff(&self, depth: u8, alpha: i32, beta: i32) -> Option<i32> {
        if self.depth < depth {
            return None;
        }
        match self.bound {
            Bound::Exact => Some(self.score),
            Bound::Lower if self.score >= beta => Some(self.score),
            Bound::Upper if self.score <= alpha => Some(self.score),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TranspositionTable {
    entries: Vec<Option<Entry>>,
    mask: usize,
}

impl TranspositionTable {
    /// Largest power-of-two slot count that fits in `bytes`, at least one.
    pub fn with_size_bytes(bytes: usize) -> Self {
        let fits = (bytes / size_of::<Option<Entry>>().max(1)).max(1);
        let count = 1usize << (usize::BITS - 1 - fits.leading_zeros());
        Self {
            entries: vec![None; count],
            mask: count - 1,
        }
    }

    pub fn with_size_mb(mb: usize) -> Self {
        Self::with_size_bytes(mb.saturating_mul(1024 * 1024))
    }

    pub fn clear(&mut self) {
        self.entries.fill(None);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry for `key` with its score expressed relative to the root of a
    /// search that reached the position at `ply`.
    pub fn probe(&self, key: u64, ply: u8) -> Option<Entry> {
        let entry = self.slot(key)?;
        Some(Entry {
            score: score_from_table(entry.score, ply),
            ..entry
        })
    }

    pub fn best_move(&self, key: u64) -> Option<Move> {
        self.slot(key).and_then(|entry| entry.best_move)
    }

    /// Depth-preferred for the same key, always-replace otherwise. `ply` is
    /// the distance from the current root to the stored position.
    pub fn store(&mut self, entry: Entry, ply: u8) {
        let idx = self.index(entry.key);
        if let Some(existing) = &self.entries[idx] {
            if existing.key == entry.key && existing.depth > entry.depth {
                return;
            }
        }
        self.entries[idx] = Some(Entry {
            score: score_to_table(entry.score, ply),
            ..entry
        });
    }

    fn slot(&self, key: u64) -> Option<Entry> {
        self.entries[self.index(key)].filter(|entry| entry.key == key)
    }

    fn index(&self, key: u64) -> usize {
        key as usize & self.mask
    }
}

impl Default for TranspositionTable {
    fn default() -> Self {
        Self::with_size_mb(16)
    }
}

fn score_to_table(score: i32, ply: u8) -> i32 {
    let ply = i32::from(ply);
    match score {
        s if is_win_score(s) && s > 0 => s + ply,
        s if is_win_score(s) => s - ply,
        s => s,
    }
}

fn score_from_table(score: i32, ply: u8) -> i32 {
    let ply = i32::from(ply);
    match score {
        s if is_win_score(s) && s > 0 => s - ply,
        s if is_win_score(s) => s + ply,
        s => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval_format::WIN_SCORE;

    fn entry(key: u64, depth: u8, score: i32, bound: Bound) -> Entry {
        Entry {
            key,
            depth,
            score,
            bound,
            best_move: None,
        }
    }

    #[test]
    fn probe_misses_on_other_key() {
        let mut tt = TranspositionTable::with_size_bytes(1024);
        tt.store(entry(42, 3, 7, Bound::Exact), 0);
        assert_eq!(tt.probe(42, 0).map(|e| e.score), Some(7));
        assert!(tt.probe(42 + tt.len() as u64, 0).is_none());
        assert!(tt.best_move(42).is_none());
    }

    #[test]
    fn shallower_entry_does_not_replace_deeper_one() {
        let mut tt = TranspositionTable::with_size_bytes(1024);
        tt.store(entry(9, 5, 100, Bound::Exact), 2);
        tt.store(entry(9, 2, -100, Bound::Exact), 2);
        assert_eq!(tt.probe(9, 2).map(|e| e.depth), Some(5));
        tt.store(entry(9, 6, 1, Bound::Exact), 2);
        assert_eq!(tt.probe(9, 2).map(|e| e.score), Some(1));
    }

    #[test]
    fn slot_count_is_a_power_of_two() {
        let tt = TranspositionTable::with_size_bytes(0);
        assert_eq!(tt.len(), 1);
        assert!(!tt.is_empty());

        let entry_size = size_of::<Option<Entry>>();
        let tt = TranspositionTable::with_size_bytes(entry_size * 1000);
        assert_eq!(tt.len(), 512);
    }

    #[test]
    fn win_scores_follow_the_ply_they_are_read_at() {
        let mut tt = TranspositionTable::with_size_bytes(1024);
        // Stored at ply 3: the side to move there wins two plies later.
        tt.store(entry(5, 4, WIN_SCORE - 5, Bound::Exact), 3);
        assert_eq!(tt.probe(5, 3).map(|e| e.score), Some(WIN_SCORE - 5));
        assert_eq!(tt.probe(5, 1).map(|e| e.score), Some(WIN_SCORE - 3));
        assert_eq!(tt.probe(5, 0).map(|e| e.score), Some(WIN_SCORE - 2));

        tt.store(entry(6, 4, -(WIN_SCORE - 5), Bound::Exact), 3);
        assert_eq!(tt.probe(6, 1).map(|e| e.score), Some(-(WIN_SCORE - 3)));

        tt.store(entry(7, 4, 42, Bound::Exact), 3);
        assert_eq!(tt.probe(7, 0).map(|e| e.score), Some(42));
        assert_eq!(tt.probe(7, 9).map(|e| e.score), Some(42));
    }

    #[test]
    fn cutoff_respects_depth_and_bound() {
        let exact = entry(1, 3, 10, Bound::Exact);
        assert_eq!(exact.cutoff(3, -50, 50), Some(10));
        assert_eq!(exact.cutoff(4, -50, 50), None);

        let lower = entry(1, 3, 60, Bound::Lower);
        assert_eq!(lower.cutoff(2, -50, 50), Some(60));
        assert_eq!(lower.cutoff(2, -50, 80), None);

        let upper = entry(1, 3, -60, Bound::Upper);
        assert_eq!(upper.cutoff(2, -50, 50), Some(-60));
        assert_eq!(upper.cutoff(2, -80, 50), None);
    }

    #[test]
    fn classify_matches_window() {
        assert_eq!(Bound::classify(-10, -10, 10), Bound::Upper);
        assert_eq!(Bound::classify(10, -10, 10), Bound::Lower);
        assert_eq!(Bound::classify(0, -10, 10), Bound::Exact);
    }
}
