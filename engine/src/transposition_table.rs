use serde::{Deserialize, Serialize};

use crate::board::Board;
use crate::config::EngineConfig;
use crate::moves::Move;

/// How a stored score relates to the position's true value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Bound {
    Exact,
    /// The search failed high: the true score is at least this.
    LowerBound,
    /// The search failed low: the true score is at most this.
    UpperBound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ReplacementPolicy {
    /// A depth-preferred slot backed by an always-replace slot.
    #[default]
    TwoTier,
    AlwaysReplace,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Legal moves of the position in generation order.
    pub moves: Vec<Move>,
    /// Remaining search depth the score was computed with.
    pub depth: i32,
    pub score: i32,
    pub bound: Bound,
    pub best_line: Vec<Move>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CacheStats {
    pub probes: u64,
    pub hits: u64,
    pub inserts: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        if self.probes == 0 {
            return 0.0;
        }
        self.hits as f64 / self.probes as f64
    }
}

#[derive(Debug, Clone)]
struct Slot {
    hash: u64,
    fingerprint: u64,
    entry: CacheEntry,
}

impl Slot {
    fn matches(&self, hash: u64, fingerprint: u64) -> bool {
        self.hash == hash && self.fingerprint == fingerprint
    }
}

/// Fixed-size table of search results indexed by Zobrist hash.
///
/// A slot only answers a probe when both the full hash and the occupancy
/// fingerprint match, so a bucket collision reads as a miss. A table of size
/// zero never stores anything, which turns caching off without changing the
/// search code.
#[derive(Debug, Clone)]
pub struct TranspositionTable {
    deep: Vec<Option<Slot>>,
    recent: Vec<Option<Slot>>,
    policy: ReplacementPolicy,
    stats: CacheStats,
}

impl TranspositionTable {
    pub fn new(size: usize, policy: ReplacementPolicy) -> Self {
        let recent_size = match policy {
            ReplacementPolicy::TwoTier => size,
            ReplacementPolicy::AlwaysReplace => 0,
        };
        Self {
            deep: vec![None; size],
            recent: vec![None; recent_size],
            policy,
            stats: CacheStats::default(),
        }
    }

    /// A table that misses on every probe.
    pub fn disabled() -> Self {
        Self::new(0, ReplacementPolicy::AlwaysReplace)
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        if config.use_cache {
            Self::new(config.hash_size, config.replacement)
        } else {
            Self::disabled()
        }
    }

    pub fn size(&self) -> usize {
        self.deep.len()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Number of filled slots across both tiers.
    pub fn occupied(&self) -> usize {
        self.deep
            .iter()
            .chain(self.recent.iter())
            .filter(|slot| slot.is_some())
            .count()
    }

    pub fn probe(&mut self, board: &Board) -> Option<&CacheEntry> {
        if self.deep.is_empty() {
            return None;
        }
        self.stats.probes += 1;

        let idx = self.index(board);
        let (hash, fingerprint) = (board.hash().value(), board.fingerprint());

        let found = [self.deep[idx].as_ref(), self.recent.get(idx).and_then(Option::as_ref)]
            .into_iter()
            .flatten()
            .find(|slot| slot.matches(hash, fingerprint));
        if found.is_some() {
            self.stats.hits += 1;
        }
        found.map(|slot| &slot.entry)
    }

    pub fn insert(&mut self, board: &Board, entry: CacheEntry) {
        if self.deep.is_empty() {
            return;
        }
        self.stats.inserts += 1;

        let idx = self.index(board);
        let slot = Slot {
            hash: board.hash().value(),
            fingerprint: board.fingerprint(),
            entry,
        };

        if self.policy == ReplacementPolicy::AlwaysReplace {
            self.deep[idx] = Some(slot);
            return;
        }

        let takes_deep = match &self.deep[idx] {
            None => true,
            Some(held) => {
                slot.entry.depth >= held.entry.depth || held.matches(slot.hash, slot.fingerprint)
            }
        };
        if takes_deep {
            // Drop any older copy of this position from the recent tier.
            if self.recent[idx]
                .as_ref()
                .is_some_and(|held| held.matches(slot.hash, slot.fingerprint))
            {
                self.recent[idx] = None;
            }
            self.deep[idx] = Some(slot);
        } else {
            self.recent[idx] = Some(slot);
        }
    }

    /// Empties every slot and resets the statistics. Needed whenever the board
    /// is replaced wholesale, e.g. on a new game or a loaded position.
    pub fn clear(&mut self) {
        self.deep.iter_mut().for_each(|slot| *slot = None);
        self.recent.iter_mut().for_each(|slot| *slot = None);
        self.stats = CacheStats::default();
    }

    fn index(&self, board: &Board) -> usize {
        (board.hash().value() % self.deep.len() as u64) as usize
    }
}
