//! Merging per-worker results into one final map.

use std::collections::hash_map::Entry;

use crate::stats::StatsMap;
use crate::worker::PartialResult;

/// Merges `partial` into `acc` key by key. No key is ever dropped.
///
/// The merge is associative and commutative, so the final map does not depend
/// on the order in which partial maps arrive.
pub fn combine(acc: &mut StatsMap, partial: StatsMap) {
    for (key, stats) in partial {
        match acc.entry(key) {
            Entry::Occupied(mut e) => e.get_mut().merge(&stats),
            Entry::Vacant(e) => {
                e.insert(stats);
            }
        }
    }
}

/// The merged outcome of a run.
#[derive(Debug, Default)]
pub struct Aggregate {
    pub stats: StatsMap,
    pub rows: u64,
    pub malformed: u64,
}

/// Sequential fold over worker results, one at a time.
#[derive(Debug, Default)]
pub struct StatsAggregator {
    acc: Aggregate,
    merged: usize,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, partial: PartialResult) {
        self.acc.rows += partial.rows;
        self.acc.malformed += partial.malformed;
        combine(&mut self.acc.stats, partial.stats);
        self.merged += 1;
    }

    /// Number of partial results folded in so far.
    pub fn merged(&self) -> usize {
        self.merged
    }

    pub fn finish(self) -> Aggregate {
        self.acc
    }
}
