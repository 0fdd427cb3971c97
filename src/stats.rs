use std::collections::HashMap;
use std::fmt;

/// Per-key statistics for one worker or for the merged result.
///
/// Keys are the raw bytes left of the `;`, kept exactly as read.
pub type StatsMap = HashMap<Box<[u8]>, Stats, ahash::RandomState>;

/// Running min/max/sum/count of values measured in tenths.
///
/// `sum` is wider than a single value so that adding any number of `i64`
/// readings cannot overflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub min: i64,
    pub max: i64,
    pub sum: i128,
    pub count: u64,
}

impl Stats {
    pub fn new(value: i64) -> Self {
        Self {
            min: value,
            max: value,
            sum: i128::from(value),
            count: 1,
        }
    }

    pub fn record(&mut self, value: i64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += i128::from(value);
        self.count += 1;
    }

    pub fn merge(&mut self, other: &Stats) {
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        self.sum += other.sum;
        self.count += other.count;
    }

    /// Mean in tenths, rounded half away from zero.
    ///
    /// Ties go away from zero on both sides: a mean of -1.5 tenths yields -2
    /// and prints as `-0.2`, where C-style `%.1f` formatting would give `-0.1`.
    pub fn mean(&self) -> i64 {
        let sum = self.sum;
        let n = i128::from(self.count.max(1));
        let rounded = if sum >= 0 {
            (sum + n / 2) / n
        } else {
            (sum - n / 2) / n
        };
        rounded as i64
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            Tenths(self.min),
            Tenths(self.mean()),
            Tenths(self.max)
        )
    }
}

/// A fixed-point value in tenths, displayed with exactly one decimal digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tenths(pub i64);

impl fmt::Display for Tenths {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{}", abs / 10, abs % 10)
    }
}

/// Folds one value into `map`, inserting the key on first sight.
pub fn record(map: &mut StatsMap, key: &[u8], value: i64) {
    match map.get_mut(key) {
        Some(stats) => stats.record(value),
        None => {
            map.insert(key.into(), Stats::new(value));
        }
    }
}
