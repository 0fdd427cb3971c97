use std::io::{self, Write};

use crate::stats::StatsMap;

/// Order in which result lines are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Order {
    /// Whatever order the map iterates in.
    #[default]
    Map,
    /// Ascending by key bytes.
    Sorted,
}

/// Writes one `key;min/mean/max` line per key. Key bytes are written as-is.
pub fn write_results<W: Write>(out: &mut W, stats: &StatsMap, order: Order) -> io::Result<()> {
    let mut rows: Vec<_> = stats.iter().collect();
    if order == Order::Sorted {
        rows.sort_unstable_by(|a, b| a.0.cmp(b.0));
    }
    for (key, s) in rows {
        out.write_all(key)?;
        writeln!(out, ";{s}")?;
    }
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::record;

    #[test]
    fn renders_sorted_lines() {
        let mut stats = StatsMap::default();
        record(&mut stats, b"Paris", 123);
        record(&mut stats, b"Paris", 89);
        record(&mut stats, b"Oslo", -15);

        let mut out = Vec::new();
        write_results(&mut out, &stats, Order::Sorted).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Oslo;-1.5/-1.5/-1.5\nParis;8.9/10.6/12.3\n"
        );
    }

    #[test]
    fn map_order_still_writes_every_key() {
        let mut stats = StatsMap::default();
        for (i, key) in ["a", "b", "c", "d"].iter().enumerate() {
            record(&mut stats, key.as_bytes(), i as i64);
        }
        let mut out = Vec::new();
        write_results(&mut out, &stats, Order::Map).unwrap();
        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 4);
    }

    #[test]
    fn writes_key_bytes_unchanged() {
        let mut stats = StatsMap::default();
        record(&mut stats, b"Z\xfcrich", 10);

        let mut out = Vec::new();
        write_results(&mut out, &stats, Order::Map).unwrap();
        assert_eq!(out, b"Z\xfcrich;1.0/1.0/1.0\n");
    }
}
