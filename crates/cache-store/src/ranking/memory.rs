//! In-process score table with scan-then-sort snapshots.

use cache_domain::{ScoreEntry, ScoreUpdate};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Identifier → score map behind a reader/writer lock.
#[derive(Debug, Default)]
pub struct MemoryRanking {
    scores: RwLock<HashMap<String, f64>>,
}

impl MemoryRanking {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last write wins. Reports whether the stored score actually changed.
    pub fn record(&self, identifier: impl Into<String>, score: f64) -> ScoreUpdate {
        let previous = self.scores.write().insert(identifier.into(), score);
        match previous {
            Some(prev) if prev == score => ScoreUpdate::Unchanged,
            _ => ScoreUpdate::Changed,
        }
    }

    /// Copy of every pair, taken under the read lock only.
    pub fn snapshot(&self) -> Vec<ScoreEntry> {
        let scores = self.scores.read();
        scores
            .iter()
            .map(|(id, score)| ScoreEntry::new(id.clone(), *score))
            .collect()
    }

    /// Highest `n` scores, descending. The sort runs after the lock is
    /// released, so writers racing with it may or may not be reflected.
    pub fn top_n(&self, n: usize) -> Vec<ScoreEntry> {
        let mut entries = self.snapshot();
        entries.sort_by(|a, b| b.score.total_cmp(&a.score));
        entries.truncate(n);
        entries
    }

    pub fn len(&self) -> usize {
        self.scores.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn seeded() -> MemoryRanking {
        let ranking = MemoryRanking::new();
        ranking.record("a", 10.0);
        ranking.record("b", 30.0);
        ranking.record("c", 20.0);
        ranking
    }

    #[test]
    fn test_top_n_orders_descending() {
        let top = seeded().top_n(2);
        assert_eq!(top, vec![ScoreEntry::new("b", 30.0), ScoreEntry::new("c", 20.0)]);
    }

    #[test]
    fn test_top_n_clamps_to_available() {
        let top = seeded().top_n(10);
        let ids: Vec<_> = top.iter().map(|e| e.identifier.as_str()).collect();
        assert_eq!(ids, ["b", "c", "a"]);
    }

    #[test]
    fn test_record_reports_unchanged_and_overwrites() {
        let ranking = MemoryRanking::new();
        assert_eq!(ranking.record("a", 5.0), ScoreUpdate::Changed);
        assert_eq!(ranking.record("a", 5.0), ScoreUpdate::Unchanged);
        assert_eq!(ranking.record("a", 1.0), ScoreUpdate::Changed);
        assert_eq!(ranking.top_n(1), vec![ScoreEntry::new("a", 1.0)]);
        assert_eq!(ranking.len(), 1);
    }

    #[test]
    fn test_snapshots_tolerate_concurrent_writers() {
        let ranking = Arc::new(MemoryRanking::new());

        let writers: Vec<_> = (0..4)
            .map(|w| {
                let ranking = Arc::clone(&ranking);
                std::thread::spawn(move || {
                    for i in 0..500 {
                        ranking.record(format!("w{w}-{}", i % 50), f64::from(i));
                    }
                })
            })
            .collect();

        for _ in 0..100 {
            let top = ranking.top_n(5);
            assert!(top.len() <= 5);
            assert!(top.windows(2).all(|pair| pair[0].score >= pair[1].score));
        }

        for writer in writers {
            writer.join().unwrap();
        }
        assert_eq!(ranking.len(), 200);
    }
}
