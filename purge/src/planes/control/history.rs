use crate::domain::InvalidationResult;
use std::collections::VecDeque;

/// Hard ceiling on how many entries a single history query returns
pub const MAX_HISTORY_QUERY: usize = 200;

const MIN_CAPACITY: usize = 2;

/// Bounded, most-recent-first audit log of invalidation results.
///
/// Overflowing the capacity trims the log to half capacity in one step, so
/// eviction cost is amortized over many inserts.
#[derive(Debug)]
pub struct InvalidationHistory {
    entries: VecDeque<InvalidationResult>,
    capacity: usize,
}

impl InvalidationHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(MIN_CAPACITY);
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    pub fn record(&mut self, result: InvalidationResult) {
        self.entries.push_front(result);
        if self.entries.len() > self.capacity {
            self.entries.truncate(self.capacity / 2);
        }
    }

    /// Up to `limit` entries, newest first. `limit` is clamped to [`MAX_HISTORY_QUERY`].
    pub fn recent(&self, limit: usize) -> Vec<InvalidationResult> {
        self.entries
            .iter()
            .take(limit.min(MAX_HISTORY_QUERY))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::InvalidationStatus;
    use chrono::Utc;
    use std::collections::BTreeMap;

    fn entry(id: usize) -> InvalidationResult {
        InvalidationResult {
            request_id: format!("req-{}", id),
            status: InvalidationStatus::Success,
            targets_processed: BTreeMap::new(),
            keys_invalidated: 0,
            errors: Vec::new(),
            duration_ms: 0.0,
            timestamp: Utc::now(),
        }
    }

    fn ids(entries: &[InvalidationResult]) -> Vec<&str> {
        entries.iter().map(|e| e.request_id.as_str()).collect()
    }

    #[test]
    fn test_recent_is_newest_first() {
        let mut history = InvalidationHistory::new(10);
        for i in 0..4 {
            history.record(entry(i));
        }
        assert_eq!(ids(&history.recent(4)), ["req-3", "req-2", "req-1", "req-0"]);
        assert_eq!(ids(&history.recent(2)), ["req-3", "req-2"]);
        assert_eq!(history.recent(100).len(), 4);
        assert!(history.recent(0).is_empty());
    }

    #[test]
    fn test_size_never_exceeds_capacity() {
        let mut history = InvalidationHistory::new(10);
        for i in 0..57 {
            history.record(entry(i));
            assert!(history.len() <= history.capacity());
        }
        assert_eq!(history.recent(1)[0].request_id, "req-56");
    }

    #[test]
    fn test_overflow_trims_to_half_capacity() {
        let mut history = InvalidationHistory::new(4);
        for i in 0..5 {
            history.record(entry(i));
        }
        assert_eq!(ids(&history.recent(10)), ["req-4", "req-3"]);
    }

    #[test]
    fn test_query_limit_is_clamped() {
        let mut history = InvalidationHistory::new(500);
        for i in 0..300 {
            history.record(entry(i));
        }
        assert_eq!(history.recent(usize::MAX).len(), MAX_HISTORY_QUERY);
    }

    #[test]
    fn test_capacity_floor() {
        let history = InvalidationHistory::new(0);
        assert_eq!(history.capacity(), 2);
        assert!(history.is_empty());
    }
}
