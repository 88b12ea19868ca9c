//! Snapshot undo history for the source atlas

use std::collections::VecDeque;

/// Copies of the source surface bytes taken before each edit, newest last.
///
/// Holds at most `limit` snapshots; pushing past the limit drops the oldest.
#[derive(Debug, Clone)]
pub struct SnapshotHistory {
    snapshots: VecDeque<Vec<u8>>,
    limit: usize,
}

impl SnapshotHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Record a snapshot. A limit of zero keeps nothing.
    pub fn push(&mut self, snapshot: Vec<u8>) {
        if self.limit == 0 {
            return;
        }
        while self.snapshots.len() >= self.limit {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    /// Take the newest snapshot
    pub fn pop(&mut self) -> Option<Vec<u8>> {
        self.snapshots.pop_back()
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.snapshots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_pop_is_lifo() {
        let mut history = SnapshotHistory::new(4);
        history.push(vec![1]);
        history.push(vec![2]);
        assert_eq!(history.pop(), Some(vec![2]));
        assert_eq!(history.pop(), Some(vec![1]));
        assert_eq!(history.pop(), None);
        assert!(!history.can_undo());
    }

    #[test]
    fn test_oldest_dropped_at_limit() {
        let mut history = SnapshotHistory::new(2);
        for i in 0..5u8 {
            history.push(vec![i]);
        }
        assert_eq!(history.len(), 2);
        assert_eq!(history.pop(), Some(vec![4]));
        assert_eq!(history.pop(), Some(vec![3]));
        assert!(history.is_empty());
    }

    #[test]
    fn test_zero_limit_keeps_nothing() {
        let mut history = SnapshotHistory::new(0);
        history.push(vec![1]);
        assert!(history.is_empty());
    }
}
