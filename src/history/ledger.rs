//! HistoryLedger - bounded undo ring

use std::collections::VecDeque;

use crate::history::snapshot::Snapshot;

/// Default number of undo steps kept
pub const DEFAULT_UNDO_DEPTH: usize = 10;

/// Ring buffer of recent snapshots, oldest evicted first
#[derive(Debug, Clone)]
pub struct HistoryLedger {
    entries: VecDeque<Snapshot>,
    capacity: usize,
}

impl Default for HistoryLedger {
    fn default() -> Self {
        Self::new(DEFAULT_UNDO_DEPTH)
    }
}

impl HistoryLedger {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&mut self, snapshot: Snapshot) {
        if self.entries.len() >= self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(snapshot);
    }

    /// Step back `steps` entries.
    ///
    /// Needs at least `steps + 1` entries so there is a state to return to;
    /// otherwise nothing is discarded and None is returned.
    pub fn undo(&mut self, steps: usize) -> Option<Snapshot> {
        if self.entries.len() < steps + 1 {
            return None;
        }
        for _ in 0..steps {
            self.entries.pop_back();
        }
        self.entries.back().cloned()
    }

    /// The entry `undo(steps)` would return, without discarding anything
    pub fn peek_back(&self, steps: usize) -> Option<&Snapshot> {
        let idx = self.entries.len().checked_sub(steps)?.checked_sub(1)?;
        self.entries.get(idx)
    }

    pub fn latest(&self) -> Option<&Snapshot> {
        self.entries.back()
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

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::GridPos;
    use crate::courier::Courier;
    use crate::weather::WeatherCondition;

    fn snap_at(x: i32) -> Snapshot {
        let courier = Courier::new(GridPos::new(x, 0), 100.0);
        Snapshot::capture(&courier, x as f64, &WeatherCondition::Clear)
    }

    #[test]
    fn test_undo_needs_a_prior_state() {
        let mut ledger = HistoryLedger::default();
        assert!(ledger.undo(1).is_none());

        ledger.record(snap_at(1));
        assert!(ledger.undo(1).is_none());
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_peek_back_matches_undo_without_popping() {
        let mut ledger = HistoryLedger::default();
        for x in 0..4 {
            ledger.record(snap_at(x));
        }
        assert_eq!(ledger.peek_back(2).unwrap().position(), GridPos::new(1, 0));
        assert!(ledger.peek_back(4).is_none());
        assert_eq!(ledger.len(), 4);
        assert_eq!(ledger.undo(2).unwrap().position(), GridPos::new(1, 0));
    }

    #[test]
    fn test_undo_returns_second_to_last() {
        let mut ledger = HistoryLedger::default();
        ledger.record(snap_at(1));
        ledger.record(snap_at(2));
        ledger.record(snap_at(3));

        let restored = ledger.undo(1).unwrap();
        assert_eq!(restored.position(), GridPos::new(2, 0));
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.latest().unwrap().position(), GridPos::new(2, 0));
    }

    #[test]
    fn test_undo_multiple_steps() {
        let mut ledger = HistoryLedger::default();
        for x in 1..=5 {
            ledger.record(snap_at(x));
        }
        assert_eq!(ledger.undo(3).unwrap().position(), GridPos::new(2, 0));
        assert!(ledger.undo(2).is_none());
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_oldest_evicted_beyond_capacity() {
        let mut ledger = HistoryLedger::default();
        for x in 0..15 {
            ledger.record(snap_at(x));
        }
        assert_eq!(ledger.len(), 10);
        assert_eq!(ledger.undo(9).unwrap().position(), GridPos::new(5, 0));
    }
}
