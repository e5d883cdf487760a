//! Thread-safe collection of batch outcomes.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::batch::BatchTask;
use crate::record::GameRecord;

/// A finished game together with the task that produced it.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedGame {
    pub task: BatchTask,
    pub record: GameRecord,
    pub finished_at: DateTime<Utc>,
}

/// A task that exhausted its retry budget.
#[derive(Debug, Clone, Serialize)]
pub struct FailureRecord {
    pub task: BatchTask,
    pub error: String,
    /// Total attempts made, including the first.
    pub attempts: u32,
    pub failed_at: DateTime<Utc>,
}

/// Shared sink the workers report into. Lock scope covers only the
/// appends; workers never hold it across a session.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    completed: Vec<CompletedGame>,
    failed: Vec<FailureRecord>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_completed(&self, task: BatchTask, record: GameRecord) {
        let mut inner = self.lock();
        inner.completed.push(CompletedGame {
            task,
            record,
            finished_at: Utc::now(),
        });
    }

    pub fn record_failure(&self, task: BatchTask, error: &str, attempts: u32) {
        let mut inner = self.lock();
        inner.failed.push(FailureRecord {
            task,
            error: error.to_string(),
            attempts,
            failed_at: Utc::now(),
        });
    }

    /// `(completed, failed)` so far.
    pub fn counts(&self) -> (usize, usize) {
        let inner = self.lock();
        (inner.completed.len(), inner.failed.len())
    }

    pub fn failures(&self) -> Vec<FailureRecord> {
        self.lock().failed.clone()
    }

    /// Drain the completed games for persistence.
    pub fn take_completed(&self) -> Vec<CompletedGame> {
        std::mem::take(&mut self.lock().completed)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::ConceptPair;

    fn task() -> BatchTask {
        BatchTask {
            pair: ConceptPair::new("apple", "pear"),
            pair_index: 0,
            repetition: 1,
            seed: None,
        }
    }

    #[test]
    fn counts_track_appends() {
        let agg = ResultAggregator::new();
        agg.record_failure(task(), "boom", 3);
        agg.record_failure(task(), "boom", 3);
        assert_eq!(agg.counts(), (0, 2));
        assert_eq!(agg.failures().len(), 2);
    }

    #[test]
    fn take_completed_drains() {
        let agg = ResultAggregator::new();
        assert!(agg.take_completed().is_empty());
        assert_eq!(agg.counts(), (0, 0));
    }
}
