//! Batch orchestration: run many sessions over a list of concept
//! pairs with bounded concurrency, per-task retries, and interrupt-
//! safe result aggregation.

mod aggregator;
mod orchestrator;
mod summary;

pub use aggregator::{CompletedGame, FailureRecord, ResultAggregator};
pub use orchestrator::{BatchError, BatchOrchestrator, SessionProvider};
pub use summary::RunSummary;

use serde::{Deserialize, Serialize};

use crate::record::ConceptPair;

/// One planned session: a concept pair plus its repetition ordinal.
/// Retries re-run the same task with a fresh session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchTask {
    pub pair: ConceptPair,
    /// Index of the pair in the submitted list.
    pub pair_index: usize,
    /// 1-based repetition within the pair.
    pub repetition: u32,
    /// Session seed derived from the batch base seed, when one is set.
    pub seed: Option<u64>,
}
