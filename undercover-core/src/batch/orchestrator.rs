//! The batch scheduler.
//!
//! Tasks are planned up front (every pair times `rounds_per_pair`),
//! optionally chunked into scheduling groups, and fanned out over a
//! semaphore-bounded worker pool. Each task retries with a fresh
//! session per attempt; workers record their own outcome so a lost
//! worker never corrupts the accounting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::batch::{BatchTask, ResultAggregator, RunSummary};
use crate::config::BatchConfig;
use crate::record::ConceptPair;
use crate::session::GameSession;

/// Builds a fresh session for a task attempt. Retried attempts get a
/// brand-new session; nothing carries over from a failed run.
pub trait SessionProvider: Send + Sync + 'static {
    fn create(&self, task: &BatchTask) -> GameSession;
}

impl<F> SessionProvider for F
where
    F: Fn(&BatchTask) -> GameSession + Send + Sync + 'static,
{
    fn create(&self, task: &BatchTask) -> GameSession {
        self(task)
    }
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("invalid batch config: {0}")]
    InvalidConfig(String),

    /// A task exhausted its retries with `continue_on_error` off. The
    /// partial summary covers everything finished before the halt.
    #[error("batch halted after a task exhausted its retries")]
    Halted(Box<RunSummary>),
}

pub struct BatchOrchestrator<P: SessionProvider> {
    config: BatchConfig,
    provider: Arc<P>,
    aggregator: Arc<ResultAggregator>,
    cancel: CancellationToken,
}

impl<P: SessionProvider> BatchOrchestrator<P> {
    pub fn new(config: BatchConfig, provider: P) -> Self {
        Self {
            config,
            provider: Arc::new(provider),
            aggregator: Arc::new(ResultAggregator::new()),
            cancel: CancellationToken::new(),
        }
    }

    /// Token for external interruption (e.g. Ctrl-C). Cancelling stops
    /// new work; results recorded so far stay intact.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn aggregator(&self) -> Arc<ResultAggregator> {
        Arc::clone(&self.aggregator)
    }

    /// Run every pair `rounds_per_pair` times. Always produces a
    /// summary: the `Halted` error wraps the partial one.
    pub async fn run(&self, pairs: &[ConceptPair]) -> Result<RunSummary, BatchError> {
        self.config.validate().map_err(BatchError::InvalidConfig)?;
        let started = Instant::now();

        let mut tasks = Vec::new();
        let mut task_number: u64 = 0;
        for (pair_index, pair) in pairs.iter().enumerate() {
            for repetition in 1..=self.config.rounds_per_pair {
                let seed = self.config.base_seed.map(|s| s.wrapping_add(task_number));
                tasks.push(BatchTask {
                    pair: pair.clone(),
                    pair_index,
                    repetition,
                    seed,
                });
                task_number += 1;
            }
        }
        let planned = tasks.len();
        let chunk = self.config.chunk_size.unwrap_or(planned.max(1));
        let semaphore = Arc::new(Semaphore::new(self.config.max_workers));
        let halted = Arc::new(AtomicBool::new(false));
        info!(
            planned,
            workers = self.config.max_workers,
            chunk,
            "batch started"
        );

        for group in tasks.chunks(chunk) {
            if self.cancel.is_cancelled() {
                break;
            }
            let mut join_set = JoinSet::new();
            for task in group {
                if self.cancel.is_cancelled() {
                    break;
                }
                let task = task.clone();
                let provider = Arc::clone(&self.provider);
                let aggregator = Arc::clone(&self.aggregator);
                let semaphore = Arc::clone(&semaphore);
                let cancel = self.cancel.clone();
                let halted = Arc::clone(&halted);
                let config = self.config.clone();
                join_set.spawn(async move {
                    let Ok(_permit) = semaphore.acquire().await else {
                        return;
                    };
                    run_task(task, provider, aggregator, cancel, halted, config).await;
                });
            }
            while let Some(joined) = join_set.join_next().await {
                if let Err(err) = joined {
                    warn!(error = %err, "batch worker lost");
                }
            }
        }

        let (completed, _) = self.aggregator.counts();
        let failures = self.aggregator.failures();
        let was_halted = halted.load(Ordering::SeqCst);
        let interrupted = self.cancel.is_cancelled() && !was_halted;
        let summary = RunSummary::build(
            planned,
            completed,
            failures,
            started.elapsed(),
            interrupted,
            was_halted,
        );
        info!(
            completed = summary.completed,
            failed = summary.failed,
            duration = %summary.duration_formatted,
            interrupted = summary.interrupted,
            "batch finished"
        );

        if was_halted {
            return Err(BatchError::Halted(Box::new(summary)));
        }
        Ok(summary)
    }
}

async fn run_task<P: SessionProvider>(
    task: BatchTask,
    provider: Arc<P>,
    aggregator: Arc<ResultAggregator>,
    cancel: CancellationToken,
    halted: Arc<AtomicBool>,
    config: BatchConfig,
) {
    let attempts = config.max_retries + 1;
    let mut last_error = String::new();

    for attempt in 1..=attempts {
        if cancel.is_cancelled() {
            // Interrupted before a recorded outcome: the task counts
            // as never attempted.
            return;
        }
        let session = provider.create(&task);
        match session.run().await {
            Ok(record) => {
                info!(
                    pair = %task.pair,
                    repetition = task.repetition,
                    attempt,
                    winner = %record.summary.winner_role,
                    "game completed"
                );
                aggregator.record_completed(task, record);
                return;
            }
            Err(err) => {
                warn!(
                    pair = %task.pair,
                    repetition = task.repetition,
                    attempt,
                    error = %err,
                    "game attempt failed"
                );
                last_error = err.to_string();
                if attempt < attempts {
                    tokio::select! {
                        _ = cancel.cancelled() => return,
                        _ = sleep(config.retry_delay()) => {}
                    }
                }
            }
        }
    }

    error!(pair = %task.pair, repetition = task.repetition, attempts, "task exhausted retries");
    aggregator.record_failure(task, &last_error, attempts);
    if !config.continue_on_error {
        halted.store(true, Ordering::SeqCst);
        cancel.cancel();
    }
}
