//! Session and batch configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Shared per-session settings, copied into every batch task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Size of the group sharing the common concept.
    pub majority_count: usize,
    /// Size of the group holding the different concept.
    pub minority_count: usize,
    /// Complete statement passes between voting rounds.
    pub statements_per_voting: u32,
    /// Hard cap on statement rounds before the fallback outcome.
    pub max_statement_rounds: u32,
    /// Phase-local attempts per collaborator call before the session
    /// fails.
    pub collaborator_attempts: u32,
    /// Delay between phase-local attempts, in milliseconds.
    pub collaborator_retry_delay_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            majority_count: 3,
            minority_count: 1,
            statements_per_voting: 1,
            max_statement_rounds: 10,
            collaborator_attempts: 3,
            collaborator_retry_delay_ms: 0,
        }
    }
}

impl SessionConfig {
    pub fn collaborator_retry_delay(&self) -> Duration {
        Duration::from_millis(self.collaborator_retry_delay_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.majority_count + self.minority_count == 0 {
            return Err("majority_count + minority_count must be positive".to_string());
        }
        if self.max_statement_rounds == 0 {
            return Err("max_statement_rounds must be positive".to_string());
        }
        if self.statements_per_voting == 0 {
            return Err("statements_per_voting must be positive".to_string());
        }
        Ok(())
    }
}

/// Batch-run settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Bound on concurrently running sessions.
    pub max_workers: usize,
    /// Concept pairs per scheduling group; `None` runs everything as
    /// one group.
    pub chunk_size: Option<usize>,
    /// Sessions per concept pair.
    pub rounds_per_pair: u32,
    /// Additional attempts after a failed session.
    pub max_retries: u32,
    /// Delay between task attempts, in milliseconds.
    pub retry_delay_ms: u64,
    /// Keep going after a task exhausts its retries; false halts the
    /// batch with a partial summary.
    pub continue_on_error: bool,
    /// Base seed for per-task session seeds; `None` draws one from
    /// entropy.
    pub base_seed: Option<u64>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_workers: 3,
            chunk_size: None,
            rounds_per_pair: 1,
            max_retries: 2,
            retry_delay_ms: 2000,
            continue_on_error: true,
            base_seed: None,
        }
    }
}

impl BatchConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_workers == 0 {
            return Err("max_workers must be positive".to_string());
        }
        if self.rounds_per_pair == 0 {
            return Err("rounds_per_pair must be positive".to_string());
        }
        if self.chunk_size == Some(0) {
            return Err("chunk_size must be positive when set".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SessionConfig::default().validate().is_ok());
        assert!(BatchConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_workers_is_rejected() {
        let config = BatchConfig {
            max_workers: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let config = BatchConfig {
            chunk_size: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
