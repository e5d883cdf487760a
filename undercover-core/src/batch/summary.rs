//! End-of-run reporting.

use std::time::Duration;

use serde::Serialize;

use crate::batch::FailureRecord;

/// Final (or partial, on interrupt/halt) accounting for a batch run.
///
/// `attempted == completed + failed` always holds; tasks that never
/// started because of an interrupt count toward `planned` only.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub planned: usize,
    pub attempted: usize,
    pub completed: usize,
    pub failed: usize,
    /// `completed / attempted`, zero when nothing was attempted.
    pub success_rate: f64,
    pub duration_secs: f64,
    /// Wall-clock duration as `HH:MM:SS`.
    pub duration_formatted: String,
    pub games_per_minute: f64,
    /// The run was cancelled externally before finishing.
    pub interrupted: bool,
    /// A task exhausted its retries with `continue_on_error` off.
    pub halted: bool,
    pub failures: Vec<FailureRecord>,
}

impl RunSummary {
    pub(crate) fn build(
        planned: usize,
        completed: usize,
        failures: Vec<FailureRecord>,
        elapsed: Duration,
        interrupted: bool,
        halted: bool,
    ) -> Self {
        let failed = failures.len();
        let attempted = completed + failed;
        let success_rate = if attempted > 0 {
            completed as f64 / attempted as f64
        } else {
            0.0
        };
        let secs = elapsed.as_secs_f64();
        let games_per_minute = if secs > 0.0 {
            completed as f64 * 60.0 / secs
        } else {
            0.0
        };
        Self {
            planned,
            attempted,
            completed,
            failed,
            success_rate,
            duration_secs: secs,
            duration_formatted: format_duration(elapsed),
            games_per_minute,
            interrupted,
            halted,
            failures,
        }
    }
}

pub fn format_duration(d: Duration) -> String {
    let total = d.as_secs();
    format!("{:02}:{:02}:{:02}", total / 3600, (total % 3600) / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_formats_as_hms() {
        assert_eq!(format_duration(Duration::from_secs(0)), "00:00:00");
        assert_eq!(format_duration(Duration::from_secs(61)), "00:01:01");
        assert_eq!(format_duration(Duration::from_secs(3725)), "01:02:05");
    }

    #[test]
    fn rates_guard_against_empty_runs() {
        let summary = RunSummary::build(4, 0, Vec::new(), Duration::ZERO, true, false);
        assert_eq!(summary.attempted, 0);
        assert_eq!(summary.success_rate, 0.0);
        assert_eq!(summary.games_per_minute, 0.0);
        assert!(summary.interrupted);
    }

    #[test]
    fn attempted_is_completed_plus_failed() {
        let summary = RunSummary::build(6, 5, Vec::new(), Duration::from_secs(30), false, false);
        assert_eq!(summary.attempted, 5);
        assert_eq!(summary.success_rate, 1.0);
        assert_eq!(summary.games_per_minute, 10.0);
    }
}
