//! Statement-round execution.

use std::sync::Arc;

use rand::seq::SliceRandom;
use tracing::{debug, info};

use crate::participant::EliminationCause;
use crate::record::{StatementRecord, TerminationReason};
use crate::retry::retry_async;
use crate::session::{GameSession, SessionError};
use crate::win::check_win;

impl GameSession {
    /// Run one complete statement pass: every active participant, in a
    /// freshly shuffled order, produces one statement that is judged
    /// immediately. A participant eliminated earlier in the same pass
    /// is skipped when their turn comes.
    ///
    /// Returns `Ok(false)` when an elimination ended the game mid-pass.
    pub(crate) async fn conduct_statement_round(&mut self) -> Result<bool, SessionError> {
        let mut order: Vec<usize> = (0..self.participants.len())
            .filter(|&i| self.participants[i].is_active())
            .collect();
        order.shuffle(&mut self.rng);
        self.history.push_round(self.current_statement_round);
        debug!(
            round = self.current_statement_round,
            speakers = order.len(),
            "statement round started"
        );

        for idx in order {
            // Re-check: an earlier turn in this pass may have removed
            // this participant.
            if !self.participants[idx].is_active() {
                continue;
            }
            let Some((own_concept, other_concept)) = self.concepts_for(idx) else {
                continue;
            };
            let pid = self.participants[idx].id;
            let attempts = self.config.collaborator_attempts;
            let delay = self.config.collaborator_retry_delay();

            let player = Arc::clone(&self.players[idx]);
            let history = &self.history;
            let content = retry_async(attempts, delay, || {
                player.generate(pid, &own_concept, history)
            })
            .await
            .map_err(|source| SessionError::Generation {
                participant: pid,
                source,
            })?;

            let policy = self.policy.clone();
            let verdict = retry_async(attempts, delay, || {
                policy.judge(&content, &own_concept, &other_concept, history)
            })
            .await
            .map_err(|source| SessionError::Evaluation {
                participant: pid,
                source,
            })?;

            let statement_id = self.statements.len() as u32 + 1;
            self.history.push_statement(pid, &content);
            self.statements.push(StatementRecord {
                statement_id,
                participant: pid,
                content,
                statement_round: self.current_statement_round,
                evaluation: verdict.evaluation,
            });
            info!(
                participant = pid,
                round = self.current_statement_round,
                eliminate = verdict.eliminate,
                "statement judged"
            );

            if verdict.eliminate {
                let reason = verdict
                    .reason
                    .unwrap_or_else(|| "evaluator verdict".to_string());
                self.eliminate_participant(idx, EliminationCause::Metric, &reason);
                if let Some(winner) = check_win(&self.participants) {
                    self.finish(winner, TerminationReason::Decisive);
                    return Ok(false);
                }
            }
        }

        Ok(true)
    }
}
