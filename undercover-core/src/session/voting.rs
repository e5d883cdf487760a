//! Voting-round execution.

use std::collections::BTreeMap;
use std::sync::Arc;

use rand::Rng;
use tracing::{debug, info};

use crate::participant::{EliminationCause, ParticipantId, Role, AUDIENCE_ID};
use crate::record::{Ballot, VotingRound};
use crate::retry::retry_async;
use crate::session::{GameSession, SessionError, VotingMode};

impl GameSession {
    /// Conduct one voting round: collect ballots, tally over active
    /// candidates, break ties uniformly at random, eliminate the
    /// chosen participant.
    pub(crate) async fn conduct_voting_round(&mut self) -> Result<(), SessionError> {
        self.current_voting_round += 1;
        let active = self.active_ids();
        let attempts = self.config.collaborator_attempts;
        let delay = self.config.collaborator_retry_delay();

        let mut ballots: Vec<Ballot> = Vec::new();
        match self.voting_mode.clone() {
            VotingMode::Players => {
                let voters: Vec<usize> = (0..self.participants.len())
                    .filter(|&i| self.participants[i].is_active())
                    .collect();
                for idx in voters {
                    let Some((own_concept, _)) = self.concepts_for(idx) else {
                        continue;
                    };
                    let pid = self.participants[idx].id;
                    let player = Arc::clone(&self.players[idx]);
                    let history = &self.history;
                    let target = retry_async(attempts, delay, || {
                        player.vote(pid, &own_concept, history, &active)
                    })
                    .await
                    .map_err(|source| SessionError::Vote {
                        participant: pid,
                        source,
                    })?;
                    debug!(voter = pid, target, "ballot cast");
                    ballots.push(Ballot {
                        voter: pid,
                        target,
                    });
                }
            }
            VotingMode::Audience(decider) => {
                let history = &self.history;
                let target = retry_async(attempts, delay, || {
                    decider.vote(AUDIENCE_ID, "", history, &active)
                })
                .await
                .map_err(|source| SessionError::Vote {
                    participant: AUDIENCE_ID,
                    source,
                })?;
                debug!(target, "audience ballot cast");
                ballots.push(Ballot {
                    voter: AUDIENCE_ID,
                    target,
                });
            }
        }

        // Ballots are recorded verbatim; only votes for still-active
        // candidates count toward the tally.
        let mut tally: BTreeMap<ParticipantId, u32> = BTreeMap::new();
        for ballot in &ballots {
            if active.contains(&ballot.target) {
                *tally.entry(ballot.target).or_insert(0) += 1;
            }
        }
        let Some(&top_count) = tally.values().max() else {
            return Err(SessionError::EmptyTally {
                voting_round: self.current_voting_round,
            });
        };

        let candidates: Vec<usize> = (0..self.participants.len())
            .filter(|&i| tally.get(&self.participants[i].id) == Some(&top_count))
            .collect();
        let chosen = candidates[self.rng.gen_range(0..candidates.len())];
        let eliminated = self.participants[chosen].id;
        let Some(eliminated_role) =
            self.eliminate_participant(chosen, EliminationCause::Vote, "voted out")
        else {
            unreachable!("tally candidates are active participants");
        };
        let correct = eliminated_role == Role::Minority;

        info!(
            voting_round = self.current_voting_round,
            eliminated,
            role = %eliminated_role,
            correct,
            tie_candidates = candidates.len(),
            "voting round resolved"
        );

        self.voting_rounds.push(VotingRound {
            voting_round_id: self.current_voting_round,
            after_statement_round: self.current_statement_round,
            ballots,
            tally,
            eliminated,
            eliminated_role,
            correct,
        });

        Ok(())
    }
}
