//! The per-session state machine.
//!
//! `Init → RolesAssigned → {StatementRound → (VotingRound)?}* →
//! Terminal`. A session runs `statements_per_voting` statement passes,
//! then one voting phase, then the win check, until a role wins or the
//! round cap is exhausted. All phases execute strictly sequentially;
//! the only suspension points are collaborator calls.

mod statement;
mod voting;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::collaborator::{EvaluationError, GenerationError, PlayerAgent, VoteDecider};
use crate::config::SessionConfig;
use crate::history::StatementHistory;
use crate::participant::{EliminationCause, Participant, ParticipantId, Role};
use crate::policy::EliminationPolicy;
use crate::record::{
    decision_quality, ConceptPair, GameRecord, GameSummary, MetricElimination, StatementRecord,
    TerminationReason, VotingRound,
};
use crate::roles::assign_roles;
use crate::win::check_win;

/// Session-level failure. Collaborator errors carry the participant
/// whose turn failed after the phase-local retry budget.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("insufficient participants: need {required}, have {available}")]
    InsufficientParticipants { required: usize, available: usize },

    #[error("roles were already assigned for this session")]
    RolesAlreadyAssigned,

    #[error("invalid session config: {0}")]
    InvalidConfig(String),

    #[error("statement generation failed for participant {participant}: {source}")]
    Generation {
        participant: ParticipantId,
        #[source]
        source: GenerationError,
    },

    #[error("evaluation failed for participant {participant}: {source}")]
    Evaluation {
        participant: ParticipantId,
        #[source]
        source: EvaluationError,
    },

    #[error("vote decision failed for participant {participant}: {source}")]
    Vote {
        participant: ParticipantId,
        #[source]
        source: GenerationError,
    },

    #[error("voting round {voting_round} produced no valid ballots")]
    EmptyTally { voting_round: u32 },
}

/// Who eliminates at round boundaries.
#[derive(Clone)]
pub enum VotingMode {
    /// Every active participant casts one ballot.
    Players,
    /// A single audience elector (id 0) casts the deciding ballot.
    Audience(Arc<dyn VoteDecider>),
}

impl std::fmt::Debug for VotingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Players => write!(f, "players"),
            Self::Audience(_) => write!(f, "audience"),
        }
    }
}

/// One game from role assignment to the finalized record.
///
/// Construct with [`GameSession::new`], optionally seed with
/// [`GameSession::with_seed`] for reproducible ordering and
/// tie-breaks, then drive to completion with [`GameSession::run`].
pub struct GameSession {
    session_id: Uuid,
    started_at: DateTime<Utc>,
    config: SessionConfig,
    pair: ConceptPair,
    participants: Vec<Participant>,
    /// Parallel to `participants`.
    players: Vec<Arc<dyn PlayerAgent>>,
    policy: EliminationPolicy,
    voting_mode: VotingMode,
    rng: ChaCha8Rng,

    current_statement_round: u32,
    current_voting_round: u32,
    history: StatementHistory,
    statements: Vec<StatementRecord>,
    metric_eliminations: Vec<MetricElimination>,
    voting_rounds: Vec<VotingRound>,
    game_over: bool,
    winner_role: Option<Role>,
    termination: TerminationReason,
}

impl GameSession {
    pub fn new(
        config: SessionConfig,
        pair: ConceptPair,
        players: Vec<Arc<dyn PlayerAgent>>,
        policy: EliminationPolicy,
    ) -> Self {
        let participants = (1..=players.len() as u32).map(Participant::new).collect();
        Self {
            session_id: Uuid::new_v4(),
            started_at: Utc::now(),
            config,
            pair,
            participants,
            players,
            policy,
            voting_mode: VotingMode::Players,
            rng: ChaCha8Rng::from_entropy(),
            current_statement_round: 0,
            current_voting_round: 0,
            history: StatementHistory::new(),
            statements: Vec::new(),
            metric_eliminations: Vec::new(),
            voting_rounds: Vec::new(),
            game_over: false,
            winner_role: None,
            termination: TerminationReason::Decisive,
        }
    }

    /// Fix the session RNG for reproducible shuffles and tie-breaks.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = ChaCha8Rng::seed_from_u64(seed);
        self
    }

    pub fn with_voting_mode(mut self, mode: VotingMode) -> Self {
        self.voting_mode = mode;
        self
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Drive the session to its terminal state and produce the
    /// finalized record. Consumes the session: a record is finalized
    /// exactly once and never mutated afterward.
    pub async fn run(mut self) -> Result<GameRecord, SessionError> {
        self.config.validate().map_err(SessionError::InvalidConfig)?;
        assign_roles(
            &mut self.participants,
            &self.pair,
            self.config.majority_count,
            self.config.minority_count,
            &mut self.rng,
        )?;
        info!(
            session = %self.session_id,
            pair = %self.pair,
            participants = self.participants.len(),
            "session started"
        );

        while !self.game_over {
            for _ in 0..self.config.statements_per_voting {
                self.current_statement_round += 1;
                if self.current_statement_round > self.config.max_statement_rounds {
                    self.current_statement_round = self.config.max_statement_rounds;
                    self.game_over = true;
                    break;
                }
                if !self.conduct_statement_round().await? {
                    // A win fired mid-pass; the session is terminal.
                    break;
                }
            }

            if !self.game_over {
                self.conduct_voting_round().await?;
                if let Some(winner) = check_win(&self.participants) {
                    self.finish(winner, TerminationReason::Decisive);
                    break;
                }
            }

            if !self.game_over
                && self.current_statement_round >= self.config.max_statement_rounds
            {
                self.game_over = true;
            }
        }

        if self.winner_role.is_none() {
            // Round cap exhausted without a decisive outcome: the
            // minority was never unmasked, so the majority takes the
            // recorded fallback win.
            self.finish(Role::Majority, TerminationReason::RoundLimit);
        }

        Ok(self.finalize())
    }

    /// Mark a participant eliminated and update the shared bookkeeping.
    /// Returns the eliminated role, or `None` when the seat was
    /// unassigned or already out.
    pub(crate) fn eliminate_participant(
        &mut self,
        idx: usize,
        cause: EliminationCause,
        reason: &str,
    ) -> Option<Role> {
        let role = self.participants[idx].role?;
        let pid = self.participants[idx].id;
        if !self.participants[idx].eliminate(self.current_statement_round, cause) {
            return None;
        }
        if cause == EliminationCause::Metric {
            self.history.push_elimination(pid, reason);
            self.metric_eliminations.push(MetricElimination {
                participant: pid,
                role,
                statement_round: self.current_statement_round,
                reason: reason.to_string(),
            });
        }
        info!(participant = pid, role = %role, cause = ?cause, "participant eliminated");
        Some(role)
    }

    /// Enter the terminal state: fix the winner role and flag every
    /// participant holding it, eliminated or not.
    pub(crate) fn finish(&mut self, winner: Role, termination: TerminationReason) {
        self.game_over = true;
        self.winner_role = Some(winner);
        self.termination = termination;
        for p in &mut self.participants {
            if p.role == Some(winner) {
                p.winner = true;
            }
        }
        info!(session = %self.session_id, winner = %winner, ?termination, "session terminal");
    }

    fn finalize(self) -> GameRecord {
        let correct = self.voting_rounds.iter().filter(|v| v.correct).count() as u32;
        let incorrect = self.voting_rounds.len() as u32 - correct;
        let total_statements = self.statements.len() as u32;
        let winner_role = self.winner_role.unwrap_or(Role::Majority);
        let winner_ids = self
            .participants
            .iter()
            .filter(|p| p.winner)
            .map(|p| p.id)
            .collect();

        GameRecord {
            session_id: self.session_id,
            timestamp: self.started_at,
            concept_pair: self.pair,
            evaluators: self.policy.evaluator_ids(),
            participants: self.participants,
            statements: self.statements,
            metric_eliminations: self.metric_eliminations,
            voting_rounds: self.voting_rounds,
            summary: GameSummary {
                winner_role,
                termination: self.termination,
                total_statement_rounds: self.current_statement_round,
                total_voting_rounds: self.current_voting_round,
                total_statements,
                winner_ids,
                correct_identifications: correct,
                incorrect_identifications: incorrect,
                decision_quality: decision_quality(correct, incorrect),
            },
        }
    }

    /// Ids of participants still in play, ascending.
    pub(crate) fn active_ids(&self) -> Vec<ParticipantId> {
        self.participants
            .iter()
            .filter(|p| p.is_active())
            .map(|p| p.id)
            .collect()
    }

    /// The participant's own concept and the opposing one, by role.
    pub(crate) fn concepts_for(&self, idx: usize) -> Option<(String, String)> {
        match self.participants[idx].role? {
            Role::Majority => Some((self.pair.majority.clone(), self.pair.minority.clone())),
            Role::Minority => Some((self.pair.minority.clone(), self.pair.majority.clone())),
        }
    }
}
