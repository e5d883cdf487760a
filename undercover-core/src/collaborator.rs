//! Collaborator capability interfaces.
//!
//! The engine never generates text or judges quality itself; those
//! capabilities plug in behind these traits, selected at session
//! construction. A participant capability is split into statement
//! generation and vote deciding so a variant can supply one without
//! the other (an audience elector votes but never speaks).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::history::StatementHistory;
use crate::participant::ParticipantId;
use crate::repair::ParseError;

/// Failure from a statement-generation or vote collaborator, after its
/// own internal retries.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("generation failed: {0}")]
    Failed(String),

    /// Structured-response repair gave up; retryable.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Failure from an evaluator collaborator.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("evaluation failed: {0}")]
    Failed(String),

    /// Structured-response repair gave up; retryable.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Continuous scores on a 0–1 scale, quantized by the evaluator to
/// {0, 0.2, 0.4, 0.6, 0.8, 1.0}.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    pub novelty: f64,
    pub relevance: f64,
    pub reasonableness: f64,
}

impl ScoreCard {
    /// Snap each score to the nearest 0.2 step inside [0, 1].
    pub fn quantized(self) -> Self {
        let snap = |v: f64| (v.clamp(0.0, 1.0) * 5.0).round() / 5.0;
        Self {
            novelty: snap(self.novelty),
            relevance: snap(self.relevance),
            reasonableness: snap(self.reasonableness),
        }
    }
}

/// Which quality dimension a binary judge rules on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvalDimension {
    Reasonableness,
    Novelty,
}

impl std::fmt::Display for EvalDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reasonableness => write!(f, "reasonableness"),
            Self::Novelty => write!(f, "novelty"),
        }
    }
}

/// Produces one statement describing the participant's own concept.
///
/// Receives only the participant's private concept and the shared
/// history — never the opposing concept or anyone's role.
#[async_trait]
pub trait StatementGenerator: Send + Sync {
    async fn generate(
        &self,
        participant: ParticipantId,
        own_concept: &str,
        history: &StatementHistory,
    ) -> Result<String, GenerationError>;
}

/// Picks which active participant to vote out.
#[async_trait]
pub trait VoteDecider: Send + Sync {
    async fn vote(
        &self,
        participant: ParticipantId,
        own_concept: &str,
        history: &StatementHistory,
        active: &[ParticipantId],
    ) -> Result<ParticipantId, GenerationError>;
}

/// Full player capability: speaks and votes.
pub trait PlayerAgent: StatementGenerator + VoteDecider {}

impl<T: StatementGenerator + VoteDecider + ?Sized> PlayerAgent for T {}

/// Scores a statement on the three continuous dimensions.
///
/// Unlike generators, evaluators see both concepts of the pair for
/// relevance framing.
#[async_trait]
pub trait ScoreEvaluator: Send + Sync {
    fn id(&self) -> &str;

    async fn evaluate(
        &self,
        statement: &str,
        own_concept: &str,
        other_concept: &str,
        history: &StatementHistory,
    ) -> Result<ScoreCard, EvaluationError>;
}

/// Returns a 0/1 elimination verdict for a single dimension.
#[async_trait]
pub trait BinaryEvaluator: Send + Sync {
    fn id(&self) -> &str;

    fn dimension(&self) -> EvalDimension;

    /// True means the statement's author should be eliminated.
    async fn decide(
        &self,
        statement: &str,
        own_concept: &str,
        other_concept: &str,
        history: &StatementHistory,
    ) -> Result<bool, EvaluationError>;
}
