//! Deterministic collaborators.
//!
//! Scripted stand-ins for the networked agents: fixed statement
//! queues, keyword-triggered evaluators, and an always-failing player
//! for exercising retry paths. No randomness, no I/O.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::collaborator::{
    BinaryEvaluator, EvalDimension, EvaluationError, GenerationError, ScoreCard, ScoreEvaluator,
    StatementGenerator, VoteDecider,
};
use crate::history::StatementHistory;
use crate::participant::ParticipantId;

/// How a scripted player picks its vote target.
#[derive(Debug, Clone, Copy)]
pub enum VoteStrategy {
    /// First active participant other than the voter, ascending by id.
    FirstOtherActive,
    /// A fixed target, falling back to `FirstOtherActive` once the
    /// target is out of play.
    Fixed(ParticipantId),
}

/// Plays from a queue of prepared statements, then repeats a fallback.
pub struct ScriptedPlayer {
    statements: Mutex<VecDeque<String>>,
    fallback: String,
    strategy: VoteStrategy,
}

impl ScriptedPlayer {
    pub fn new<I, S>(statements: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            statements: Mutex::new(statements.into_iter().map(Into::into).collect()),
            fallback: "it reminds me of something familiar".to_string(),
            strategy: VoteStrategy::FirstOtherActive,
        }
    }

    pub fn with_fallback(mut self, fallback: impl Into<String>) -> Self {
        self.fallback = fallback.into();
        self
    }

    pub fn with_vote_strategy(mut self, strategy: VoteStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

fn first_other_active(
    participant: ParticipantId,
    active: &[ParticipantId],
) -> Result<ParticipantId, GenerationError> {
    active
        .iter()
        .copied()
        .find(|&id| id != participant)
        .ok_or_else(|| GenerationError::Failed("no other active participant".to_string()))
}

#[async_trait]
impl StatementGenerator for ScriptedPlayer {
    async fn generate(
        &self,
        _participant: ParticipantId,
        _own_concept: &str,
        _history: &StatementHistory,
    ) -> Result<String, GenerationError> {
        let mut queue = self
            .statements
            .lock()
            .map_err(|_| GenerationError::Failed("statement queue poisoned".to_string()))?;
        Ok(queue.pop_front().unwrap_or_else(|| self.fallback.clone()))
    }
}

#[async_trait]
impl VoteDecider for ScriptedPlayer {
    async fn vote(
        &self,
        participant: ParticipantId,
        _own_concept: &str,
        _history: &StatementHistory,
        active: &[ParticipantId],
    ) -> Result<ParticipantId, GenerationError> {
        match self.strategy {
            VoteStrategy::Fixed(target) if active.contains(&target) && target != participant => {
                Ok(target)
            }
            _ => first_other_active(participant, active),
        }
    }
}

/// Returns the same score card for every statement.
pub struct FixedScoreEvaluator {
    id: String,
    card: ScoreCard,
}

impl FixedScoreEvaluator {
    pub fn new(id: impl Into<String>, card: ScoreCard) -> Self {
        Self { id: id.into(), card }
    }
}

#[async_trait]
impl ScoreEvaluator for FixedScoreEvaluator {
    fn id(&self) -> &str {
        &self.id
    }

    async fn evaluate(
        &self,
        _statement: &str,
        _own_concept: &str,
        _other_concept: &str,
        _history: &StatementHistory,
    ) -> Result<ScoreCard, EvaluationError> {
        Ok(self.card)
    }
}

/// Scores low when the statement contains a trigger phrase, normally
/// otherwise.
pub struct KeywordScoreEvaluator {
    id: String,
    trigger: String,
    low: ScoreCard,
    normal: ScoreCard,
}

impl KeywordScoreEvaluator {
    pub fn new(
        id: impl Into<String>,
        trigger: impl Into<String>,
        low: ScoreCard,
        normal: ScoreCard,
    ) -> Self {
        Self {
            id: id.into(),
            trigger: trigger.into(),
            low,
            normal,
        }
    }
}

#[async_trait]
impl ScoreEvaluator for KeywordScoreEvaluator {
    fn id(&self) -> &str {
        &self.id
    }

    async fn evaluate(
        &self,
        statement: &str,
        _own_concept: &str,
        _other_concept: &str,
        _history: &StatementHistory,
    ) -> Result<ScoreCard, EvaluationError> {
        if statement.contains(&self.trigger) {
            Ok(self.low)
        } else {
            Ok(self.normal)
        }
    }
}

/// Binary judge that eliminates on a trigger phrase.
pub struct KeywordBinaryEvaluator {
    id: String,
    dimension: EvalDimension,
    trigger: String,
}

impl KeywordBinaryEvaluator {
    pub fn new(
        id: impl Into<String>,
        dimension: EvalDimension,
        trigger: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            dimension,
            trigger: trigger.into(),
        }
    }
}

#[async_trait]
impl BinaryEvaluator for KeywordBinaryEvaluator {
    fn id(&self) -> &str {
        &self.id
    }

    fn dimension(&self) -> EvalDimension {
        self.dimension
    }

    async fn decide(
        &self,
        statement: &str,
        _own_concept: &str,
        _other_concept: &str,
        _history: &StatementHistory,
    ) -> Result<bool, EvaluationError> {
        Ok(statement.contains(&self.trigger))
    }
}

/// Fails every call. Exercises the retry and failure-accounting paths.
pub struct FailingPlayer {
    message: String,
}

impl FailingPlayer {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl StatementGenerator for FailingPlayer {
    async fn generate(
        &self,
        _participant: ParticipantId,
        _own_concept: &str,
        _history: &StatementHistory,
    ) -> Result<String, GenerationError> {
        Err(GenerationError::Failed(self.message.clone()))
    }
}

#[async_trait]
impl VoteDecider for FailingPlayer {
    async fn vote(
        &self,
        _participant: ParticipantId,
        _own_concept: &str,
        _history: &StatementHistory,
        _active: &[ParticipantId],
    ) -> Result<ParticipantId, GenerationError> {
        Err(GenerationError::Failed(self.message.clone()))
    }
}
