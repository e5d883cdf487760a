//! LLM-backed statement evaluators.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use undercover_core::collaborator::EvaluationError;
use undercover_core::repair::extract_structured;
use undercover_core::{
    BinaryEvaluator, EvalDimension, ScoreCard, ScoreEvaluator, StatementHistory,
};

use crate::client::ChatClient;
use crate::prompts;

#[derive(Debug, Deserialize)]
struct DimensionScore {
    score: f64,
    #[serde(default)]
    #[allow(dead_code)]
    explanation: String,
}

#[derive(Debug, Deserialize)]
struct ScoreReply {
    novelty: DimensionScore,
    relevance: DimensionScore,
    reasonableness: DimensionScore,
}

#[derive(Debug, Deserialize)]
struct BinaryReply {
    verdict: u8,
    #[serde(default)]
    #[allow(dead_code)]
    explanation: String,
}

/// Continuous three-dimension judge. Stateless; one instance serves
/// every statement in a batch.
pub struct LlmScoreJudge {
    id: String,
    client: Arc<ChatClient>,
}

impl LlmScoreJudge {
    pub fn new(client: Arc<ChatClient>) -> Self {
        Self {
            id: client.model().to_string(),
            client,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }
}

#[async_trait]
impl ScoreEvaluator for LlmScoreJudge {
    fn id(&self) -> &str {
        &self.id
    }

    async fn evaluate(
        &self,
        statement: &str,
        own_concept: &str,
        other_concept: &str,
        history: &StatementHistory,
    ) -> Result<ScoreCard, EvaluationError> {
        let user = prompts::judge_user(own_concept, other_concept, statement, &history.transcript());
        let raw = self
            .client
            .chat(prompts::judge_system(), &user)
            .await
            .map_err(|e| EvaluationError::Failed(e.to_string()))?;

        let reply: ScoreReply = extract_structured(&raw)?;
        let card = ScoreCard {
            novelty: reply.novelty.score,
            relevance: reply.relevance.score,
            reasonableness: reply.reasonableness.score,
        }
        .quantized();
        debug!(judge = %self.id, ?card, "statement scored");
        Ok(card)
    }
}

/// Single-dimension 0/1 judge; verdict 1 eliminates.
pub struct LlmBinaryJudge {
    id: String,
    dimension: EvalDimension,
    client: Arc<ChatClient>,
}

impl LlmBinaryJudge {
    pub fn new(client: Arc<ChatClient>, dimension: EvalDimension) -> Self {
        Self {
            id: format!("{}-{dimension}", client.model()),
            dimension,
            client,
        }
    }
}

#[async_trait]
impl BinaryEvaluator for LlmBinaryJudge {
    fn id(&self) -> &str {
        &self.id
    }

    fn dimension(&self) -> EvalDimension {
        self.dimension
    }

    async fn decide(
        &self,
        statement: &str,
        own_concept: &str,
        other_concept: &str,
        history: &StatementHistory,
    ) -> Result<bool, EvaluationError> {
        let user = prompts::judge_user(own_concept, other_concept, statement, &history.transcript());
        let raw = self
            .client
            .chat(&prompts::binary_judge_system(self.dimension), &user)
            .await
            .map_err(|e| EvaluationError::Failed(e.to_string()))?;

        let reply: BinaryReply = extract_structured(&raw)?;
        debug!(judge = %self.id, verdict = reply.verdict, "binary verdict");
        Ok(reply.verdict == 1)
    }
}
