//! LLM-backed player agent.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use undercover_core::collaborator::GenerationError;
use undercover_core::repair::extract_structured;
use undercover_core::{ParticipantId, StatementGenerator, StatementHistory, VoteDecider};

use crate::client::ChatClient;
use crate::prompts;

#[derive(Debug, Deserialize)]
struct SpeakReply {
    #[serde(default)]
    identity: String,
    #[serde(default)]
    #[allow(dead_code)]
    strategy: String,
    statement: String,
}

#[derive(Debug, Deserialize)]
struct VoteReply {
    #[serde(default)]
    identity: String,
    /// Models answer with a bare number, a quoted number, or a
    /// `Player_N` label; normalized after parsing.
    vote: serde_json::Value,
}

/// One seat's player. Carries the model's identity analysis from turn
/// to turn, the way a human keeps their read on the table; build a
/// fresh instance per seat per session.
pub struct LlmPlayer {
    client: Arc<ChatClient>,
    last_analysis: Mutex<String>,
}

impl LlmPlayer {
    pub fn new(client: Arc<ChatClient>) -> Self {
        Self {
            client,
            last_analysis: Mutex::new(String::new()),
        }
    }

    fn analysis(&self) -> String {
        self.last_analysis
            .lock()
            .map(|a| a.clone())
            .unwrap_or_default()
    }

    fn remember_analysis(&self, identity: &str) {
        if identity.is_empty() {
            return;
        }
        if let Ok(mut analysis) = self.last_analysis.lock() {
            *analysis = identity.to_string();
        }
    }
}

fn normalize_vote(value: &serde_json::Value) -> Result<ParticipantId, GenerationError> {
    if let Some(n) = value.as_u64() {
        return u32::try_from(n)
            .map_err(|_| GenerationError::Failed(format!("vote out of range: {n}")));
    }
    if let Some(s) = value.as_str() {
        let stripped = s
            .trim()
            .trim_start_matches("Player_")
            .trim_start_matches("player_");
        if let Ok(id) = stripped.parse::<ParticipantId>() {
            return Ok(id);
        }
    }
    Err(GenerationError::Failed(format!(
        "unparseable vote: {value}"
    )))
}

#[async_trait]
impl StatementGenerator for LlmPlayer {
    async fn generate(
        &self,
        participant: ParticipantId,
        own_concept: &str,
        history: &StatementHistory,
    ) -> Result<String, GenerationError> {
        let user = prompts::player_speak_user(
            participant,
            own_concept,
            &history.transcript(),
            &self.analysis(),
        );
        let raw = self
            .client
            .chat(prompts::player_speak_system(), &user)
            .await
            .map_err(|e| GenerationError::Failed(e.to_string()))?;

        let reply: SpeakReply = extract_structured(&raw)?;
        self.remember_analysis(&reply.identity);
        debug!(participant, "statement generated");
        Ok(reply.statement)
    }
}

#[async_trait]
impl VoteDecider for LlmPlayer {
    async fn vote(
        &self,
        participant: ParticipantId,
        own_concept: &str,
        history: &StatementHistory,
        active: &[ParticipantId],
    ) -> Result<ParticipantId, GenerationError> {
        let user = prompts::player_vote_user(
            participant,
            own_concept,
            &history.transcript(),
            &self.analysis(),
            active,
        );
        let raw = self
            .client
            .chat(prompts::player_vote_system(), &user)
            .await
            .map_err(|e| GenerationError::Failed(e.to_string()))?;

        let reply: VoteReply = extract_structured(&raw)?;
        self.remember_analysis(&reply.identity);
        let target = normalize_vote(&reply.vote)?;
        debug!(participant, target, "vote decided");
        Ok(target)
    }
}
