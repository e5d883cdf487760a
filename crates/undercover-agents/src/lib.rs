//! LLM-backed collaborators for the deduction-game engine, plus the
//! persistence layer the batch CLI writes through.

pub mod client;
pub mod judge;
pub mod player;
pub mod prompts;
pub mod store;

pub use client::{ChatClient, ClientError};
pub use judge::{LlmBinaryJudge, LlmScoreJudge};
pub use player::LlmPlayer;
pub use store::{RunStore, StoreError};
