//! Engine for concept-guessing social deduction sessions.
//!
//! A session seats a majority group sharing one concept against a
//! minority holding a related but different one. Participants take
//! turns issuing statements about their own concept; evaluators can
//! eliminate a speaker mid-round, voting rounds eliminate one
//! participant at phase boundaries, and win checks run after every
//! elimination. The batch layer fans sessions out over a bounded
//! worker pool with retries and interrupt-safe aggregation.
//!
//! All text generation and judging live behind the traits in
//! [`collaborator`]; the engine itself performs no I/O.

pub mod batch;
pub mod collaborator;
pub mod config;
pub mod history;
pub mod participant;
pub mod policy;
pub mod record;
pub mod repair;
pub mod retry;
pub mod roles;
pub mod scripted;
pub mod session;
pub mod win;

pub use batch::{BatchError, BatchOrchestrator, BatchTask, RunSummary, SessionProvider};
pub use collaborator::{
    BinaryEvaluator, EvalDimension, PlayerAgent, ScoreCard, ScoreEvaluator, StatementGenerator,
    VoteDecider,
};
pub use config::{BatchConfig, SessionConfig};
pub use history::StatementHistory;
pub use participant::{EliminationCause, Participant, ParticipantId, Role, AUDIENCE_ID};
pub use policy::{EliminationPolicy, Verdict, DEFAULT_SCORE_THRESHOLD};
pub use record::{ConceptPair, GameRecord, GameSummary, TerminationReason};
pub use session::{GameSession, SessionError, VotingMode};
pub use win::check_win;
