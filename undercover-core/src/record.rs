//! The append-only session record.
//!
//! Everything downstream analytics consume: roster, ordered statement
//! log with per-statement evaluation results, ordered voting rounds
//! with ballots and tallies, and the final summary. A `GameRecord` is
//! assembled incrementally by the session and finalized exactly once;
//! it is never mutated afterward.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::collaborator::ScoreCard;
use crate::participant::{Participant, ParticipantId, Role};

/// Two related but distinct concepts. Immutable once a session starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptPair {
    /// Shared by the majority group.
    pub majority: String,
    /// Held by the minority group.
    pub minority: String,
}

impl ConceptPair {
    pub fn new(majority: impl Into<String>, minority: impl Into<String>) -> Self {
        Self {
            majority: majority.into(),
            minority: minority.into(),
        }
    }
}

impl std::fmt::Display for ConceptPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} vs {}", self.majority, self.minority)
    }
}

/// One evaluator's scores for one statement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeScores {
    pub judge_id: String,
    pub scores: ScoreCard,
}

/// Evaluation result attached to a statement — either continuous
/// scores aggregated across evaluators, or per-dimension binary
/// verdicts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Evaluation {
    Scores {
        judges: Vec<JudgeScores>,
        novelty_mean: f64,
        relevance_mean: f64,
        reasonableness_mean: f64,
        novelty_variance: f64,
        reasonableness_variance: f64,
    },
    Binary {
        reasonableness_judge: String,
        novelty_judge: String,
        reasonableness_eliminate: bool,
        novelty_eliminate: bool,
    },
}

/// One statement in the session log. Sequence ids are strictly
/// increasing from 1 and unique within the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementRecord {
    pub statement_id: u32,
    pub participant: ParticipantId,
    pub content: String,
    pub statement_round: u32,
    pub evaluation: Evaluation,
}

/// An elimination triggered by an evaluator verdict mid-round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricElimination {
    pub participant: ParticipantId,
    pub role: Role,
    pub statement_round: u32,
    pub reason: String,
}

/// voter → target. The audience elector votes as id 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub voter: ParticipantId,
    pub target: ParticipantId,
}

/// One synchronous ballot eliminating exactly one participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotingRound {
    pub voting_round_id: u32,
    pub after_statement_round: u32,
    pub ballots: Vec<Ballot>,
    /// Tally over active candidates only.
    pub tally: BTreeMap<ParticipantId, u32>,
    pub eliminated: ParticipantId,
    pub eliminated_role: Role,
    /// True when the vote removed a minority participant.
    pub correct: bool,
}

/// How the session reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// A win condition fired.
    Decisive,
    /// The statement-round cap was exhausted; resolves as a majority
    /// win since the minority was never unmasked.
    RoundLimit,
}

/// Final summary block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSummary {
    pub winner_role: Role,
    pub termination: TerminationReason,
    pub total_statement_rounds: u32,
    pub total_voting_rounds: u32,
    pub total_statements: u32,
    pub winner_ids: Vec<ParticipantId>,
    pub correct_identifications: u32,
    pub incorrect_identifications: u32,
    /// correct / (correct + incorrect), or 0 when no vote resolved.
    pub decision_quality: f64,
}

/// The full, finalized projection of one session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameRecord {
    pub session_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub concept_pair: ConceptPair,
    /// Identifiers of the evaluators that judged statements.
    pub evaluators: Vec<String>,
    pub participants: Vec<Participant>,
    pub statements: Vec<StatementRecord>,
    pub metric_eliminations: Vec<MetricElimination>,
    pub voting_rounds: Vec<VotingRound>,
    pub summary: GameSummary,
}

impl GameRecord {
    /// Winner-side participants still alive at termination.
    pub fn surviving_winners(&self) -> impl Iterator<Item = &Participant> {
        self.participants.iter().filter(|p| p.winner && !p.eliminated)
    }
}

pub(crate) fn decision_quality(correct: u32, incorrect: u32) -> f64 {
    let total = correct + incorrect;
    if total == 0 {
        0.0
    } else {
        f64::from(correct) / f64::from(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_quality_handles_zero_votes() {
        assert_eq!(decision_quality(0, 0), 0.0);
        assert_eq!(decision_quality(2, 0), 1.0);
        assert!((decision_quality(1, 2) - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn evaluation_serde_is_tagged() {
        let eval = Evaluation::Binary {
            reasonableness_judge: "judge-r".to_string(),
            novelty_judge: "judge-n".to_string(),
            reasonableness_eliminate: false,
            novelty_eliminate: true,
        };
        let json = serde_json::to_string(&eval).unwrap();
        assert!(json.contains("\"kind\":\"binary\""));
        let back: Evaluation = serde_json::from_str(&json).unwrap();
        assert_eq!(back, eval);
    }

    #[test]
    fn concept_pair_display() {
        let pair = ConceptPair::new("apple", "pear");
        assert_eq!(pair.to_string(), "apple vs pear");
    }
}
