//! Participant roster types.
//!
//! A participant is one seat at the table: an integer id unique within
//! the session, an assigned role and secret concept, and elimination
//! bookkeeping. Roster mutation is confined to role assignment (once)
//! and the session's elimination path.

use serde::{Deserialize, Serialize};

/// Participant id, unique within a session. Ids are assigned 1..=N;
/// id 0 is reserved for the audience elector in audience voting mode.
pub type ParticipantId = u32;

/// Reserved elector id used when an audience decides eliminations.
pub const AUDIENCE_ID: ParticipantId = 0;

/// Which side of the concept pair a participant plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The larger group sharing the common concept.
    Majority,
    /// The smaller group holding the related but different concept.
    Minority,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Majority => write!(f, "majority"),
            Self::Minority => write!(f, "minority"),
        }
    }
}

/// What removed a participant from play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EliminationCause {
    /// Eliminated by an evaluator verdict during a statement round.
    Metric,
    /// Eliminated by ballot at a round boundary.
    Vote,
}

/// When and why a participant was eliminated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EliminationRecord {
    /// Statement round during which the elimination happened.
    pub round: u32,
    pub cause: EliminationCause,
}

/// One seat in the session roster.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    /// Assigned role; `None` for spectators not covered by the counts.
    pub role: Option<Role>,
    /// The secret concept this participant must describe.
    pub concept: Option<String>,
    pub eliminated: bool,
    pub elimination: Option<EliminationRecord>,
    /// Set only at termination, for every participant holding the
    /// winning role (eliminated or not).
    pub winner: bool,
}

impl Participant {
    pub fn new(id: ParticipantId) -> Self {
        Self {
            id,
            role: None,
            concept: None,
            eliminated: false,
            elimination: None,
            winner: false,
        }
    }

    /// Active means role-assigned and not yet eliminated.
    pub fn is_active(&self) -> bool {
        self.role.is_some() && !self.eliminated
    }

    pub(crate) fn assign(&mut self, role: Role, concept: &str) {
        self.role = Some(role);
        self.concept = Some(concept.to_string());
    }

    /// Mark eliminated. Returns false if the participant was already
    /// out (the alive→eliminated transition happens at most once).
    pub(crate) fn eliminate(&mut self, round: u32, cause: EliminationCause) -> bool {
        if self.eliminated {
            return false;
        }
        self.eliminated = true;
        self.elimination = Some(EliminationRecord { round, cause });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_participant_is_inactive_until_assigned() {
        let mut p = Participant::new(1);
        assert!(!p.is_active());
        p.assign(Role::Majority, "apple");
        assert!(p.is_active());
        assert_eq!(p.concept.as_deref(), Some("apple"));
    }

    #[test]
    fn eliminate_transitions_at_most_once() {
        let mut p = Participant::new(2);
        p.assign(Role::Minority, "pear");
        assert!(p.eliminate(3, EliminationCause::Vote));
        assert!(!p.eliminate(4, EliminationCause::Metric));
        let rec = p.elimination.unwrap();
        assert_eq!(rec.round, 3);
        assert_eq!(rec.cause, EliminationCause::Vote);
        assert!(!p.is_active());
    }

    #[test]
    fn role_serde_uses_snake_case() {
        let json = serde_json::to_string(&Role::Minority).unwrap();
        assert_eq!(json, "\"minority\"");
    }
}
