//! Shared statement history.
//!
//! The transcript every collaborator sees: round markers, statements
//! attributed by participant id, and elimination notes. It never
//! contains roles or concepts, so handing it to a player leaks nothing
//! about the opposing side.

use crate::participant::ParticipantId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEvent {
    RoundStart { round: u32 },
    Statement { participant: ParticipantId, content: String },
    Elimination { participant: ParticipantId, reason: String },
}

/// Append-only event log, rendered to text for prompt construction.
#[derive(Debug, Clone, Default)]
pub struct StatementHistory {
    events: Vec<HistoryEvent>,
}

impl StatementHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_round(&mut self, round: u32) {
        self.events.push(HistoryEvent::RoundStart { round });
    }

    pub fn push_statement(&mut self, participant: ParticipantId, content: &str) {
        self.events.push(HistoryEvent::Statement {
            participant,
            content: content.to_string(),
        });
    }

    pub fn push_elimination(&mut self, participant: ParticipantId, reason: &str) {
        self.events.push(HistoryEvent::Elimination {
            participant,
            reason: reason.to_string(),
        });
    }

    pub fn events(&self) -> &[HistoryEvent] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// All statement texts so far, in order. Novelty judges compare a
    /// new statement against these.
    pub fn prior_statements(&self) -> impl Iterator<Item = &str> {
        self.events.iter().filter_map(|e| match e {
            HistoryEvent::Statement { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }

    /// Render the transcript the way collaborators consume it.
    pub fn transcript(&self) -> String {
        let mut out = String::new();
        for event in &self.events {
            match event {
                HistoryEvent::RoundStart { round } => {
                    out.push_str(&format!("\n\nRound {round}:\n\n"));
                }
                HistoryEvent::Statement { participant, content } => {
                    out.push_str(&format!("Player_{participant}: {content}\n"));
                }
                HistoryEvent::Elimination { participant, reason } => {
                    out.push_str(&format!("Player_{participant} was eliminated due to: {reason}\n"));
                }
            }
        }
        out
    }
}
