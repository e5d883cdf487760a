//! Win-condition predicates.
//!
//! Evaluated after every individual elimination — metric- or
//! vote-caused — not only at phase boundaries, because a metric
//! elimination can end the game mid-pass.

use crate::participant::{Participant, Role};

/// Pure check over the current roster. Returns the winning role, or
/// `None` while the game continues.
///
/// The minority wins once its surviving count reaches the surviving
/// majority count; the majority wins once no minority participant
/// survives. The two predicates cannot hold simultaneously: the
/// majority check runs first and covers the degenerate all-minority-
/// removed case.
pub fn check_win(participants: &[Participant]) -> Option<Role> {
    let majority_alive = count_active(participants, Role::Majority);
    let minority_alive = count_active(participants, Role::Minority);

    if minority_alive == 0 {
        Some(Role::Majority)
    } else if minority_alive >= majority_alive {
        Some(Role::Minority)
    } else {
        None
    }
}

fn count_active(participants: &[Participant], role: Role) -> usize {
    participants
        .iter()
        .filter(|p| p.is_active() && p.role == Some(role))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::participant::EliminationCause;

    fn roster(majority: usize, minority: usize) -> Vec<Participant> {
        let mut out = Vec::new();
        for i in 0..majority + minority {
            let mut p = Participant::new(i as u32 + 1);
            if i < majority {
                p.assign(Role::Majority, "apple");
            } else {
                p.assign(Role::Minority, "pear");
            }
            out.push(p);
        }
        out
    }

    #[test]
    fn game_continues_while_minority_is_outnumbered() {
        let participants = roster(4, 1);
        assert_eq!(check_win(&participants), None);
    }

    #[test]
    fn majority_wins_when_minority_is_gone() {
        let mut participants = roster(3, 1);
        participants[3].eliminate(1, EliminationCause::Vote);
        assert_eq!(check_win(&participants), Some(Role::Majority));
    }

    #[test]
    fn minority_wins_on_parity() {
        let mut participants = roster(3, 2);
        participants[0].eliminate(1, EliminationCause::Vote);
        // 2 majority vs 2 minority.
        assert_eq!(check_win(&participants), Some(Role::Minority));
    }

    #[test]
    fn spectators_do_not_count() {
        let mut participants = roster(2, 1);
        participants.push(Participant::new(9)); // unassigned seat
        assert_eq!(check_win(&participants), None);
    }

    #[test]
    fn check_is_idempotent() {
        let mut participants = roster(4, 2);
        participants[5].eliminate(1, EliminationCause::Vote);
        let first = check_win(&participants);
        let second = check_win(&participants);
        assert_eq!(first, second);
        assert_eq!(first, None); // 4 vs 1 continues
    }
}
