//! Role assignment.

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::debug;

use crate::participant::{Participant, Role};
use crate::record::ConceptPair;
use crate::session::SessionError;

/// Partition the roster into a majority group and a minority group via
/// a uniformly random shuffle. Participants beyond the two counts stay
/// unassigned and spectate.
///
/// Fails with `InsufficientParticipants` when the roster is too small,
/// and with `RolesAlreadyAssigned` on re-invocation — assignment
/// mutates each participant exactly once per session.
pub fn assign_roles<R: Rng>(
    participants: &mut [Participant],
    pair: &ConceptPair,
    majority_count: usize,
    minority_count: usize,
    rng: &mut R,
) -> Result<(), SessionError> {
    let required = majority_count + minority_count;
    if participants.len() < required {
        return Err(SessionError::InsufficientParticipants {
            required,
            available: participants.len(),
        });
    }
    if participants.iter().any(|p| p.role.is_some()) {
        return Err(SessionError::RolesAlreadyAssigned);
    }

    let mut indices: Vec<usize> = (0..participants.len()).collect();
    indices.shuffle(rng);

    for &idx in &indices[..majority_count] {
        participants[idx].assign(Role::Majority, &pair.majority);
    }
    for &idx in &indices[majority_count..required] {
        participants[idx].assign(Role::Minority, &pair.minority);
    }

    debug!(
        majority = majority_count,
        minority = minority_count,
        spectators = participants.len() - required,
        "roles assigned"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn roster(n: usize) -> Vec<Participant> {
        (1..=n as u32).map(Participant::new).collect()
    }

    #[test]
    fn counts_match_configuration() {
        let pair = ConceptPair::new("apple", "pear");
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut participants = roster(6);
            assign_roles(&mut participants, &pair, 4, 2, &mut rng).unwrap();

            let majority = participants
                .iter()
                .filter(|p| p.role == Some(Role::Majority))
                .count();
            let minority = participants
                .iter()
                .filter(|p| p.role == Some(Role::Minority))
                .count();
            assert_eq!(majority, 4);
            assert_eq!(minority, 2);
        }
    }

    #[test]
    fn no_participant_holds_two_roles() {
        // Each participant is assigned through a disjoint index range,
        // so a double assignment would surface as a wrong concept.
        let pair = ConceptPair::new("apple", "pear");
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut participants = roster(5);
        assign_roles(&mut participants, &pair, 3, 2, &mut rng).unwrap();

        for p in &participants {
            match p.role {
                Some(Role::Majority) => assert_eq!(p.concept.as_deref(), Some("apple")),
                Some(Role::Minority) => assert_eq!(p.concept.as_deref(), Some("pear")),
                None => panic!("all five seats should be assigned"),
            }
        }
    }

    #[test]
    fn extra_participants_spectate() {
        let pair = ConceptPair::new("apple", "pear");
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut participants = roster(6);
        assign_roles(&mut participants, &pair, 3, 1, &mut rng).unwrap();

        let unassigned = participants.iter().filter(|p| p.role.is_none()).count();
        assert_eq!(unassigned, 2);
    }

    #[test]
    fn too_few_participants_fail() {
        let pair = ConceptPair::new("apple", "pear");
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut participants = roster(3);
        let err = assign_roles(&mut participants, &pair, 3, 1, &mut rng).unwrap_err();
        assert!(matches!(
            err,
            SessionError::InsufficientParticipants {
                required: 4,
                available: 3
            }
        ));
    }

    #[test]
    fn second_invocation_fails() {
        let pair = ConceptPair::new("apple", "pear");
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut participants = roster(4);
        assign_roles(&mut participants, &pair, 3, 1, &mut rng).unwrap();
        let err = assign_roles(&mut participants, &pair, 3, 1, &mut rng).unwrap_err();
        assert!(matches!(err, SessionError::RolesAlreadyAssigned));
    }
}
