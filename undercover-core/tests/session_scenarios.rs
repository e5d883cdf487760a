//! End-to-end session runs with deterministic collaborators.

use std::sync::Arc;

use async_trait::async_trait;

use undercover_core::collaborator::GenerationError;
use undercover_core::history::{HistoryEvent, StatementHistory};
use undercover_core::scripted::{
    FailingPlayer, FixedScoreEvaluator, KeywordBinaryEvaluator, KeywordScoreEvaluator,
    ScriptedPlayer, VoteStrategy,
};
use undercover_core::{
    ConceptPair, EliminationPolicy, EvalDimension, GameSession, ParticipantId, PlayerAgent, Role,
    ScoreCard, SessionConfig, SessionError, StatementGenerator, TerminationReason, VoteDecider,
    VotingMode,
};

const NORMAL: ScoreCard = ScoreCard {
    novelty: 0.8,
    relevance: 0.8,
    reasonableness: 0.8,
};
const LOW_NOVELTY: ScoreCard = ScoreCard {
    novelty: 0.2,
    relevance: 0.8,
    reasonableness: 0.8,
};

/// Echoes its secret concept in every statement and votes for the
/// first active participant whose recorded statements do not mention
/// its own concept. With disjoint concept words this deduces the other
/// side perfectly.
struct Informed;

#[async_trait]
impl StatementGenerator for Informed {
    async fn generate(
        &self,
        participant: ParticipantId,
        own_concept: &str,
        _history: &StatementHistory,
    ) -> Result<String, GenerationError> {
        Ok(format!("Player {participant} is thinking about {own_concept}"))
    }
}

#[async_trait]
impl VoteDecider for Informed {
    async fn vote(
        &self,
        participant: ParticipantId,
        own_concept: &str,
        history: &StatementHistory,
        active: &[ParticipantId],
    ) -> Result<ParticipantId, GenerationError> {
        for event in history.events() {
            if let HistoryEvent::Statement { participant: speaker, content } = event {
                if *speaker != participant
                    && active.contains(speaker)
                    && !content.contains(own_concept)
                {
                    return Ok(*speaker);
                }
            }
        }
        active
            .iter()
            .copied()
            .find(|&id| id != participant)
            .ok_or_else(|| GenerationError::Failed("no vote target".to_string()))
    }
}

fn informed_players(n: usize) -> Vec<Arc<dyn PlayerAgent>> {
    (0..n).map(|_| Arc::new(Informed) as Arc<dyn PlayerAgent>).collect()
}

fn quick_config(majority: usize, minority: usize) -> SessionConfig {
    SessionConfig {
        majority_count: majority,
        minority_count: minority,
        statements_per_voting: 1,
        max_statement_rounds: 10,
        collaborator_attempts: 2,
        collaborator_retry_delay_ms: 0,
    }
}

#[tokio::test]
async fn metric_elimination_of_the_minority_ends_the_game_without_voting() {
    // The keyword evaluator scores any mention of the minority concept
    // low on novelty, so the minority falls on its first statement.
    let policy = EliminationPolicy::score_threshold(vec![Arc::new(KeywordScoreEvaluator::new(
        "kw-judge",
        "pear",
        LOW_NOVELTY,
        NORMAL,
    ))]);
    let session = GameSession::new(
        quick_config(3, 1),
        ConceptPair::new("apple", "pear"),
        informed_players(4),
        policy,
    )
    .with_seed(11);

    let record = session.run().await.unwrap();

    assert_eq!(record.summary.winner_role, Role::Majority);
    assert_eq!(record.summary.termination, TerminationReason::Decisive);
    assert_eq!(record.summary.total_voting_rounds, 0);
    assert!(record.voting_rounds.is_empty());

    assert_eq!(record.metric_eliminations.len(), 1);
    let elim = &record.metric_eliminations[0];
    assert_eq!(elim.role, Role::Minority);
    assert_eq!(elim.statement_round, 1);
    assert_eq!(elim.reason, "low novelty score: 0.20");

    // Every majority member wins; the eliminated minority does not.
    assert_eq!(record.summary.winner_ids.len(), 3);
    assert!(!record
        .participants
        .iter()
        .any(|p| p.role == Some(Role::Minority) && p.winner));
    // No votes resolved, so decision quality is the zero default.
    assert_eq!(record.summary.decision_quality, 0.0);
}

#[tokio::test]
async fn informed_voters_unmask_the_minority_over_two_voting_rounds() {
    let policy =
        EliminationPolicy::score_threshold(vec![Arc::new(FixedScoreEvaluator::new("ok", NORMAL))]);
    let session = GameSession::new(
        quick_config(4, 2),
        ConceptPair::new("apple", "pear"),
        informed_players(6),
        policy,
    )
    .with_seed(3);

    let record = session.run().await.unwrap();

    assert_eq!(record.summary.winner_role, Role::Majority);
    assert_eq!(record.summary.termination, TerminationReason::Decisive);
    assert_eq!(record.summary.total_voting_rounds, 2);
    assert!(record.metric_eliminations.is_empty());

    for round in &record.voting_rounds {
        assert_eq!(round.eliminated_role, Role::Minority);
        assert!(round.correct);
        assert_eq!(round.ballots.len() as u32, round.tally.values().sum::<u32>());
    }
    assert_eq!(record.summary.correct_identifications, 2);
    assert_eq!(record.summary.incorrect_identifications, 0);
    assert_eq!(record.summary.decision_quality, 1.0);
}

#[tokio::test]
async fn vote_ties_break_to_each_candidate_across_seeds() {
    // Ballots engineered to a 2-2 tie between participants 1 and 2.
    let mut seen_first = false;
    let mut seen_second = false;

    for seed in 0..32 {
        let players: Vec<Arc<dyn PlayerAgent>> = [2u32, 1, 1, 2]
            .iter()
            .map(|&target| {
                Arc::new(
                    ScriptedPlayer::new(Vec::<String>::new())
                        .with_vote_strategy(VoteStrategy::Fixed(target)),
                ) as Arc<dyn PlayerAgent>
            })
            .collect();
        let policy = EliminationPolicy::score_threshold(vec![Arc::new(FixedScoreEvaluator::new(
            "ok", NORMAL,
        ))]);
        let mut config = quick_config(3, 1);
        config.max_statement_rounds = 3;
        let session = GameSession::new(
            config,
            ConceptPair::new("apple", "pear"),
            players,
            policy,
        )
        .with_seed(seed);

        let record = session.run().await.unwrap();
        let first_vote = &record.voting_rounds[0];
        assert_eq!(first_vote.tally.get(&1), Some(&2));
        assert_eq!(first_vote.tally.get(&2), Some(&2));
        match first_vote.eliminated {
            1 => seen_first = true,
            2 => seen_second = true,
            other => panic!("tie resolved outside the tied pair: {other}"),
        }
    }

    assert!(seen_first && seen_second, "tie-break never varied across seeds");
}

#[tokio::test]
async fn round_cap_exhaustion_falls_back_to_a_majority_win() {
    let policy =
        EliminationPolicy::score_threshold(vec![Arc::new(FixedScoreEvaluator::new("ok", NORMAL))]);
    let mut config = quick_config(3, 1);
    // More passes per voting phase than the cap allows, so the cap
    // trips before any vote happens.
    config.statements_per_voting = 4;
    config.max_statement_rounds = 3;
    let session = GameSession::new(
        config,
        ConceptPair::new("apple", "pear"),
        informed_players(4),
        policy,
    )
    .with_seed(5);

    let record = session.run().await.unwrap();

    assert_eq!(record.summary.termination, TerminationReason::RoundLimit);
    assert_eq!(record.summary.winner_role, Role::Majority);
    assert_eq!(record.summary.total_voting_rounds, 0);
    assert_eq!(record.summary.total_statement_rounds, 3);
    assert_eq!(record.summary.winner_ids.len(), 3);
}

#[tokio::test]
async fn binary_judges_eliminate_on_either_dimension() {
    let policy = EliminationPolicy::binary_judges(
        Arc::new(KeywordBinaryEvaluator::new(
            "r-judge",
            EvalDimension::Reasonableness,
            "never-triggers",
        )),
        Arc::new(KeywordBinaryEvaluator::new(
            "n-judge",
            EvalDimension::Novelty,
            "pear",
        )),
    );
    let session = GameSession::new(
        quick_config(3, 1),
        ConceptPair::new("apple", "pear"),
        informed_players(4),
        policy,
    )
    .with_seed(9);

    let record = session.run().await.unwrap();

    assert_eq!(record.summary.winner_role, Role::Majority);
    assert_eq!(record.metric_eliminations.len(), 1);
    assert_eq!(record.metric_eliminations[0].reason, "low novelty");
    assert_eq!(record.evaluators, vec!["r-judge", "n-judge"]);
}

#[tokio::test]
async fn audience_mode_records_a_single_ballot_from_elector_zero() {
    let policy =
        EliminationPolicy::score_threshold(vec![Arc::new(FixedScoreEvaluator::new("ok", NORMAL))]);
    let audience = Arc::new(
        ScriptedPlayer::new(Vec::<String>::new()).with_vote_strategy(VoteStrategy::Fixed(2)),
    );
    let session = GameSession::new(
        quick_config(3, 1),
        ConceptPair::new("apple", "pear"),
        informed_players(4),
        policy,
    )
    .with_seed(2)
    .with_voting_mode(VotingMode::Audience(audience));

    let record = session.run().await.unwrap();

    let first_vote = &record.voting_rounds[0];
    assert_eq!(first_vote.ballots.len(), 1);
    assert_eq!(first_vote.ballots[0].voter, 0);
    assert_eq!(first_vote.eliminated, first_vote.ballots[0].target);
}

#[tokio::test]
async fn sessions_with_the_same_seed_replay_identically() {
    let run = |seed: u64| async move {
        let policy = EliminationPolicy::score_threshold(vec![Arc::new(FixedScoreEvaluator::new(
            "ok", NORMAL,
        ))]);
        let session = GameSession::new(
            quick_config(4, 2),
            ConceptPair::new("apple", "pear"),
            informed_players(6),
            policy,
        )
        .with_seed(seed);
        session.run().await.unwrap()
    };

    let a = run(42).await;
    let b = run(42).await;

    let speakers = |r: &undercover_core::GameRecord| {
        r.statements.iter().map(|s| s.participant).collect::<Vec<_>>()
    };
    assert_eq!(speakers(&a), speakers(&b));
    assert_eq!(a.summary.winner_role, b.summary.winner_role);
    assert_eq!(a.summary.total_voting_rounds, b.summary.total_voting_rounds);
    for (va, vb) in a.voting_rounds.iter().zip(&b.voting_rounds) {
        assert_eq!(va.eliminated, vb.eliminated);
        assert_eq!(va.tally, vb.tally);
    }
}

#[tokio::test]
async fn collaborator_failure_surfaces_after_the_retry_budget() {
    let players: Vec<Arc<dyn PlayerAgent>> = vec![
        Arc::new(FailingPlayer::new("upstream unavailable")),
        Arc::new(Informed),
        Arc::new(Informed),
        Arc::new(Informed),
    ];
    let policy =
        EliminationPolicy::score_threshold(vec![Arc::new(FixedScoreEvaluator::new("ok", NORMAL))]);
    let session = GameSession::new(
        quick_config(3, 1),
        ConceptPair::new("apple", "pear"),
        players,
        policy,
    )
    .with_seed(1);

    let err = session.run().await.unwrap_err();
    match err {
        SessionError::Generation { participant, .. } => assert_eq!(participant, 1),
        other => panic!("expected a generation error, got {other}"),
    }
}

#[tokio::test]
async fn too_small_a_roster_fails_before_any_round() {
    let policy =
        EliminationPolicy::score_threshold(vec![Arc::new(FixedScoreEvaluator::new("ok", NORMAL))]);
    let session = GameSession::new(
        quick_config(4, 2),
        ConceptPair::new("apple", "pear"),
        informed_players(3),
        policy,
    );

    let err = session.run().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::InsufficientParticipants {
            required: 6,
            available: 3
        }
    ));
}
