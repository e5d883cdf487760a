//! Elimination policy — the pluggable judging step of a statement
//! round.
//!
//! Two documented variants:
//! - score-threshold: mean novelty and mean reasonableness across one
//!   or more score evaluators; either mean at or below the threshold
//!   eliminates immediately.
//! - binary judges: one specialized 0/1 judge per dimension; either
//!   voting 1 eliminates.

use std::sync::Arc;

use crate::collaborator::{BinaryEvaluator, EvaluationError, ScoreEvaluator};
use crate::history::StatementHistory;
use crate::record::{Evaluation, JudgeScores};

/// Default elimination threshold on the 0–1 scale.
pub const DEFAULT_SCORE_THRESHOLD: f64 = 0.3;

#[derive(Clone)]
pub enum EliminationPolicy {
    ScoreThreshold {
        evaluators: Vec<Arc<dyn ScoreEvaluator>>,
        threshold: f64,
    },
    BinaryJudges {
        reasonableness: Arc<dyn BinaryEvaluator>,
        novelty: Arc<dyn BinaryEvaluator>,
    },
}

/// Outcome of judging one statement.
#[derive(Debug, Clone)]
pub struct Verdict {
    pub evaluation: Evaluation,
    pub eliminate: bool,
    /// Human-readable cause, set only when `eliminate` is true.
    pub reason: Option<String>,
}

impl EliminationPolicy {
    /// Score-threshold variant with the default threshold.
    pub fn score_threshold(evaluators: Vec<Arc<dyn ScoreEvaluator>>) -> Self {
        Self::ScoreThreshold {
            evaluators,
            threshold: DEFAULT_SCORE_THRESHOLD,
        }
    }

    pub fn binary_judges(
        reasonableness: Arc<dyn BinaryEvaluator>,
        novelty: Arc<dyn BinaryEvaluator>,
    ) -> Self {
        Self::BinaryJudges {
            reasonableness,
            novelty,
        }
    }

    /// Identifiers of the evaluators behind this policy, for the
    /// record header.
    pub fn evaluator_ids(&self) -> Vec<String> {
        match self {
            Self::ScoreThreshold { evaluators, .. } => {
                evaluators.iter().map(|e| e.id().to_string()).collect()
            }
            Self::BinaryJudges {
                reasonableness,
                novelty,
            } => vec![
                reasonableness.id().to_string(),
                novelty.id().to_string(),
            ],
        }
    }

    /// Judge one statement. Evaluators run sequentially, matching the
    /// strictly sequential in-session execution model.
    pub async fn judge(
        &self,
        statement: &str,
        own_concept: &str,
        other_concept: &str,
        history: &StatementHistory,
    ) -> Result<Verdict, EvaluationError> {
        match self {
            Self::ScoreThreshold {
                evaluators,
                threshold,
            } => {
                let mut judges = Vec::with_capacity(evaluators.len());
                for evaluator in evaluators {
                    let scores = evaluator
                        .evaluate(statement, own_concept, other_concept, history)
                        .await?;
                    judges.push(JudgeScores {
                        judge_id: evaluator.id().to_string(),
                        scores,
                    });
                }
                Ok(score_verdict(judges, *threshold))
            }
            Self::BinaryJudges {
                reasonableness,
                novelty,
            } => {
                let reasonableness_eliminate = reasonableness
                    .decide(statement, own_concept, other_concept, history)
                    .await?;
                let novelty_eliminate = novelty
                    .decide(statement, own_concept, other_concept, history)
                    .await?;

                let eliminate = reasonableness_eliminate || novelty_eliminate;
                let reason = binary_reason(reasonableness_eliminate, novelty_eliminate);

                Ok(Verdict {
                    evaluation: Evaluation::Binary {
                        reasonableness_judge: reasonableness.id().to_string(),
                        novelty_judge: novelty.id().to_string(),
                        reasonableness_eliminate,
                        novelty_eliminate,
                    },
                    eliminate,
                    reason,
                })
            }
        }
    }
}

fn score_verdict(judges: Vec<JudgeScores>, threshold: f64) -> Verdict {
    let n = judges.len().max(1) as f64;
    let novelty_mean = judges.iter().map(|j| j.scores.novelty).sum::<f64>() / n;
    let relevance_mean = judges.iter().map(|j| j.scores.relevance).sum::<f64>() / n;
    let reasonableness_mean = judges.iter().map(|j| j.scores.reasonableness).sum::<f64>() / n;

    let variance = |mean: f64, values: &mut dyn Iterator<Item = f64>| -> f64 {
        let sq: f64 = values.map(|v| (v - mean).powi(2)).sum();
        sq / n
    };
    let novelty_variance = variance(novelty_mean, &mut judges.iter().map(|j| j.scores.novelty));
    let reasonableness_variance = variance(
        reasonableness_mean,
        &mut judges.iter().map(|j| j.scores.reasonableness),
    );

    let low_novelty = novelty_mean <= threshold;
    let low_reasonableness = reasonableness_mean <= threshold;
    let eliminate = low_novelty || low_reasonableness;

    let reason = match (low_novelty, low_reasonableness) {
        (true, true) => Some(format!(
            "low novelty score: {novelty_mean:.2} and low reasonableness score: {reasonableness_mean:.2}"
        )),
        (true, false) => Some(format!("low novelty score: {novelty_mean:.2}")),
        (false, true) => Some(format!("low reasonableness score: {reasonableness_mean:.2}")),
        (false, false) => None,
    };

    Verdict {
        evaluation: Evaluation::Scores {
            judges,
            novelty_mean,
            relevance_mean,
            reasonableness_mean,
            novelty_variance,
            reasonableness_variance,
        },
        eliminate,
        reason,
    }
}

fn binary_reason(reasonableness: bool, novelty: bool) -> Option<String> {
    match (reasonableness, novelty) {
        (true, true) => Some("low reasonableness and low novelty".to_string()),
        (true, false) => Some("low reasonableness".to_string()),
        (false, true) => Some("low novelty".to_string()),
        (false, false) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::ScoreCard;

    fn card(novelty: f64, reasonableness: f64) -> JudgeScores {
        JudgeScores {
            judge_id: "judge".to_string(),
            scores: ScoreCard {
                novelty,
                relevance: 0.8,
                reasonableness,
            },
        }
    }

    #[test]
    fn means_above_threshold_keep_the_player() {
        let verdict = score_verdict(vec![card(0.6, 0.8), card(0.4, 0.6)], 0.3);
        assert!(!verdict.eliminate);
        assert!(verdict.reason.is_none());
        match verdict.evaluation {
            Evaluation::Scores {
                novelty_mean,
                reasonableness_mean,
                ..
            } => {
                assert!((novelty_mean - 0.5).abs() < 1e-9);
                assert!((reasonableness_mean - 0.7).abs() < 1e-9);
            }
            other => panic!("expected score evaluation, got {other:?}"),
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        // A mean exactly at the threshold eliminates.
        let verdict = score_verdict(vec![card(0.3, 1.0)], 0.3);
        assert!(verdict.eliminate);
        assert_eq!(verdict.reason.as_deref(), Some("low novelty score: 0.30"));
    }

    #[test]
    fn both_dimensions_low_combines_the_reason() {
        let verdict = score_verdict(vec![card(0.2, 0.0)], 0.3);
        assert!(verdict.eliminate);
        let reason = verdict.reason.unwrap();
        assert!(reason.contains("low novelty score"));
        assert!(reason.contains("low reasonableness score"));
    }

    #[test]
    fn relevance_never_eliminates() {
        let verdict = score_verdict(
            vec![JudgeScores {
                judge_id: "judge".to_string(),
                scores: ScoreCard {
                    novelty: 0.8,
                    relevance: 0.0,
                    reasonableness: 0.8,
                },
            }],
            0.3,
        );
        assert!(!verdict.eliminate);
    }

    #[test]
    fn variance_across_judges() {
        let verdict = score_verdict(vec![card(0.2, 0.8), card(0.6, 0.8)], 0.3);
        match verdict.evaluation {
            Evaluation::Scores {
                novelty_variance,
                reasonableness_variance,
                ..
            } => {
                assert!((novelty_variance - 0.04).abs() < 1e-9);
                assert!(reasonableness_variance.abs() < 1e-9);
            }
            other => panic!("expected score evaluation, got {other:?}"),
        }
    }

    #[test]
    fn binary_reason_names_the_failing_dimension() {
        assert_eq!(binary_reason(false, true).as_deref(), Some("low novelty"));
        assert_eq!(
            binary_reason(true, false).as_deref(),
            Some("low reasonableness")
        );
        assert!(binary_reason(false, false).is_none());
    }
}
