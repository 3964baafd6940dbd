//! Reliability indicators: social-desirability bias and consistency-pair
//! concordance. Either one tripping marks the whole evaluation unreliable,
//! which the verdict engine treats as an absolute override to REVISION.

use std::collections::{HashMap, HashSet};

use uuid::Uuid;

/// Social-desirability mean above this (1-5 scale) flags the evaluation.
pub const MAX_SOCIAL_DESIRABILITY: f64 = 4.0;
/// Mean pair concordance below this percentage flags the evaluation.
pub const MIN_CONSISTENCY_PCT: f64 = 60.0;

/// Maximum answer difference on a 1-5 scale.
const MAX_DIFF: f64 = 4.0;

/// A psychometric answer carrying the pair link of its question. The value is
/// already inversion-adjusted.
#[derive(Debug, Clone)]
pub struct PairedAnswer {
    pub question_id: Uuid,
    pub pair_id: Option<Uuid>,
    pub adjusted_value: f64,
}

/// Mean concordance across all consistency pairs where both members were
/// answered, as a percentage. Concordance of one pair is `1 - |a - b| / 4`.
/// Returns `None` when no pair was fully answered; callers must not penalize
/// reliability in that case.
pub fn consistency_index(answers: &[PairedAnswer]) -> Option<f64> {
    let value_by_question: HashMap<Uuid, f64> = answers
        .iter()
        .map(|a| (a.question_id, a.adjusted_value))
        .collect();

    let mut concordances = Vec::new();
    let mut seen: HashSet<Uuid> = HashSet::new();
    for answer in answers {
        let Some(pair_id) = answer.pair_id else {
            continue;
        };
        if seen.contains(&answer.question_id) {
            continue;
        }
        let (Some(value_a), Some(value_b)) = (
            value_by_question.get(&answer.question_id),
            value_by_question.get(&pair_id),
        ) else {
            continue;
        };
        concordances.push(1.0 - (value_a - value_b).abs() / MAX_DIFF);
        seen.insert(answer.question_id);
        seen.insert(pair_id);
    }

    if concordances.is_empty() {
        None
    } else {
        Some(concordances.iter().sum::<f64>() / concordances.len() as f64 * 100.0)
    }
}

pub fn is_reliable(social_desirability: f64, consistency_pct: Option<f64>) -> bool {
    if social_desirability > MAX_SOCIAL_DESIRABILITY {
        return false;
    }
    if let Some(pct) = consistency_pct {
        if pct < MIN_CONSISTENCY_PCT {
            return false;
        }
    }
    true
}
