//! Attention-to-detail grading and aggregation.
//!
//! Individual answers are graded at capture time against the question's
//! answer key; the aggregate blends the three subsections with fixed weights.

use std::collections::BTreeSet;

use serde_json::Value as JsonValue;

use crate::models::response::AttentionSubtype;

const COMPARISON_WEIGHT: f64 = 0.40;
const VERIFICATION_WEIGHT: f64 = 0.35;
const SEQUENCES_WEIGHT: f64 = 0.25;

/// Collects the set of flagged field names from a structured answer. Accepts
/// `{"differences": [...]}`, `{"inconsistencies": [...]}` or a bare array;
/// entries may be objects with a `field` key or plain strings.
fn field_set(value: &JsonValue) -> BTreeSet<String> {
    let items = value
        .get("differences")
        .or_else(|| value.get("inconsistencies"))
        .unwrap_or(value);

    let mut fields = BTreeSet::new();
    if let Some(entries) = items.as_array() {
        for entry in entries {
            if let Some(name) = entry.get("field").and_then(|f| f.as_str()) {
                fields.insert(name.to_string());
            } else if let Some(name) = entry.as_str() {
                fields.insert(name.to_string());
            }
        }
    }
    fields
}

fn answered_value(value: &JsonValue) -> &JsonValue {
    value.get("value").unwrap_or(value)
}

/// F1 over the differences the candidate flagged vs. the ground truth.
pub fn grade_comparison(answer: &JsonValue, key: &JsonValue) -> f64 {
    let flagged = field_set(answer);
    let truth = field_set(key);

    if truth.is_empty() {
        return if flagged.is_empty() { 1.0 } else { 0.0 };
    }
    if flagged.is_empty() {
        return 0.0;
    }

    let hits = flagged.intersection(&truth).count() as f64;
    let precision = hits / flagged.len() as f64;
    let recall = hits / truth.len() as f64;
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Partial credit for cross-checked data: overlap of the flagged field set
/// with the expected one (Jaccard).
pub fn grade_verification(answer: &JsonValue, key: &JsonValue) -> f64 {
    let flagged = field_set(answer);
    let truth = field_set(key);

    if flagged.is_empty() && truth.is_empty() {
        return 1.0;
    }

    let hits = flagged.intersection(&truth).count() as f64;
    let union = flagged.union(&truth).count() as f64;
    hits / union
}

/// Error-sequence items are all-or-nothing: the candidate either identified
/// the value that breaks the sequence or did not.
pub fn grade_sequence(answer: &JsonValue, key: &JsonValue) -> bool {
    answered_value(answer) == answered_value(key)
}

#[derive(Debug, Clone)]
pub struct AttentionAnswer {
    pub subtype: AttentionSubtype,
    pub correct: bool,
    pub partial_score: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttentionScore {
    pub comparison_pct: f64,
    pub verification_pct: f64,
    pub sequences_pct: f64,
    /// Weighted blend of the three subsections (40/35/25).
    pub composite_pct: f64,
}

fn mean_partial(answers: &[AttentionAnswer], subtype: AttentionSubtype) -> f64 {
    let scores: Vec<f64> = answers
        .iter()
        .filter(|a| a.subtype == subtype)
        .map(|a| a.partial_score)
        .collect();
    if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    }
}

pub fn score(answers: &[AttentionAnswer]) -> AttentionScore {
    if answers.is_empty() {
        return AttentionScore::default();
    }

    let comparison_pct = mean_partial(answers, AttentionSubtype::Comparison) * 100.0;
    let verification_pct = mean_partial(answers, AttentionSubtype::Verification) * 100.0;

    let sequences: Vec<&AttentionAnswer> = answers
        .iter()
        .filter(|a| a.subtype == AttentionSubtype::Sequence)
        .collect();
    let sequences_pct = if sequences.is_empty() {
        0.0
    } else {
        sequences.iter().filter(|a| a.correct).count() as f64 / sequences.len() as f64 * 100.0
    };

    let composite_pct = comparison_pct * COMPARISON_WEIGHT
        + verification_pct * VERIFICATION_WEIGHT
        + sequences_pct * SEQUENCES_WEIGHT;

    AttentionScore {
        comparison_pct,
        verification_pct,
        sequences_pct,
        composite_pct,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn comparison_perfect_match_is_1() {
        let key = json!({ "differences": [{ "field": "total" }, { "field": "date" }] });
        let answer = json!({ "differences": [{ "field": "date" }, { "field": "total" }] });
        assert_eq!(grade_comparison(&answer, &key), 1.0);
    }

    #[test]
    fn comparison_f1_balances_precision_and_recall() {
        let key = json!({ "differences": [{ "field": "total" }, { "field": "date" }] });
        // One hit, one false positive: precision 0.5, recall 0.5 -> F1 0.5.
        let answer = json!({ "differences": [{ "field": "total" }, { "field": "tax_id" }] });
        assert!((grade_comparison(&answer, &key) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn comparison_nothing_flagged_is_0() {
        let key = json!({ "differences": [{ "field": "total" }] });
        assert_eq!(grade_comparison(&json!({ "differences": [] }), &key), 0.0);
    }

    #[test]
    fn verification_partial_credit() {
        let key = json!({ "inconsistencies": [{ "field": "email" }, { "field": "phone" }] });
        let answer = json!({ "inconsistencies": [{ "field": "email" }] });
        assert!((grade_verification(&answer, &key) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn sequence_exact_value() {
        assert!(grade_sequence(&json!({ "value": 37 }), &json!({ "value": 37 })));
        assert!(!grade_sequence(&json!({ "value": 32 }), &json!({ "value": 37 })));
    }

    #[test]
    fn composite_uses_fixed_weights() {
        let answers = vec![
            AttentionAnswer {
                subtype: AttentionSubtype::Comparison,
                correct: true,
                partial_score: 1.0,
            },
            AttentionAnswer {
                subtype: AttentionSubtype::Verification,
                correct: false,
                partial_score: 0.5,
            },
            AttentionAnswer {
                subtype: AttentionSubtype::Sequence,
                correct: true,
                partial_score: 1.0,
            },
        ];
        let result = score(&answers);
        assert_eq!(result.comparison_pct, 100.0);
        assert_eq!(result.verification_pct, 50.0);
        assert_eq!(result.sequences_pct, 100.0);
        // 100*0.40 + 50*0.35 + 100*0.25
        assert!((result.composite_pct - 82.5).abs() < 1e-9);
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(score(&[]), AttentionScore::default());
    }
}
