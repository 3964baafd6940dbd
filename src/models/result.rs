use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Apto,
    NoApto,
    Revision,
}

/// Consolidated result of an evaluation. One-to-one with the evaluation;
/// created lazily the first time scoring runs and updated in place on every
/// recomputation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalResult {
    pub evaluation_id: Uuid,

    // Big Five (1-5 scale)
    pub responsibility: f64,
    pub agreeableness: f64,
    pub neuroticism: f64,
    pub openness: f64,
    pub extraversion: f64,

    // Organizational commitment (1-5 scale)
    pub commitment_affective: f64,
    pub commitment_continuance: f64,
    pub commitment_normative: f64,
    pub commitment_total: f64,

    pub obedience: f64,

    // Percent scores
    pub memory_pct: f64,
    pub memory_max_span: i32,
    pub matrices_pct: f64,
    pub situational_pct: f64,

    // Attention to detail
    pub attention_pct: f64,
    pub attention_comparison_pct: f64,
    pub attention_verification_pct: f64,
    pub attention_sequences_pct: f64,

    // Projective scores, from evaluator review (1-10)
    pub tree_score: Option<f64>,
    pub person_in_rain_score: Option<f64>,
    pub phrases_score: Option<f64>,
    pub colors_interpretation: Option<JsonValue>,

    // Reliability
    pub social_desirability: f64,
    /// Concordance between consistency pairs, 0-100. `None` when no pair was
    /// fully answered; callers must not penalize reliability in that case.
    pub consistency_pct: Option<f64>,
    pub reliable: bool,

    // Derived composite indices (approx. 0-5 scale)
    pub responsibility_index: f64,
    pub loyalty_index: f64,
    pub obedience_index: f64,

    pub automatic_verdict: Verdict,
    pub manual_verdict: Option<Verdict>,
    /// Manual verdict when present, automatic otherwise.
    pub final_verdict: Verdict,

    pub observations: String,
    pub computed_at: DateTime<Utc>,
}

impl FinalResult {
    pub fn new(evaluation_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            evaluation_id,
            responsibility: 0.0,
            agreeableness: 0.0,
            neuroticism: 0.0,
            openness: 0.0,
            extraversion: 0.0,
            commitment_affective: 0.0,
            commitment_continuance: 0.0,
            commitment_normative: 0.0,
            commitment_total: 0.0,
            obedience: 0.0,
            memory_pct: 0.0,
            memory_max_span: 0,
            matrices_pct: 0.0,
            situational_pct: 0.0,
            attention_pct: 0.0,
            attention_comparison_pct: 0.0,
            attention_verification_pct: 0.0,
            attention_sequences_pct: 0.0,
            tree_score: None,
            person_in_rain_score: None,
            phrases_score: None,
            colors_interpretation: None,
            social_desirability: 0.0,
            consistency_pct: None,
            reliable: true,
            responsibility_index: 0.0,
            loyalty_index: 0.0,
            obedience_index: 0.0,
            automatic_verdict: Verdict::Revision,
            manual_verdict: None,
            final_verdict: Verdict::Revision,
            observations: String::new(),
            computed_at: now,
        }
    }
}
