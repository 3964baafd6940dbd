use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum VerdictMethod {
    /// 0 failures = APTO, exactly 1 = REVISION, 2+ = NO_APTO.
    FailureCount,
    /// Any failure at all = NO_APTO.
    Strict,
}

/// Threshold set an evaluation is graded against. Thresholds are read live at
/// scoring time from whatever profile the evaluation references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetProfile {
    pub id: Uuid,
    pub name: String,

    // Big Five thresholds (1-5 scale)
    pub min_responsibility: f64,
    pub min_agreeableness: f64,
    pub max_neuroticism: f64,
    pub min_openness: f64,
    pub min_extraversion: f64,

    // Instrument-specific thresholds
    pub min_commitment: f64,
    pub min_obedience: f64,
    pub min_memory_pct: f64,
    pub min_matrices_pct: f64,
    pub min_situational_pct: f64,
    pub min_attention_pct: f64,

    pub verdict_method: VerdictMethod,
    pub active: bool,
}

impl TargetProfile {
    pub fn standard(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            min_responsibility: 4.0,
            min_agreeableness: 3.0,
            max_neuroticism: 3.0,
            min_openness: 2.5,
            min_extraversion: 2.0,
            min_commitment: 3.5,
            min_obedience: 3.5,
            min_memory_pct: 60.0,
            min_matrices_pct: 50.0,
            min_situational_pct: 60.0,
            min_attention_pct: 60.0,
            verdict_method: VerdictMethod::FailureCount,
            active: true,
        }
    }
}
