use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::evaluation::{Evaluation, EvaluationStatus};
use crate::models::profile::VerdictMethod;
use crate::models::result::{FinalResult, Verdict};
use crate::services::ai_grading::GradeSuggestion;

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateEvaluationRequest {
    #[validate(length(min = 3, max = 200))]
    pub full_name: String,
    #[validate(length(min = 6, max = 13))]
    pub national_id: String,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    pub applied_position: Option<String>,
    pub profile_id: Option<Uuid>,
    #[validate(range(min = 1, max = 720))]
    pub expires_in_hours: Option<i64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CreateEvaluationResponse {
    pub id: Uuid,
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub status: EvaluationStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationSummary {
    pub id: Uuid,
    pub full_name: String,
    pub national_id: String,
    pub status: EvaluationStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub final_verdict: Option<Verdict>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationDetailResponse {
    pub evaluation: Evaluation,
    pub result: Option<FinalResult>,
    pub pending_projectives: usize,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ReviewProjectiveRequest {
    pub response_id: Uuid,
    #[validate(range(min = 1, max = 10))]
    pub score: i32,
    pub observations: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct ManualVerdictRequest {
    pub verdict: Verdict,
    pub observations: Option<String>,
}

/// Profile creation; omitted thresholds fall back to the standard defaults.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub min_responsibility: Option<f64>,
    pub min_agreeableness: Option<f64>,
    pub max_neuroticism: Option<f64>,
    pub min_openness: Option<f64>,
    pub min_extraversion: Option<f64>,
    pub min_commitment: Option<f64>,
    pub min_obedience: Option<f64>,
    pub min_memory_pct: Option<f64>,
    pub min_matrices_pct: Option<f64>,
    pub min_situational_pct: Option<f64>,
    pub min_attention_pct: Option<f64>,
    pub verdict_method: Option<VerdictMethod>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AiGradeResponse {
    pub suggestions: Vec<GradeSuggestion>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ExpireSweepResponse {
    pub expired: usize,
}
