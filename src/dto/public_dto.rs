use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::evaluation::EvaluationStatus;
use crate::models::instrument::InstrumentKind;
use crate::models::question::ScaleKind;
use crate::models::response::ProjectiveKind;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionSummaryResponse {
    pub candidate_name: String,
    pub applied_position: Option<String>,
    pub status: EvaluationStatus,
    pub expires_at: DateTime<Utc>,
    pub current_instrument: Option<InstrumentKind>,
    /// A completed or reviewed session sends the candidate straight to the
    /// finalize page instead of restarting.
    pub go_to_finalize: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct VerifyIdentityRequest {
    #[validate(length(min = 6, max = 13))]
    pub national_id: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VerifyIdentityResponse {
    pub status: EvaluationStatus,
    pub first_instrument: Option<InstrumentKind>,
    pub total_questions: usize,
}

/// Question as shown to the candidate. Scoring attributes (dimension,
/// inversion, answer keys, option values) are never exposed.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicQuestion {
    pub id: Uuid,
    pub text: String,
    pub scale: ScaleKind,
    pub position: i32,
    pub options: Vec<PublicOption>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublicOption {
    pub id: Uuid,
    pub text: String,
    pub position: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InstrumentPageResponse {
    pub kind: InstrumentKind,
    pub name: String,
    pub instructions: String,
    pub time_limit_minutes: Option<i32>,
    pub questions: Vec<PublicQuestion>,
    /// Next instrument in presentation order; `None` means the finalize step
    /// is next.
    pub next: Option<InstrumentKind>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SubmitPsychometricRequest {
    pub question_id: Uuid,
    #[validate(range(min = 1, max = 7))]
    pub value: i32,
    pub option_id: Option<Uuid>,
    pub response_seconds: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SubmitMemoryRequest {
    pub question_id: Uuid,
    #[validate(length(min = 1))]
    pub answered: Vec<i32>,
    pub response_seconds: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SubmitMatrixRequest {
    pub question_id: Uuid,
    pub option_id: Uuid,
    pub response_seconds: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SubmitSituationalRequest {
    pub question_id: Uuid,
    pub option_id: Uuid,
    pub justification: Option<String>,
    pub response_seconds: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SubmitAttentionRequest {
    pub question_id: Uuid,
    /// Structured answer: flagged differences/inconsistencies or the value
    /// identified as the sequence error.
    #[schema(value_type = Object)]
    pub answer: JsonValue,
    pub response_seconds: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SubmitProjectiveRequest {
    pub question_id: Option<Uuid>,
    pub kind: ProjectiveKind,
    pub canvas_image: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub stroke_data: Option<JsonValue>,
    pub text_answer: Option<String>,
    pub response_seconds: Option<i32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SaveResponseResponse {
    pub saved: bool,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FinalizeResponse {
    pub status: EvaluationStatus,
    pub finished_at: Option<DateTime<Utc>>,
    pub message: String,
}
