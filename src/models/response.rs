use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use uuid::Uuid;

/// Likert and multiple-choice answers. One row per (evaluation, question).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PsychometricResponse {
    pub id: Uuid,
    pub evaluation_id: Uuid,
    pub question_id: Uuid,
    pub value: i32,
    pub option_id: Option<Uuid>,
    pub response_seconds: Option<i32>,
    pub answered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ProjectiveKind {
    Drawing,
    Text,
}

/// Drawings and free-text answers to projective instruments. One row per
/// (evaluation, instrument, question).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectiveResponse {
    pub id: Uuid,
    pub evaluation_id: Uuid,
    pub instrument_id: Uuid,
    pub question_id: Option<Uuid>,
    pub kind: ProjectiveKind,

    /// Base64 canvas image, for drawings.
    pub canvas_image: String,
    /// Stroke data: coordinates, pressure, order.
    pub stroke_data: Option<JsonValue>,
    pub text_answer: String,

    // Evaluator review
    pub manual_score: Option<i32>,
    pub reviewer_observations: String,
    pub reviewed: bool,
    pub reviewed_at: Option<DateTime<Utc>>,

    pub response_seconds: Option<i32>,
    pub answered_at: DateTime<Utc>,
}

/// Working-memory answers. Correctness is derived at write time by exact
/// comparison against the presented sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryResponse {
    pub id: Uuid,
    pub evaluation_id: Uuid,
    pub question_id: Uuid,
    pub presented: Vec<i32>,
    pub answered: Vec<i32>,
    pub correct: bool,
    pub sequence_length: i32,
    pub response_seconds: Option<i32>,
    pub answered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixResponse {
    pub id: Uuid,
    pub evaluation_id: Uuid,
    pub question_id: Uuid,
    pub option_id: Option<Uuid>,
    pub correct: bool,
    pub response_seconds: Option<i32>,
    pub answered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SituationalResponse {
    pub id: Uuid,
    pub evaluation_id: Uuid,
    pub question_id: Uuid,
    pub option_id: Option<Uuid>,
    pub value: i32,
    pub justification: String,
    pub response_seconds: Option<i32>,
    pub answered_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttentionSubtype {
    Comparison,
    Verification,
    Sequence,
}

/// Attention-to-detail answers, graded at write time against the question's
/// answer key. `partial_score` is 0-1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttentionResponse {
    pub id: Uuid,
    pub evaluation_id: Uuid,
    pub question_id: Uuid,
    pub subtype: AttentionSubtype,
    pub answer: JsonValue,
    pub correct: bool,
    pub partial_score: f64,
    pub response_seconds: Option<i32>,
    pub answered_at: DateTime<Utc>,
}
