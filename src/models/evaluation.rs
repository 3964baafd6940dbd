use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::instrument::InstrumentKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    /// Link issued, candidate not yet verified.
    Pending,
    /// Identity confirmed, candidate answering.
    InProgress,
    /// All instruments submitted, pending review.
    Completed,
    /// Evaluator finalized projective scores and verdict.
    Reviewed,
    Expired,
    Cancelled,
}

/// One candidate's assessment session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    pub id: Uuid,
    /// Opaque access token embedded in the candidate link. Immutable after
    /// creation.
    pub token: String,

    // Candidate identity
    pub full_name: String,
    pub national_id: String,
    pub email: String,
    pub phone: Option<String>,
    pub applied_position: Option<String>,

    /// Profile the evaluation is graded against. Set at creation; thresholds
    /// are re-read live at scoring time.
    pub profile_id: Option<Uuid>,

    pub status: EvaluationStatus,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,

    /// Last instrument the candidate was on, for resumability.
    pub current_instrument: Option<InstrumentKind>,
    /// Question ids selected for this session. Set exactly once, at
    /// verification time; never regenerated afterwards.
    pub selected_questions: Option<Vec<Uuid>>,

    pub access_ip: Option<String>,
    pub user_agent: Option<String>,
    pub evaluator_notes: String,

    /// Failed identity-verification attempts against this token.
    pub failed_verifications: u32,
    /// Last suppressed scoring failure, kept for operator visibility. Cleared
    /// by a successful recomputation.
    pub scoring_error: Option<String>,
}

impl Evaluation {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
