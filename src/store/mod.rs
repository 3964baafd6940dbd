//! Persistence contract for the assessment engine.
//!
//! The engine treats storage as an external collaborator: services depend on
//! the [`EvaluationStore`] trait, not on a concrete backend. The in-memory
//! reference backend lives in [`memory`] and backs the default server wiring
//! and the test suite.

pub mod memory;
pub mod seed;

use uuid::Uuid;

use crate::models::evaluation::Evaluation;
use crate::models::instrument::{Instrument, InstrumentKind};
use crate::models::profile::TargetProfile;
use crate::models::question::{ChoiceOption, Question};
use crate::models::response::{
    AttentionResponse, MatrixResponse, MemoryResponse, ProjectiveResponse, PsychometricResponse,
    SituationalResponse,
};
use crate::models::result::FinalResult;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Backend contract. Operations are short synchronous units of work; answer
/// writes are upserts keyed on their uniqueness constraint (last write wins).
/// Deleting an evaluation cascades to all of its child records.
pub trait EvaluationStore: Send + Sync {
    // ── Target profiles ───────────────────────────────────────────────

    fn insert_profile(&self, profile: TargetProfile) -> StoreResult<()>;
    fn profile(&self, id: Uuid) -> StoreResult<Option<TargetProfile>>;
    fn profiles(&self) -> StoreResult<Vec<TargetProfile>>;

    // ── Instrument catalog ────────────────────────────────────────────

    fn insert_instrument(&self, instrument: Instrument) -> StoreResult<()>;
    fn instrument(&self, id: Uuid) -> StoreResult<Option<Instrument>>;
    fn instrument_by_kind(&self, kind: InstrumentKind) -> StoreResult<Option<Instrument>>;
    /// All instruments, sorted by position.
    fn instruments(&self) -> StoreResult<Vec<Instrument>>;
    /// Active instruments only, sorted by position.
    fn active_instruments(&self) -> StoreResult<Vec<Instrument>>;

    fn insert_question(&self, question: Question) -> StoreResult<()>;
    fn question(&self, id: Uuid) -> StoreResult<Option<Question>>;
    /// Questions of one instrument, sorted by position.
    fn questions_for_instrument(&self, instrument_id: Uuid) -> StoreResult<Vec<Question>>;

    fn insert_option(&self, option: ChoiceOption) -> StoreResult<()>;
    fn option(&self, id: Uuid) -> StoreResult<Option<ChoiceOption>>;
    fn options_for_question(&self, question_id: Uuid) -> StoreResult<Vec<ChoiceOption>>;

    // ── Evaluations ───────────────────────────────────────────────────

    fn insert_evaluation(&self, evaluation: Evaluation) -> StoreResult<()>;
    fn evaluation(&self, id: Uuid) -> StoreResult<Option<Evaluation>>;
    fn evaluation_by_token(&self, token: &str) -> StoreResult<Option<Evaluation>>;
    fn update_evaluation(&self, evaluation: &Evaluation) -> StoreResult<()>;
    /// All evaluations, newest first.
    fn evaluations(&self) -> StoreResult<Vec<Evaluation>>;
    fn delete_evaluation(&self, id: Uuid) -> StoreResult<()>;

    // ── Responses ─────────────────────────────────────────────────────

    /// Upsert keyed on (evaluation, question).
    fn upsert_psychometric(&self, response: PsychometricResponse) -> StoreResult<()>;
    fn psychometric_responses(&self, evaluation_id: Uuid) -> StoreResult<Vec<PsychometricResponse>>;

    /// Upsert keyed on (evaluation, question).
    fn upsert_memory(&self, response: MemoryResponse) -> StoreResult<()>;
    fn memory_responses(&self, evaluation_id: Uuid) -> StoreResult<Vec<MemoryResponse>>;

    /// Upsert keyed on (evaluation, question).
    fn upsert_matrix(&self, response: MatrixResponse) -> StoreResult<()>;
    fn matrix_responses(&self, evaluation_id: Uuid) -> StoreResult<Vec<MatrixResponse>>;

    /// Upsert keyed on (evaluation, question).
    fn upsert_situational(&self, response: SituationalResponse) -> StoreResult<()>;
    fn situational_responses(&self, evaluation_id: Uuid) -> StoreResult<Vec<SituationalResponse>>;

    /// Upsert keyed on (evaluation, question).
    fn upsert_attention(&self, response: AttentionResponse) -> StoreResult<()>;
    fn attention_responses(&self, evaluation_id: Uuid) -> StoreResult<Vec<AttentionResponse>>;

    /// Upsert keyed on (evaluation, instrument, question).
    fn upsert_projective(&self, response: ProjectiveResponse) -> StoreResult<()>;
    fn projective_responses(&self, evaluation_id: Uuid) -> StoreResult<Vec<ProjectiveResponse>>;
    /// Update an existing projective response by id.
    fn update_projective(&self, response: &ProjectiveResponse) -> StoreResult<()>;
    fn unreviewed_projectives(&self, evaluation_id: Uuid) -> StoreResult<Vec<ProjectiveResponse>>;

    // ── Final results ─────────────────────────────────────────────────

    fn result(&self, evaluation_id: Uuid) -> StoreResult<Option<FinalResult>>;
    /// Insert or replace the single result row of an evaluation.
    fn save_result(&self, result: FinalResult) -> StoreResult<()>;
}
