//! Session lifecycle: token issuance, identity verification, instrument
//! navigation, response capture and finalization.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{Duration, Utc};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::dto::public_dto::{
    SubmitAttentionRequest, SubmitMatrixRequest, SubmitMemoryRequest, SubmitProjectiveRequest,
    SubmitPsychometricRequest, SubmitSituationalRequest,
};
use crate::error::{Error, Result};
use crate::models::evaluation::{Evaluation, EvaluationStatus};
use crate::models::instrument::{Instrument, InstrumentKind};
use crate::models::question::{ChoiceOption, Dimension, Question, ScaleKind};
use crate::models::response::{
    AttentionResponse, AttentionSubtype, MatrixResponse, MemoryResponse, ProjectiveKind,
    ProjectiveResponse, PsychometricResponse, SituationalResponse,
};
use crate::models::result::{FinalResult, Verdict};
use crate::services::scoring::ScoringService;
use crate::services::selection;
use crate::store::EvaluationStore;
use crate::utils::token::generate_access_token;

const TOKEN_LENGTH: usize = 64;

#[derive(Debug, Clone)]
pub struct NewEvaluation {
    pub full_name: String,
    pub national_id: String,
    pub email: String,
    pub phone: Option<String>,
    pub applied_position: Option<String>,
    pub profile_id: Option<Uuid>,
    pub expires_in_hours: Option<i64>,
}

/// Everything a candidate needs to render one instrument page.
#[derive(Debug, Clone)]
pub struct InstrumentPage {
    pub instrument: Instrument,
    pub questions: Vec<(Question, Vec<ChoiceOption>)>,
    /// Next active instrument in presentation order; `None` sends the
    /// candidate to the finalize step.
    pub next: Option<InstrumentKind>,
}

#[derive(Clone)]
pub struct SessionService {
    store: Arc<dyn EvaluationStore>,
    scoring: ScoringService,
    ttl_hours: i64,
    max_verification_attempts: u32,
}

impl SessionService {
    pub fn new(
        store: Arc<dyn EvaluationStore>,
        scoring: ScoringService,
        ttl_hours: i64,
        max_verification_attempts: u32,
    ) -> Self {
        Self {
            store,
            scoring,
            ttl_hours,
            max_verification_attempts,
        }
    }

    // ── Panel: evaluation lifecycle ───────────────────────────────────

    pub fn create_evaluation(&self, new: NewEvaluation) -> Result<Evaluation> {
        if let Some(profile_id) = new.profile_id {
            self.store
                .profile(profile_id)?
                .ok_or_else(|| Error::NotFound("Target profile not found".to_string()))?;
        }

        let now = Utc::now();
        let evaluation = Evaluation {
            id: Uuid::new_v4(),
            token: generate_access_token(TOKEN_LENGTH),
            full_name: new.full_name,
            national_id: new.national_id,
            email: new.email,
            phone: new.phone,
            applied_position: new.applied_position,
            profile_id: new.profile_id,
            status: EvaluationStatus::Pending,
            created_at: now,
            expires_at: now + Duration::hours(new.expires_in_hours.unwrap_or(self.ttl_hours)),
            started_at: None,
            finished_at: None,
            current_instrument: None,
            selected_questions: None,
            access_ip: None,
            user_agent: None,
            evaluator_notes: String::new(),
            failed_verifications: 0,
            scoring_error: None,
        };
        self.store.insert_evaluation(evaluation.clone())?;
        Ok(evaluation)
    }

    pub fn cancel(&self, evaluation_id: Uuid) -> Result<Evaluation> {
        let mut evaluation = self.get(evaluation_id)?;
        evaluation.status = EvaluationStatus::Cancelled;
        self.store.update_evaluation(&evaluation)?;
        Ok(evaluation)
    }

    pub fn get(&self, evaluation_id: Uuid) -> Result<Evaluation> {
        self.store
            .evaluation(evaluation_id)?
            .ok_or_else(|| Error::NotFound("Evaluation not found".to_string()))
    }

    pub fn list(&self) -> Result<Vec<Evaluation>> {
        Ok(self.store.evaluations()?)
    }

    /// Marks every overdue pending evaluation expired. Expiration is normally
    /// lazy on access; this sweep is the administrative catch-up.
    pub fn expire_overdue(&self) -> Result<usize> {
        let now = Utc::now();
        let mut expired = 0;
        for mut evaluation in self.store.evaluations()? {
            if evaluation.status == EvaluationStatus::Pending && evaluation.is_expired(now) {
                evaluation.status = EvaluationStatus::Expired;
                self.store.update_evaluation(&evaluation)?;
                expired += 1;
            }
        }
        Ok(expired)
    }

    // ── Candidate: token access ───────────────────────────────────────

    /// Token lookup with lazy expiration: a pending evaluation past its TTL
    /// transitions to expired on the access that finds it overdue.
    pub fn lookup(&self, token: &str) -> Result<Evaluation> {
        let mut evaluation = self
            .store
            .evaluation_by_token(token)?
            .ok_or_else(|| Error::NotFound("Evaluation not found".to_string()))?;
        if evaluation.status == EvaluationStatus::Pending && evaluation.is_expired(Utc::now()) {
            evaluation.status = EvaluationStatus::Expired;
            self.store.update_evaluation(&evaluation)?;
        }
        Ok(evaluation)
    }

    /// Confirms the candidate's identity, selects the session's questions
    /// (once) and opens the first instrument. Re-verifying an in-progress
    /// session resumes it at the current instrument.
    pub fn verify_identity(
        &self,
        token: &str,
        national_id: &str,
        access_ip: Option<String>,
        user_agent: Option<String>,
    ) -> Result<(Evaluation, Option<InstrumentKind>)> {
        let mut evaluation = self.lookup(token)?;

        match evaluation.status {
            EvaluationStatus::Expired => {
                Err(Error::Expired("The evaluation link has expired".to_string()))
            }
            EvaluationStatus::InProgress => {
                self.check_national_id(&mut evaluation, national_id)?;
                let current = evaluation.current_instrument;
                Ok((evaluation, current))
            }
            EvaluationStatus::Pending => {
                if evaluation.failed_verifications >= self.max_verification_attempts {
                    return Err(Error::Conflict(
                        "Identity verification is locked after repeated failures".to_string(),
                    ));
                }
                self.check_national_id(&mut evaluation, national_id)?;

                let catalog = self.catalog_with_banks()?;
                if evaluation.selected_questions.is_none() {
                    evaluation.selected_questions = Some(selection::select_questions(&catalog));
                }
                evaluation.status = EvaluationStatus::InProgress;
                evaluation.started_at = Some(Utc::now());
                evaluation.access_ip = access_ip;
                evaluation.user_agent = user_agent;
                evaluation.current_instrument = catalog.first().map(|(i, _)| i.kind);
                self.store.update_evaluation(&evaluation)?;

                tracing::info!(evaluation = %evaluation.id, "candidate verified, session started");
                let current = evaluation.current_instrument;
                Ok((evaluation, current))
            }
            _ => Err(Error::Conflict(
                "Evaluation is not awaiting verification".to_string(),
            )),
        }
    }

    fn check_national_id(&self, evaluation: &mut Evaluation, submitted: &str) -> Result<()> {
        let matches: bool = evaluation
            .national_id
            .as_bytes()
            .ct_eq(submitted.trim().as_bytes())
            .into();
        if matches {
            return Ok(());
        }
        evaluation.failed_verifications += 1;
        self.store.update_evaluation(evaluation)?;
        tracing::warn!(
            evaluation = %evaluation.id,
            attempts = evaluation.failed_verifications,
            "identity verification failed"
        );
        Err(Error::Unauthorized(
            "The provided identification number does not match".to_string(),
        ))
    }

    fn catalog_with_banks(&self) -> Result<Vec<(Instrument, Vec<Question>)>> {
        let mut catalog = Vec::new();
        for instrument in self.store.active_instruments()? {
            let bank = self.store.questions_for_instrument(instrument.id)?;
            catalog.push((instrument, bank));
        }
        Ok(catalog)
    }

    /// Opens one instrument page, updating the session's resume pointer and
    /// computing the next-instrument link.
    pub fn open_instrument(&self, token: &str, kind: InstrumentKind) -> Result<InstrumentPage> {
        let mut evaluation = self.answering(token)?;

        let instruments = self.store.active_instruments()?;
        let instrument = instruments
            .iter()
            .find(|i| i.kind == kind)
            .cloned()
            .ok_or_else(|| Error::NotFound("Instrument not found".to_string()))?;

        evaluation.current_instrument = Some(kind);
        self.store.update_evaluation(&evaluation)?;

        let next = instruments
            .iter()
            .find(|i| i.position > instrument.position)
            .map(|i| i.kind);

        let bank = self.store.questions_for_instrument(instrument.id)?;
        let questions: Vec<Question> = match &evaluation.selected_questions {
            Some(ids) => ids
                .iter()
                .filter_map(|id| bank.iter().find(|q| q.id == *id))
                .cloned()
                .collect(),
            None => bank,
        };

        let mut with_options = Vec::with_capacity(questions.len());
        for question in questions {
            let options = self.store.options_for_question(question.id)?;
            with_options.push((question, options));
        }

        Ok(InstrumentPage {
            instrument,
            questions: with_options,
            next,
        })
    }

    // ── Candidate: response capture ───────────────────────────────────

    fn answering(&self, token: &str) -> Result<Evaluation> {
        let evaluation = self.lookup(token)?;
        match evaluation.status {
            EvaluationStatus::InProgress => Ok(evaluation),
            EvaluationStatus::Expired => {
                Err(Error::Expired("The evaluation link has expired".to_string()))
            }
            _ => Err(Error::Conflict(
                "Evaluation is not accepting answers".to_string(),
            )),
        }
    }

    fn selected_question(&self, evaluation: &Evaluation, question_id: Uuid) -> Result<Question> {
        let question = self
            .store
            .question(question_id)?
            .ok_or_else(|| Error::NotFound("Question not found".to_string()))?;
        if let Some(selected) = &evaluation.selected_questions {
            if !selected.contains(&question_id) {
                return Err(Error::BadRequest(
                    "Question is not part of this evaluation".to_string(),
                ));
            }
        }
        Ok(question)
    }

    fn option_for(&self, question: &Question, option_id: Uuid) -> Result<ChoiceOption> {
        let option = self
            .store
            .option(option_id)?
            .ok_or_else(|| Error::NotFound("Option not found".to_string()))?;
        if option.question_id != question.id {
            return Err(Error::BadRequest(
                "Option does not belong to the question".to_string(),
            ));
        }
        Ok(option)
    }

    pub fn save_psychometric(&self, token: &str, req: SubmitPsychometricRequest) -> Result<()> {
        let evaluation = self.answering(token)?;
        let question = self.selected_question(&evaluation, req.question_id)?;

        let max_value = match question.scale {
            ScaleKind::Likert7 => 7,
            _ => 5,
        };
        if !(1..=max_value).contains(&req.value) {
            return Err(Error::BadRequest(format!(
                "Value must be between 1 and {}",
                max_value
            )));
        }
        if let Some(option_id) = req.option_id {
            self.option_for(&question, option_id)?;
        }

        self.store.upsert_psychometric(PsychometricResponse {
            id: Uuid::new_v4(),
            evaluation_id: evaluation.id,
            question_id: question.id,
            value: req.value,
            option_id: req.option_id,
            response_seconds: req.response_seconds,
            answered_at: Utc::now(),
        })?;
        Ok(())
    }

    pub fn save_memory(&self, token: &str, req: SubmitMemoryRequest) -> Result<()> {
        let evaluation = self.answering(token)?;
        let question = self.selected_question(&evaluation, req.question_id)?;

        let key = question.answer_key.clone().ok_or_else(|| {
            Error::BadRequest("Question has no sequence to recall".to_string())
        })?;
        let presented: Vec<i32> = serde_json::from_value(key)?;
        let correct = presented == req.answered;
        let sequence_length = presented.len() as i32;

        self.store.upsert_memory(MemoryResponse {
            id: Uuid::new_v4(),
            evaluation_id: evaluation.id,
            question_id: question.id,
            presented,
            answered: req.answered,
            correct,
            sequence_length,
            response_seconds: req.response_seconds,
            answered_at: Utc::now(),
        })?;
        Ok(())
    }

    pub fn save_matrix(&self, token: &str, req: SubmitMatrixRequest) -> Result<()> {
        let evaluation = self.answering(token)?;
        let question = self.selected_question(&evaluation, req.question_id)?;
        let option = self.option_for(&question, req.option_id)?;

        self.store.upsert_matrix(MatrixResponse {
            id: Uuid::new_v4(),
            evaluation_id: evaluation.id,
            question_id: question.id,
            option_id: Some(option.id),
            correct: option.value == 1,
            response_seconds: req.response_seconds,
            answered_at: Utc::now(),
        })?;
        Ok(())
    }

    pub fn save_situational(&self, token: &str, req: SubmitSituationalRequest) -> Result<()> {
        let evaluation = self.answering(token)?;
        let question = self.selected_question(&evaluation, req.question_id)?;
        let option = self.option_for(&question, req.option_id)?;

        self.store.upsert_situational(SituationalResponse {
            id: Uuid::new_v4(),
            evaluation_id: evaluation.id,
            question_id: question.id,
            option_id: Some(option.id),
            value: option.value,
            justification: req.justification.unwrap_or_default(),
            response_seconds: req.response_seconds,
            answered_at: Utc::now(),
        })?;
        Ok(())
    }

    pub fn save_attention(&self, token: &str, req: SubmitAttentionRequest) -> Result<()> {
        use crate::services::scoring::attention;

        let evaluation = self.answering(token)?;
        let question = self.selected_question(&evaluation, req.question_id)?;

        let subtype = match question.dimension {
            Dimension::DocumentComparison => AttentionSubtype::Comparison,
            Dimension::DataVerification => AttentionSubtype::Verification,
            Dimension::ErrorSequences => AttentionSubtype::Sequence,
            _ => {
                return Err(Error::BadRequest(
                    "Question is not an attention-to-detail item".to_string(),
                ))
            }
        };
        let key = question
            .answer_key
            .as_ref()
            .ok_or_else(|| Error::BadRequest("Question has no answer key".to_string()))?;

        let (correct, partial_score) = match subtype {
            AttentionSubtype::Comparison => {
                let f1 = attention::grade_comparison(&req.answer, key);
                (f1 >= 1.0, f1)
            }
            AttentionSubtype::Verification => {
                let overlap = attention::grade_verification(&req.answer, key);
                (overlap >= 1.0, overlap)
            }
            AttentionSubtype::Sequence => {
                let ok = attention::grade_sequence(&req.answer, key);
                (ok, if ok { 1.0 } else { 0.0 })
            }
        };

        self.store.upsert_attention(AttentionResponse {
            id: Uuid::new_v4(),
            evaluation_id: evaluation.id,
            question_id: question.id,
            subtype,
            answer: req.answer,
            correct,
            partial_score,
            response_seconds: req.response_seconds,
            answered_at: Utc::now(),
        })?;
        Ok(())
    }

    pub fn save_projective(
        &self,
        token: &str,
        kind: InstrumentKind,
        req: SubmitProjectiveRequest,
    ) -> Result<()> {
        let evaluation = self.answering(token)?;
        let instrument = self
            .store
            .instrument_by_kind(kind)?
            .filter(|i| i.active)
            .ok_or_else(|| Error::NotFound("Instrument not found".to_string()))?;
        if !instrument.projective {
            return Err(Error::BadRequest(
                "Instrument does not take projective answers".to_string(),
            ));
        }

        if let Some(question_id) = req.question_id {
            let question = self.selected_question(&evaluation, question_id)?;
            if question.instrument_id != instrument.id {
                return Err(Error::BadRequest(
                    "Question does not belong to the instrument".to_string(),
                ));
            }
        }

        let (canvas_image, text_answer) = match req.kind {
            ProjectiveKind::Drawing => {
                let image = req.canvas_image.unwrap_or_default();
                if image.is_empty() {
                    return Err(Error::BadRequest("Missing canvas image".to_string()));
                }
                let (_, payload) = match image.strip_prefix("data:") {
                    Some(rest) => rest.split_once(',').unwrap_or(("", rest)),
                    None => ("", image.as_str()),
                };
                BASE64
                    .decode(payload)
                    .map_err(|_| Error::BadRequest("Canvas image is not valid base64".to_string()))?;
                (image, String::new())
            }
            ProjectiveKind::Text => {
                let text = req.text_answer.unwrap_or_default();
                if text.trim().is_empty() {
                    return Err(Error::BadRequest("Missing text answer".to_string()));
                }
                (String::new(), text)
            }
        };

        self.store.upsert_projective(ProjectiveResponse {
            id: Uuid::new_v4(),
            evaluation_id: evaluation.id,
            instrument_id: instrument.id,
            question_id: req.question_id,
            kind: req.kind,
            canvas_image,
            stroke_data: req.stroke_data,
            text_answer,
            manual_score: None,
            reviewer_observations: String::new(),
            reviewed: false,
            reviewed_at: None,
            response_seconds: req.response_seconds,
            answered_at: Utc::now(),
        })?;
        Ok(())
    }

    // ── Candidate: finalization ───────────────────────────────────────

    /// Two-phase finalize. Phase 1 (the state transition) always succeeds for
    /// an in-progress session; phase 2 (scoring + verdict) runs isolated and
    /// a failure there is recorded on the evaluation instead of surfacing to
    /// the candidate. Re-finalizing a completed session is a no-op.
    pub fn finalize(&self, token: &str) -> Result<Evaluation> {
        let mut evaluation = self.lookup(token)?;
        match evaluation.status {
            EvaluationStatus::InProgress => {
                evaluation.status = EvaluationStatus::Completed;
                evaluation.finished_at = Some(Utc::now());
                self.store.update_evaluation(&evaluation)?;

                if let Err(err) = self.scoring.recompute(evaluation.id) {
                    tracing::error!(
                        evaluation = %evaluation.id,
                        error = %err,
                        "scoring failed during finalize; completing anyway"
                    );
                    evaluation.scoring_error = Some(err.to_string());
                    if let Err(save_err) = self.store.update_evaluation(&evaluation) {
                        tracing::error!(error = %save_err, "could not record scoring failure");
                    }
                }
                Ok(evaluation)
            }
            EvaluationStatus::Completed | EvaluationStatus::Reviewed => Ok(evaluation),
            EvaluationStatus::Expired => {
                Err(Error::Expired("The evaluation link has expired".to_string()))
            }
            _ => Err(Error::Conflict(
                "Evaluation cannot be finalized".to_string(),
            )),
        }
    }

    // ── Panel: review workflow ────────────────────────────────────────

    pub fn recompute(&self, evaluation_id: Uuid) -> Result<FinalResult> {
        let evaluation = self.get(evaluation_id)?;
        match evaluation.status {
            EvaluationStatus::Completed | EvaluationStatus::Reviewed => {
                self.scoring.recompute(evaluation_id)
            }
            _ => Err(Error::Conflict(
                "Evaluation has not been completed yet".to_string(),
            )),
        }
    }

    /// Records the evaluator's score for one projective answer. When the last
    /// pending projective is reviewed, scores are recomputed and the
    /// evaluation moves to reviewed.
    pub fn review_projective(
        &self,
        evaluation_id: Uuid,
        response_id: Uuid,
        score: i32,
        observations: Option<String>,
    ) -> Result<Evaluation> {
        let mut evaluation = self.get(evaluation_id)?;
        if !matches!(
            evaluation.status,
            EvaluationStatus::Completed | EvaluationStatus::Reviewed
        ) {
            return Err(Error::Conflict(
                "Evaluation has not been completed yet".to_string(),
            ));
        }

        let mut response = self
            .store
            .projective_responses(evaluation_id)?
            .into_iter()
            .find(|r| r.id == response_id)
            .ok_or_else(|| Error::NotFound("Projective response not found".to_string()))?;
        response.manual_score = Some(score);
        response.reviewer_observations = observations.unwrap_or_default();
        response.reviewed = true;
        response.reviewed_at = Some(Utc::now());
        self.store.update_projective(&response)?;

        if self.store.unreviewed_projectives(evaluation_id)?.is_empty() {
            self.scoring.recompute(evaluation_id)?;
            if evaluation.status == EvaluationStatus::Completed {
                evaluation.status = EvaluationStatus::Reviewed;
                self.store.update_evaluation(&evaluation)?;
            }
        }
        Ok(evaluation)
    }

    /// Records the evaluator's manual verdict; the resolved final verdict is
    /// the manual one from here on.
    pub fn set_manual_verdict(
        &self,
        evaluation_id: Uuid,
        verdict: Verdict,
        observations: Option<String>,
    ) -> Result<FinalResult> {
        let mut evaluation = self.get(evaluation_id)?;
        if !matches!(
            evaluation.status,
            EvaluationStatus::Completed | EvaluationStatus::Reviewed
        ) {
            return Err(Error::Conflict(
                "Evaluation has not been completed yet".to_string(),
            ));
        }

        let mut result = self.store.result(evaluation_id)?.ok_or_else(|| {
            Error::Conflict("Scores have not been computed yet".to_string())
        })?;
        result.manual_verdict = Some(verdict);
        result.final_verdict = verdict;
        if let Some(observations) = observations {
            result.observations = observations;
        }
        self.store.save_result(result.clone())?;

        if evaluation.status == EvaluationStatus::Completed {
            evaluation.status = EvaluationStatus::Reviewed;
            self.store.update_evaluation(&evaluation)?;
        }
        Ok(result)
    }
}
