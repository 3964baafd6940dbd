//! In-memory reference backend over `RwLock`ed maps.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

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

use super::{EvaluationStore, StoreError, StoreResult};

#[derive(Default)]
struct Inner {
    profiles: HashMap<Uuid, TargetProfile>,
    instruments: HashMap<Uuid, Instrument>,
    questions: HashMap<Uuid, Question>,
    options: HashMap<Uuid, ChoiceOption>,
    evaluations: HashMap<Uuid, Evaluation>,
    tokens: HashMap<String, Uuid>,
    psychometric: HashMap<Uuid, Vec<PsychometricResponse>>,
    memory: HashMap<Uuid, Vec<MemoryResponse>>,
    matrices: HashMap<Uuid, Vec<MatrixResponse>>,
    situational: HashMap<Uuid, Vec<SituationalResponse>>,
    attention: HashMap<Uuid, Vec<AttentionResponse>>,
    projective: HashMap<Uuid, Vec<ProjectiveResponse>>,
    results: HashMap<Uuid, FinalResult>,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Inner>> {
        self.inner.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Inner>> {
        self.inner.write().map_err(|_| StoreError::Poisoned)
    }
}

fn sorted_by_position<T>(mut items: Vec<T>, position: impl Fn(&T) -> i32) -> Vec<T> {
    items.sort_by_key(position);
    items
}

impl EvaluationStore for MemoryStore {
    fn insert_profile(&self, profile: TargetProfile) -> StoreResult<()> {
        self.write()?.profiles.insert(profile.id, profile);
        Ok(())
    }

    fn profile(&self, id: Uuid) -> StoreResult<Option<TargetProfile>> {
        Ok(self.read()?.profiles.get(&id).cloned())
    }

    fn profiles(&self) -> StoreResult<Vec<TargetProfile>> {
        let mut profiles: Vec<_> = self.read()?.profiles.values().cloned().collect();
        profiles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(profiles)
    }

    fn insert_instrument(&self, instrument: Instrument) -> StoreResult<()> {
        self.write()?.instruments.insert(instrument.id, instrument);
        Ok(())
    }

    fn instrument(&self, id: Uuid) -> StoreResult<Option<Instrument>> {
        Ok(self.read()?.instruments.get(&id).cloned())
    }

    fn instrument_by_kind(&self, kind: InstrumentKind) -> StoreResult<Option<Instrument>> {
        Ok(self
            .read()?
            .instruments
            .values()
            .find(|i| i.kind == kind)
            .cloned())
    }

    fn instruments(&self) -> StoreResult<Vec<Instrument>> {
        let items: Vec<_> = self.read()?.instruments.values().cloned().collect();
        Ok(sorted_by_position(items, |i| i.position))
    }

    fn active_instruments(&self) -> StoreResult<Vec<Instrument>> {
        let items: Vec<_> = self
            .read()?
            .instruments
            .values()
            .filter(|i| i.active)
            .cloned()
            .collect();
        Ok(sorted_by_position(items, |i| i.position))
    }

    fn insert_question(&self, question: Question) -> StoreResult<()> {
        self.write()?.questions.insert(question.id, question);
        Ok(())
    }

    fn question(&self, id: Uuid) -> StoreResult<Option<Question>> {
        Ok(self.read()?.questions.get(&id).cloned())
    }

    fn questions_for_instrument(&self, instrument_id: Uuid) -> StoreResult<Vec<Question>> {
        let items: Vec<_> = self
            .read()?
            .questions
            .values()
            .filter(|q| q.instrument_id == instrument_id)
            .cloned()
            .collect();
        Ok(sorted_by_position(items, |q| q.position))
    }

    fn insert_option(&self, option: ChoiceOption) -> StoreResult<()> {
        self.write()?.options.insert(option.id, option);
        Ok(())
    }

    fn option(&self, id: Uuid) -> StoreResult<Option<ChoiceOption>> {
        Ok(self.read()?.options.get(&id).cloned())
    }

    fn options_for_question(&self, question_id: Uuid) -> StoreResult<Vec<ChoiceOption>> {
        let items: Vec<_> = self
            .read()?
            .options
            .values()
            .filter(|o| o.question_id == question_id)
            .cloned()
            .collect();
        Ok(sorted_by_position(items, |o| o.position))
    }

    fn insert_evaluation(&self, evaluation: Evaluation) -> StoreResult<()> {
        let mut inner = self.write()?;
        inner.tokens.insert(evaluation.token.clone(), evaluation.id);
        inner.evaluations.insert(evaluation.id, evaluation);
        Ok(())
    }

    fn evaluation(&self, id: Uuid) -> StoreResult<Option<Evaluation>> {
        Ok(self.read()?.evaluations.get(&id).cloned())
    }

    fn evaluation_by_token(&self, token: &str) -> StoreResult<Option<Evaluation>> {
        let inner = self.read()?;
        Ok(inner
            .tokens
            .get(token)
            .and_then(|id| inner.evaluations.get(id))
            .cloned())
    }

    fn update_evaluation(&self, evaluation: &Evaluation) -> StoreResult<()> {
        let mut inner = self.write()?;
        if !inner.evaluations.contains_key(&evaluation.id) {
            return Err(StoreError::NotFound("evaluation".to_string()));
        }
        inner.evaluations.insert(evaluation.id, evaluation.clone());
        Ok(())
    }

    fn evaluations(&self) -> StoreResult<Vec<Evaluation>> {
        let mut items: Vec<_> = self.read()?.evaluations.values().cloned().collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    fn delete_evaluation(&self, id: Uuid) -> StoreResult<()> {
        let mut inner = self.write()?;
        let evaluation = inner
            .evaluations
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound("evaluation".to_string()))?;
        inner.tokens.remove(&evaluation.token);
        inner.psychometric.remove(&id);
        inner.memory.remove(&id);
        inner.matrices.remove(&id);
        inner.situational.remove(&id);
        inner.attention.remove(&id);
        inner.projective.remove(&id);
        inner.results.remove(&id);
        Ok(())
    }

    fn upsert_psychometric(&self, response: PsychometricResponse) -> StoreResult<()> {
        let mut inner = self.write()?;
        let rows = inner.psychometric.entry(response.evaluation_id).or_default();
        rows.retain(|r| r.question_id != response.question_id);
        rows.push(response);
        Ok(())
    }

    fn psychometric_responses(&self, evaluation_id: Uuid) -> StoreResult<Vec<PsychometricResponse>> {
        Ok(self
            .read()?
            .psychometric
            .get(&evaluation_id)
            .cloned()
            .unwrap_or_default())
    }

    fn upsert_memory(&self, response: MemoryResponse) -> StoreResult<()> {
        let mut inner = self.write()?;
        let rows = inner.memory.entry(response.evaluation_id).or_default();
        rows.retain(|r| r.question_id != response.question_id);
        rows.push(response);
        Ok(())
    }

    fn memory_responses(&self, evaluation_id: Uuid) -> StoreResult<Vec<MemoryResponse>> {
        Ok(self
            .read()?
            .memory
            .get(&evaluation_id)
            .cloned()
            .unwrap_or_default())
    }

    fn upsert_matrix(&self, response: MatrixResponse) -> StoreResult<()> {
        let mut inner = self.write()?;
        let rows = inner.matrices.entry(response.evaluation_id).or_default();
        rows.retain(|r| r.question_id != response.question_id);
        rows.push(response);
        Ok(())
    }

    fn matrix_responses(&self, evaluation_id: Uuid) -> StoreResult<Vec<MatrixResponse>> {
        Ok(self
            .read()?
            .matrices
            .get(&evaluation_id)
            .cloned()
            .unwrap_or_default())
    }

    fn upsert_situational(&self, response: SituationalResponse) -> StoreResult<()> {
        let mut inner = self.write()?;
        let rows = inner.situational.entry(response.evaluation_id).or_default();
        rows.retain(|r| r.question_id != response.question_id);
        rows.push(response);
        Ok(())
    }

    fn situational_responses(&self, evaluation_id: Uuid) -> StoreResult<Vec<SituationalResponse>> {
        Ok(self
            .read()?
            .situational
            .get(&evaluation_id)
            .cloned()
            .unwrap_or_default())
    }

    fn upsert_attention(&self, response: AttentionResponse) -> StoreResult<()> {
        let mut inner = self.write()?;
        let rows = inner.attention.entry(response.evaluation_id).or_default();
        rows.retain(|r| r.question_id != response.question_id);
        rows.push(response);
        Ok(())
    }

    fn attention_responses(&self, evaluation_id: Uuid) -> StoreResult<Vec<AttentionResponse>> {
        Ok(self
            .read()?
            .attention
            .get(&evaluation_id)
            .cloned()
            .unwrap_or_default())
    }

    fn upsert_projective(&self, response: ProjectiveResponse) -> StoreResult<()> {
        let mut inner = self.write()?;
        let rows = inner.projective.entry(response.evaluation_id).or_default();
        rows.retain(|r| {
            !(r.instrument_id == response.instrument_id && r.question_id == response.question_id)
        });
        rows.push(response);
        Ok(())
    }

    fn projective_responses(&self, evaluation_id: Uuid) -> StoreResult<Vec<ProjectiveResponse>> {
        Ok(self
            .read()?
            .projective
            .get(&evaluation_id)
            .cloned()
            .unwrap_or_default())
    }

    fn update_projective(&self, response: &ProjectiveResponse) -> StoreResult<()> {
        let mut inner = self.write()?;
        let rows = inner
            .projective
            .get_mut(&response.evaluation_id)
            .ok_or_else(|| StoreError::NotFound("projective response".to_string()))?;
        let row = rows
            .iter_mut()
            .find(|r| r.id == response.id)
            .ok_or_else(|| StoreError::NotFound("projective response".to_string()))?;
        *row = response.clone();
        Ok(())
    }

    fn unreviewed_projectives(&self, evaluation_id: Uuid) -> StoreResult<Vec<ProjectiveResponse>> {
        Ok(self
            .read()?
            .projective
            .get(&evaluation_id)
            .map(|rows| rows.iter().filter(|r| !r.reviewed).cloned().collect())
            .unwrap_or_default())
    }

    fn result(&self, evaluation_id: Uuid) -> StoreResult<Option<FinalResult>> {
        Ok(self.read()?.results.get(&evaluation_id).cloned())
    }

    fn save_result(&self, result: FinalResult) -> StoreResult<()> {
        self.write()?.results.insert(result.evaluation_id, result);
        Ok(())
    }
}
