//! Scoring engine: pure per-instrument scoring functions plus the
//! orchestrator that assembles a `FinalResult` from captured responses.

pub mod attention;
pub mod likert;
pub mod matrices;
pub mod memory;
pub mod reliability;
pub mod situational;
pub mod verdict;

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::models::instrument::InstrumentKind;
use crate::models::question::Question;
use crate::models::result::{FinalResult, Verdict};
use crate::store::EvaluationStore;

use attention::AttentionAnswer;
use likert::LikertAnswer;
use reliability::PairedAnswer;
use situational::SituationalAnswer;

// Composite-index weights. Percent scores are rescaled to the 0-5 band by
// dividing by 20 before blending.
const RESP_LIKERT_W: f64 = 0.40;
const RESP_SITUATIONAL_W: f64 = 0.25;
const RESP_MEMORY_W: f64 = 0.15;
const RESP_ATTENTION_W: f64 = 0.20;
const LOYALTY_COMMITMENT_W: f64 = 0.60;
const LOYALTY_RESPONSIBILITY_W: f64 = 0.20;
const LOYALTY_OBEDIENCE_W: f64 = 0.20;
const OBED_LIKERT_W: f64 = 0.60;
const OBED_SITUATIONAL_W: f64 = 0.40;

const PCT_TO_SCALE: f64 = 20.0;

#[derive(Clone)]
pub struct ScoringService {
    store: Arc<dyn EvaluationStore>,
    /// Profile applied when the evaluation references none. Explicit
    /// configuration, resolved at verdict time.
    default_profile_id: Option<Uuid>,
}

impl ScoringService {
    pub fn new(store: Arc<dyn EvaluationStore>, default_profile_id: Option<Uuid>) -> Self {
        Self {
            store,
            default_profile_id,
        }
    }

    /// Recomputes every score of an evaluation and updates its single
    /// `FinalResult` row in place. Safe to re-run at any time; a repeated run
    /// over unchanged responses produces identical values.
    pub fn recompute(&self, evaluation_id: Uuid) -> Result<FinalResult> {
        let mut evaluation = self
            .store
            .evaluation(evaluation_id)?
            .ok_or_else(|| Error::NotFound("Evaluation not found".to_string()))?;

        let now = Utc::now();
        let mut result = self
            .store
            .result(evaluation_id)?
            .unwrap_or_else(|| FinalResult::new(evaluation_id, now));

        let mut kind_of_instrument: HashMap<Uuid, InstrumentKind> = HashMap::new();
        let mut questions: HashMap<Uuid, Question> = HashMap::new();
        for instrument in self.store.instruments()? {
            for question in self.store.questions_for_instrument(instrument.id)? {
                questions.insert(question.id, question);
            }
            kind_of_instrument.insert(instrument.id, instrument.kind);
        }

        // Likert-family instruments plus the paired-answer view used by the
        // consistency index.
        let mut big_five_answers = Vec::new();
        let mut commitment_answers = Vec::new();
        let mut obedience_answers = Vec::new();
        let mut desirability_answers = Vec::new();
        let mut paired_answers = Vec::new();

        for response in self.store.psychometric_responses(evaluation_id)? {
            let Some(question) = questions.get(&response.question_id) else {
                continue;
            };
            let Some(kind) = kind_of_instrument.get(&question.instrument_id) else {
                continue;
            };
            let answer = LikertAnswer {
                dimension: question.dimension,
                value: response.value,
                reversed: question.reversed,
            };
            paired_answers.push(PairedAnswer {
                question_id: question.id,
                pair_id: question.consistency_pair,
                adjusted_value: likert::adjusted(response.value, question.reversed),
            });
            match kind {
                InstrumentKind::BigFive => big_five_answers.push(answer),
                InstrumentKind::Commitment => commitment_answers.push(answer),
                InstrumentKind::Obedience => obedience_answers.push(answer),
                InstrumentKind::SocialDesirability => desirability_answers.push(answer),
                _ => {}
            }
        }

        // Reliability first: it can override everything downstream.
        result.social_desirability = likert::overall_mean(&desirability_answers);
        result.consistency_pct = reliability::consistency_index(&paired_answers);
        result.reliable =
            reliability::is_reliable(result.social_desirability, result.consistency_pct);

        let big_five = likert::big_five(&big_five_answers);
        result.responsibility = big_five.responsibility;
        result.agreeableness = big_five.agreeableness;
        result.neuroticism = big_five.neuroticism;
        result.openness = big_five.openness;
        result.extraversion = big_five.extraversion;

        let commitment = likert::commitment(&commitment_answers);
        result.commitment_affective = commitment.affective;
        result.commitment_continuance = commitment.continuance;
        result.commitment_normative = commitment.normative;
        result.commitment_total = commitment.total;

        result.obedience = likert::overall_mean(&obedience_answers);

        let memory_results: Vec<(bool, i32)> = self
            .store
            .memory_responses(evaluation_id)?
            .iter()
            .map(|r| (r.correct, r.sequence_length))
            .collect();
        let memory_score = memory::score(&memory_results);
        result.memory_pct = memory_score.pct;
        result.memory_max_span = memory_score.max_span;

        // Matrices are weighted by difficulty, so keep bank order.
        let mut matrix_responses = self.store.matrix_responses(evaluation_id)?;
        matrix_responses.sort_by_key(|r| {
            questions
                .get(&r.question_id)
                .map(|q| q.position)
                .unwrap_or(i32::MAX)
        });
        let matrix_flags: Vec<bool> = matrix_responses.iter().map(|r| r.correct).collect();
        result.matrices_pct = matrices::score(&matrix_flags);

        let situational_answers: Vec<SituationalAnswer> = self
            .store
            .situational_responses(evaluation_id)?
            .iter()
            .filter_map(|r| {
                questions.get(&r.question_id).map(|q| SituationalAnswer {
                    dimension: q.dimension,
                    value: r.value,
                })
            })
            .collect();
        result.situational_pct = situational::score(&situational_answers).total_pct;

        let attention_answers: Vec<AttentionAnswer> = self
            .store
            .attention_responses(evaluation_id)?
            .iter()
            .map(|r| AttentionAnswer {
                subtype: r.subtype,
                correct: r.correct,
                partial_score: r.partial_score,
            })
            .collect();
        let attention_score = attention::score(&attention_answers);
        result.attention_pct = attention_score.composite_pct;
        result.attention_comparison_pct = attention_score.comparison_pct;
        result.attention_verification_pct = attention_score.verification_pct;
        result.attention_sequences_pct = attention_score.sequences_pct;

        // Projective scores come from completed evaluator reviews.
        let projectives = self.store.projective_responses(evaluation_id)?;
        let mean_manual = |kind: InstrumentKind| -> Option<f64> {
            let scores: Vec<f64> = projectives
                .iter()
                .filter(|r| {
                    r.reviewed && kind_of_instrument.get(&r.instrument_id) == Some(&kind)
                })
                .filter_map(|r| r.manual_score.map(f64::from))
                .collect();
            if scores.is_empty() {
                None
            } else {
                Some(scores.iter().sum::<f64>() / scores.len() as f64)
            }
        };
        result.tree_score = mean_manual(InstrumentKind::TreeDrawing);
        result.person_in_rain_score = mean_manual(InstrumentKind::PersonInRain);
        result.phrases_score = mean_manual(InstrumentKind::IncompleteSentences);
        result.colors_interpretation = projectives
            .iter()
            .find(|r| {
                r.reviewed
                    && kind_of_instrument.get(&r.instrument_id)
                        == Some(&InstrumentKind::ColorPreference)
            })
            .map(|r| {
                json!({
                    "score": r.manual_score,
                    "interpretation": r.reviewer_observations,
                })
            });

        result.responsibility_index = result.responsibility * RESP_LIKERT_W
            + result.situational_pct / PCT_TO_SCALE * RESP_SITUATIONAL_W
            + result.memory_pct / PCT_TO_SCALE * RESP_MEMORY_W
            + result.attention_pct / PCT_TO_SCALE * RESP_ATTENTION_W;
        result.loyalty_index = result.commitment_total * LOYALTY_COMMITMENT_W
            + result.responsibility * LOYALTY_RESPONSIBILITY_W
            + result.obedience * LOYALTY_OBEDIENCE_W;
        result.obedience_index = result.obedience * OBED_LIKERT_W
            + result.situational_pct / PCT_TO_SCALE * OBED_SITUATIONAL_W;

        let profile_id = evaluation.profile_id.or(self.default_profile_id);
        let profile = match profile_id {
            Some(id) => self.store.profile(id)?,
            None => None,
        };
        let pending_projectives = !self.store.unreviewed_projectives(evaluation_id)?.is_empty();
        result.automatic_verdict = match profile {
            Some(profile) => verdict::decide(&result, &profile, pending_projectives),
            None => Verdict::Revision,
        };
        result.final_verdict = result.manual_verdict.unwrap_or(result.automatic_verdict);
        result.computed_at = now;

        self.store.save_result(result.clone())?;

        if evaluation.scoring_error.is_some() {
            evaluation.scoring_error = None;
            self.store.update_evaluation(&evaluation)?;
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::models::evaluation::{Evaluation, EvaluationStatus};
    use crate::models::instrument::Instrument;
    use crate::models::profile::TargetProfile;
    use crate::models::question::{Dimension, ScaleKind};
    use crate::models::response::{
        MemoryResponse, ProjectiveKind, ProjectiveResponse, PsychometricResponse,
    };
    use crate::store::memory::MemoryStore;

    struct Fixture {
        store: Arc<MemoryStore>,
        evaluation_id: Uuid,
        profile_id: Uuid,
    }

    fn instrument(kind: InstrumentKind, position: i32) -> Instrument {
        Instrument {
            id: Uuid::new_v4(),
            kind,
            name: kind.display_name().to_string(),
            instructions: String::new(),
            position,
            active: true,
            projective: matches!(
                kind,
                InstrumentKind::TreeDrawing
                    | InstrumentKind::PersonInRain
                    | InstrumentKind::IncompleteSentences
                    | InstrumentKind::ColorPreference
            ),
            bank_size: 0,
            items_to_apply: 0,
            time_limit_minutes: None,
        }
    }

    fn likert_question(instrument_id: Uuid, dimension: Dimension, position: i32) -> Question {
        Question {
            id: Uuid::new_v4(),
            instrument_id,
            text: format!("q{}", position),
            scale: ScaleKind::Likert5,
            dimension,
            reversed: false,
            position,
            consistency_pair: None,
            answer_key: None,
        }
    }

    fn setup() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let profile = TargetProfile::standard("Test");
        let profile_id = profile.id;
        store.insert_profile(profile).unwrap();

        let evaluation = Evaluation {
            id: Uuid::new_v4(),
            token: "scoring-test".to_string(),
            full_name: "Test".to_string(),
            national_id: "111".to_string(),
            email: "t@t.com".to_string(),
            phone: None,
            applied_position: None,
            profile_id: Some(profile_id),
            status: EvaluationStatus::Completed,
            created_at: Utc::now(),
            expires_at: Utc::now() + chrono::Duration::hours(48),
            started_at: Some(Utc::now()),
            finished_at: Some(Utc::now()),
            current_instrument: None,
            selected_questions: None,
            access_ip: None,
            user_agent: None,
            evaluator_notes: String::new(),
            failed_verifications: 0,
            scoring_error: None,
        };
        let evaluation_id = evaluation.id;
        store.insert_evaluation(evaluation).unwrap();

        Fixture {
            store,
            evaluation_id,
            profile_id,
        }
    }

    fn answer_likert(fixture: &Fixture, question: &Question, value: i32) {
        fixture
            .store
            .upsert_psychometric(PsychometricResponse {
                id: Uuid::new_v4(),
                evaluation_id: fixture.evaluation_id,
                question_id: question.id,
                value,
                option_id: None,
                response_seconds: None,
                answered_at: Utc::now(),
            })
            .unwrap();
    }

    fn seed_likert_bank(fixture: &Fixture, kind: InstrumentKind, items: &[(Dimension, i32)]) {
        let inst = instrument(kind, 1);
        let inst_id = inst.id;
        fixture.store.insert_instrument(inst).unwrap();
        for (i, (dimension, value)) in items.iter().enumerate() {
            let question = likert_question(inst_id, *dimension, i as i32 + 1);
            fixture.store.insert_question(question.clone()).unwrap();
            answer_likert(fixture, &question, *value);
        }
    }

    #[test]
    fn empty_evaluation_scores_zero_without_errors() {
        let fixture = setup();
        let service = ScoringService::new(fixture.store.clone(), None);
        let result = service.recompute(fixture.evaluation_id).unwrap();

        assert_eq!(result.responsibility, 0.0);
        assert_eq!(result.memory_pct, 0.0);
        assert_eq!(result.consistency_pct, None);
        assert!(result.reliable);
        // All thresholds fail, so the failure-count method yields NO_APTO.
        assert_eq!(result.automatic_verdict, Verdict::NoApto);
    }

    #[test]
    fn no_profile_resolvable_means_revision() {
        let fixture = setup();
        let mut evaluation = fixture.store.evaluation(fixture.evaluation_id).unwrap().unwrap();
        evaluation.profile_id = None;
        fixture.store.update_evaluation(&evaluation).unwrap();

        let service = ScoringService::new(fixture.store.clone(), None);
        let result = service.recompute(fixture.evaluation_id).unwrap();
        assert_eq!(result.automatic_verdict, Verdict::Revision);
    }

    #[test]
    fn default_profile_applies_when_evaluation_has_none() {
        let fixture = setup();
        let mut evaluation = fixture.store.evaluation(fixture.evaluation_id).unwrap().unwrap();
        evaluation.profile_id = None;
        fixture.store.update_evaluation(&evaluation).unwrap();

        let service = ScoringService::new(fixture.store.clone(), Some(fixture.profile_id));
        let result = service.recompute(fixture.evaluation_id).unwrap();
        // With a resolvable profile the empty evaluation is graded, not parked.
        assert_eq!(result.automatic_verdict, Verdict::NoApto);
    }

    #[test]
    fn recompute_is_idempotent() {
        let fixture = setup();
        seed_likert_bank(
            &fixture,
            InstrumentKind::BigFive,
            &[(Dimension::Responsibility, 4), (Dimension::Neuroticism, 2)],
        );
        fixture
            .store
            .upsert_memory(MemoryResponse {
                id: Uuid::new_v4(),
                evaluation_id: fixture.evaluation_id,
                question_id: Uuid::new_v4(),
                presented: vec![1, 2, 3],
                answered: vec![1, 2, 3],
                correct: true,
                sequence_length: 3,
                response_seconds: None,
                answered_at: Utc::now(),
            })
            .unwrap();

        let service = ScoringService::new(fixture.store.clone(), None);
        let first = service.recompute(fixture.evaluation_id).unwrap();
        let second = service.recompute(fixture.evaluation_id).unwrap();

        assert_eq!(first.responsibility, second.responsibility);
        assert_eq!(first.memory_pct, second.memory_pct);
        assert_eq!(first.automatic_verdict, second.automatic_verdict);
        // Still a single row, updated in place.
        assert!(fixture.store.result(fixture.evaluation_id).unwrap().is_some());
    }

    #[test]
    fn high_social_desirability_forces_revision() {
        let fixture = setup();
        seed_likert_bank(
            &fixture,
            InstrumentKind::SocialDesirability,
            &[
                (Dimension::SocialDesirability, 5),
                (Dimension::SocialDesirability, 5),
                (Dimension::SocialDesirability, 5),
            ],
        );
        // Otherwise perfect scores.
        seed_likert_bank(
            &fixture,
            InstrumentKind::BigFive,
            &[
                (Dimension::Responsibility, 5),
                (Dimension::Agreeableness, 5),
                (Dimension::Neuroticism, 1),
                (Dimension::Openness, 5),
                (Dimension::Extraversion, 5),
            ],
        );

        let service = ScoringService::new(fixture.store.clone(), None);
        let result = service.recompute(fixture.evaluation_id).unwrap();

        assert_eq!(result.social_desirability, 5.0);
        assert!(!result.reliable);
        assert_eq!(result.automatic_verdict, Verdict::Revision);
    }

    #[test]
    fn composite_indices_blend_per_weights() {
        let fixture = setup();
        seed_likert_bank(
            &fixture,
            InstrumentKind::BigFive,
            &[(Dimension::Responsibility, 4)],
        );
        seed_likert_bank(
            &fixture,
            InstrumentKind::Obedience,
            &[(Dimension::Discipline, 4)],
        );
        seed_likert_bank(
            &fixture,
            InstrumentKind::Commitment,
            &[
                (Dimension::AffectiveCommitment, 4),
                (Dimension::NormativeCommitment, 4),
            ],
        );

        let service = ScoringService::new(fixture.store.clone(), None);
        let result = service.recompute(fixture.evaluation_id).unwrap();

        // situational/memory/attention are 0, so only the Likert terms remain.
        assert!((result.responsibility_index - 4.0 * 0.40).abs() < 1e-9);
        assert!((result.loyalty_index - (4.0 * 0.60 + 4.0 * 0.20 + 4.0 * 0.20)).abs() < 1e-9);
        assert!((result.obedience_index - 4.0 * 0.60).abs() < 1e-9);
    }

    #[test]
    fn pending_projective_blocks_apto_and_review_resolves_it() {
        let fixture = setup();
        // Perfect scores across the six graded checks.
        seed_likert_bank(
            &fixture,
            InstrumentKind::BigFive,
            &[
                (Dimension::Responsibility, 5),
                (Dimension::Agreeableness, 5),
                (Dimension::Neuroticism, 1),
                (Dimension::Openness, 5),
                (Dimension::Extraversion, 5),
            ],
        );
        seed_likert_bank(
            &fixture,
            InstrumentKind::Commitment,
            &[
                (Dimension::AffectiveCommitment, 5),
                (Dimension::NormativeCommitment, 5),
            ],
        );
        seed_likert_bank(
            &fixture,
            InstrumentKind::Obedience,
            &[(Dimension::Discipline, 5)],
        );
        let memory_inst = instrument(InstrumentKind::WorkingMemory, 4);
        fixture.store.insert_instrument(memory_inst).unwrap();
        fixture
            .store
            .upsert_memory(MemoryResponse {
                id: Uuid::new_v4(),
                evaluation_id: fixture.evaluation_id,
                question_id: Uuid::new_v4(),
                presented: vec![1, 2, 3],
                answered: vec![1, 2, 3],
                correct: true,
                sequence_length: 3,
                response_seconds: None,
                answered_at: Utc::now(),
            })
            .unwrap();
        let matrices_inst = instrument(InstrumentKind::Matrices, 5);
        let matrices_id = matrices_inst.id;
        fixture.store.insert_instrument(matrices_inst).unwrap();
        let matrix_question = likert_question(matrices_id, Dimension::General, 1);
        fixture.store.insert_question(matrix_question.clone()).unwrap();
        fixture
            .store
            .upsert_matrix(crate::models::response::MatrixResponse {
                id: Uuid::new_v4(),
                evaluation_id: fixture.evaluation_id,
                question_id: matrix_question.id,
                option_id: None,
                correct: true,
                response_seconds: None,
                answered_at: Utc::now(),
            })
            .unwrap();

        let tree = instrument(InstrumentKind::TreeDrawing, 9);
        let tree_id = tree.id;
        fixture.store.insert_instrument(tree).unwrap();
        let projective = ProjectiveResponse {
            id: Uuid::new_v4(),
            evaluation_id: fixture.evaluation_id,
            instrument_id: tree_id,
            question_id: None,
            kind: ProjectiveKind::Drawing,
            canvas_image: "aGVsbG8=".to_string(),
            stroke_data: None,
            text_answer: String::new(),
            manual_score: None,
            reviewer_observations: String::new(),
            reviewed: false,
            reviewed_at: None,
            response_seconds: None,
            answered_at: Utc::now(),
        };
        fixture.store.upsert_projective(projective.clone()).unwrap();

        let service = ScoringService::new(fixture.store.clone(), None);
        let result = service.recompute(fixture.evaluation_id).unwrap();
        assert_eq!(result.automatic_verdict, Verdict::Revision);

        let mut reviewed = projective;
        reviewed.manual_score = Some(8);
        reviewed.reviewed = true;
        reviewed.reviewed_at = Some(Utc::now());
        fixture.store.update_projective(&reviewed).unwrap();

        let result = service.recompute(fixture.evaluation_id).unwrap();
        assert_eq!(result.automatic_verdict, Verdict::Apto);
        assert_eq!(result.tree_score, Some(8.0));
    }

    #[test]
    fn manual_verdict_overrides_final() {
        let fixture = setup();
        let service = ScoringService::new(fixture.store.clone(), None);
        let mut result = service.recompute(fixture.evaluation_id).unwrap();

        result.manual_verdict = Some(Verdict::Apto);
        fixture.store.save_result(result).unwrap();

        let recomputed = service.recompute(fixture.evaluation_id).unwrap();
        assert_eq!(recomputed.automatic_verdict, Verdict::NoApto);
        assert_eq!(recomputed.final_verdict, Verdict::Apto);
    }
}
