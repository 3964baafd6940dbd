//! Seedable demo catalog for the reference store, used by local runs and the
//! test suite.

use serde_json::json;
use uuid::Uuid;

use crate::models::instrument::{Instrument, InstrumentKind};
use crate::models::profile::TargetProfile;
use crate::models::question::{ChoiceOption, Dimension, Question, ScaleKind};

use super::{EvaluationStore, StoreResult};

fn instrument(
    kind: InstrumentKind,
    position: i32,
    projective: bool,
    bank_size: i32,
    items_to_apply: i32,
) -> Instrument {
    Instrument {
        id: Uuid::new_v4(),
        kind,
        name: kind.display_name().to_string(),
        instructions: format!("Read each item carefully and answer honestly. ({})", kind.as_str()),
        position,
        active: true,
        projective,
        bank_size,
        items_to_apply,
        time_limit_minutes: None,
    }
}

fn likert(instrument_id: Uuid, text: &str, dimension: Dimension, reversed: bool, position: i32) -> Question {
    Question {
        id: Uuid::new_v4(),
        instrument_id,
        text: text.to_string(),
        scale: ScaleKind::Likert5,
        dimension,
        reversed,
        position,
        consistency_pair: None,
        answer_key: None,
    }
}

/// Populates the store with the full instrument catalog, a small question bank
/// per instrument, and one active standard profile. Returns the profile id.
pub fn seed_demo_catalog(store: &dyn EvaluationStore) -> StoreResult<Uuid> {
    let profile = TargetProfile::standard("Standard profile");
    let profile_id = profile.id;
    store.insert_profile(profile)?;

    // Big Five: two items per dimension plus one consistency pair, selector
    // applies 8 of the 12.
    let big_five = instrument(InstrumentKind::BigFive, 1, false, 12, 8);
    let bf_id = big_five.id;
    store.insert_instrument(big_five)?;
    let bf_items: [(&str, Dimension, bool); 10] = [
        ("I complete the tasks I am given on time", Dimension::Responsibility, false),
        ("I often leave work half done", Dimension::Responsibility, true),
        ("I get along well with my coworkers", Dimension::Agreeableness, false),
        ("People find it hard to work with me", Dimension::Agreeableness, true),
        ("I stay calm under pressure", Dimension::Neuroticism, true),
        ("I worry about things that may go wrong", Dimension::Neuroticism, false),
        ("I enjoy learning new ways of doing my job", Dimension::Openness, false),
        ("I prefer routines that never change", Dimension::Openness, true),
        ("I feel comfortable speaking in front of others", Dimension::Extraversion, false),
        ("I prefer to work alone in silence", Dimension::Extraversion, true),
    ];
    let mut position = 1;
    for (text, dimension, reversed) in bf_items {
        store.insert_question(likert(bf_id, text, dimension, reversed, position))?;
        position += 1;
    }
    let mut pair_a = likert(bf_id, "I double-check my work before handing it in", Dimension::Responsibility, false, position);
    let mut pair_b = likert(bf_id, "Before delivering a task I review it carefully", Dimension::Responsibility, false, position + 1);
    pair_a.consistency_pair = Some(pair_b.id);
    pair_b.consistency_pair = Some(pair_a.id);
    store.insert_question(pair_a)?;
    store.insert_question(pair_b)?;

    // Commitment: one item per Allen & Meyer subdimension.
    let commitment = instrument(InstrumentKind::Commitment, 2, false, 3, 0);
    let co_id = commitment.id;
    store.insert_instrument(commitment)?;
    store.insert_question(likert(co_id, "I would be happy to spend the rest of my career in this organization", Dimension::AffectiveCommitment, false, 1))?;
    store.insert_question(likert(co_id, "Leaving this organization now would disrupt my life", Dimension::ContinuanceCommitment, false, 2))?;
    store.insert_question(likert(co_id, "I owe a great deal to my organization", Dimension::NormativeCommitment, false, 3))?;

    // Obedience.
    let obedience = instrument(InstrumentKind::Obedience, 3, false, 3, 0);
    let ob_id = obedience.id;
    store.insert_instrument(obedience)?;
    store.insert_question(likert(ob_id, "I follow my supervisor's instructions even when I disagree", Dimension::Discipline, false, 1))?;
    store.insert_question(likert(ob_id, "Rules exist to be questioned", Dimension::NormConformity, true, 2))?;
    store.insert_question(likert(ob_id, "Authority figures usually know best", Dimension::AuthorityOrientation, false, 3))?;

    // Working memory: server-side sequences in the answer key.
    let memory = instrument(InstrumentKind::WorkingMemory, 4, false, 3, 0);
    let mem_id = memory.id;
    store.insert_instrument(memory)?;
    for (i, seq) in [json!([3, 7, 2]), json!([1, 4, 2, 8]), json!([5, 9, 1, 4, 7])]
        .into_iter()
        .enumerate()
    {
        store.insert_question(Question {
            id: Uuid::new_v4(),
            instrument_id: mem_id,
            text: format!("Memorize and reproduce sequence {}", i + 1),
            scale: ScaleKind::Sequence,
            dimension: Dimension::General,
            reversed: false,
            position: i as i32 + 1,
            consistency_pair: None,
            answer_key: Some(seq),
        })?;
    }

    // Progressive matrices: four options, exactly one with value 1.
    let matrices = instrument(InstrumentKind::Matrices, 5, false, 3, 0);
    let mat_id = matrices.id;
    store.insert_instrument(matrices)?;
    for i in 0..3 {
        let question = Question {
            id: Uuid::new_v4(),
            instrument_id: mat_id,
            text: format!("Which figure completes matrix {}?", i + 1),
            scale: ScaleKind::MultipleChoice,
            dimension: Dimension::General,
            reversed: false,
            position: i + 1,
            consistency_pair: None,
            answer_key: None,
        };
        let question_id = question.id;
        store.insert_question(question)?;
        for (pos, value) in [(1, 0), (2, 1), (3, 0), (4, 0)] {
            store.insert_option(ChoiceOption {
                id: Uuid::new_v4(),
                question_id,
                text: format!("Figure {}", pos),
                value,
                position: pos,
            })?;
        }
    }

    // Situational judgment: one scenario per dimension, options valued 1-5.
    let situational = instrument(InstrumentKind::Situational, 6, false, 3, 0);
    let sit_id = situational.id;
    store.insert_instrument(situational)?;
    let scenarios = [
        ("A coworker asks you to cover up a mistake. What do you do?", Dimension::SituationalResponsibility),
        ("Your supervisor gives an order you consider inefficient. What do you do?", Dimension::SituationalObedience),
        ("A competitor offers you a better salary for internal information. What do you do?", Dimension::SituationalLoyalty),
    ];
    for (i, (text, dimension)) in scenarios.into_iter().enumerate() {
        let question = Question {
            id: Uuid::new_v4(),
            instrument_id: sit_id,
            text: text.to_string(),
            scale: ScaleKind::MultipleChoice,
            dimension,
            reversed: false,
            position: i as i32 + 1,
            consistency_pair: None,
            answer_key: None,
        };
        let question_id = question.id;
        store.insert_question(question)?;
        for (pos, value) in [(1, 1), (2, 3), (3, 5)] {
            store.insert_option(ChoiceOption {
                id: Uuid::new_v4(),
                question_id,
                text: format!("Course of action {}", pos),
                value,
                position: pos,
            })?;
        }
    }

    // Social desirability.
    let desirability = instrument(InstrumentKind::SocialDesirability, 7, false, 3, 0);
    let ds_id = desirability.id;
    store.insert_instrument(desirability)?;
    store.insert_question(likert(ds_id, "I have never been late to an appointment", Dimension::SocialDesirability, false, 1))?;
    store.insert_question(likert(ds_id, "I sometimes feel resentment when I do not get my way", Dimension::SocialDesirability, true, 2))?;
    store.insert_question(likert(ds_id, "I am always courteous, even to disagreeable people", Dimension::SocialDesirability, false, 3))?;

    // Attention to detail: one task per subtype, ground truth in the key.
    let attention = instrument(InstrumentKind::AttentionToDetail, 8, false, 3, 0);
    let at_id = attention.id;
    store.insert_instrument(attention)?;
    let attention_items = [
        (
            "Compare the original invoice with the copy and flag every difference",
            Dimension::DocumentComparison,
            json!({ "differences": [{ "field": "invoice_number" }, { "field": "total" }] }),
        ),
        (
            "Cross-check the registry against the master record and flag inconsistencies",
            Dimension::DataVerification,
            json!({ "inconsistencies": [{ "field": "email" }] }),
        ),
        (
            "Find the value that breaks the sequence 2, 4, 8, 16, 37, 64",
            Dimension::ErrorSequences,
            json!({ "value": 37 }),
        ),
    ];
    for (i, (text, dimension, key)) in attention_items.into_iter().enumerate() {
        store.insert_question(Question {
            id: Uuid::new_v4(),
            instrument_id: at_id,
            text: text.to_string(),
            scale: ScaleKind::MultipleChoice,
            dimension,
            reversed: false,
            position: i as i32 + 1,
            consistency_pair: None,
            answer_key: Some(key),
        })?;
    }

    // Projective instruments.
    store.insert_instrument(instrument(InstrumentKind::TreeDrawing, 9, true, 0, 0))?;
    store.insert_instrument(instrument(InstrumentKind::PersonInRain, 10, true, 0, 0))?;

    let sentences = instrument(InstrumentKind::IncompleteSentences, 11, true, 3, 0);
    let fr_id = sentences.id;
    store.insert_instrument(sentences)?;
    let stems = [
        ("My work is...", Dimension::WorkAttitude),
        ("When my boss gives me an order I...", Dimension::AuthorityAttitude),
        ("I stay with a company when...", Dimension::PersonalCommitment),
    ];
    for (i, (text, dimension)) in stems.into_iter().enumerate() {
        store.insert_question(Question {
            id: Uuid::new_v4(),
            instrument_id: fr_id,
            text: text.to_string(),
            scale: ScaleKind::FreeText,
            dimension,
            reversed: false,
            position: i as i32 + 1,
            consistency_pair: None,
            answer_key: None,
        })?;
    }

    let colors = instrument(InstrumentKind::ColorPreference, 12, true, 1, 0);
    let col_id = colors.id;
    store.insert_instrument(colors)?;
    store.insert_question(Question {
        id: Uuid::new_v4(),
        instrument_id: col_id,
        text: "Order the eight colors from most to least preferred".to_string(),
        scale: ScaleKind::ColorRanking,
        dimension: Dimension::ColorPreference,
        reversed: false,
        position: 1,
        consistency_pair: None,
        answer_key: None,
    })?;

    Ok(profile_id)
}
