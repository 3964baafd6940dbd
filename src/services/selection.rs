//! Question selection: a balanced subset per instrument, persisted once per
//! evaluation at verification time.

use std::collections::{HashMap, HashSet};

use rand::seq::SliceRandom;
use rand::thread_rng;
use uuid::Uuid;

use crate::models::instrument::Instrument;
use crate::models::question::{Dimension, Question};

/// Selects the question ids an evaluation will apply, walking the active
/// catalog in presentation order.
///
/// Per instrument: an `items_to_apply` of 0 (or one at least the bank size)
/// applies the whole bank. Otherwise both members of every consistency pair
/// belonging to the instrument are force-included, even when that exceeds the
/// quota, and the remainder is filled round-robin across shuffled
/// per-dimension groups so no dimension dominates.
///
/// Callers persist the output exactly once; the selector itself is invoked
/// only on the pending -> in-progress transition.
pub fn select_questions(catalog: &[(Instrument, Vec<Question>)]) -> Vec<Uuid> {
    let mut selected = Vec::new();
    for (instrument, bank) in catalog {
        select_for_instrument(instrument, bank, &mut selected);
    }
    selected
}

fn select_for_instrument(instrument: &Instrument, bank: &[Question], selected: &mut Vec<Uuid>) {
    let quota = instrument.items_to_apply as usize;
    if quota == 0 || quota >= bank.len() {
        selected.extend(bank.iter().map(|q| q.id));
        return;
    }

    let mut mandatory: HashSet<Uuid> = HashSet::new();
    for question in bank {
        if let Some(pair_id) = question.consistency_pair {
            mandatory.insert(question.id);
            mandatory.insert(pair_id);
        }
    }

    let mut picked: Vec<Uuid> = bank
        .iter()
        .filter(|q| mandatory.contains(&q.id))
        .map(|q| q.id)
        .collect();

    let mut remaining = quota.saturating_sub(picked.len());
    if remaining > 0 {
        let mut by_dimension: HashMap<Dimension, Vec<Uuid>> = HashMap::new();
        for question in bank {
            if !mandatory.contains(&question.id) {
                by_dimension.entry(question.dimension).or_default().push(question.id);
            }
        }

        let mut rng = thread_rng();
        for group in by_dimension.values_mut() {
            group.shuffle(&mut rng);
        }
        let mut dimensions: Vec<Dimension> = by_dimension.keys().copied().collect();
        dimensions.shuffle(&mut rng);

        let mut idx = 0;
        while remaining > 0 && by_dimension.values().any(|g| !g.is_empty()) {
            let dimension = dimensions[idx % dimensions.len()];
            if let Some(group) = by_dimension.get_mut(&dimension) {
                if let Some(question_id) = group.pop() {
                    picked.push(question_id);
                    remaining -= 1;
                }
            }
            idx += 1;
        }
    }

    selected.extend(picked);
}
