//! Situational-judgment scoring.

use crate::models::question::Dimension;

/// Theoretical maximum of the summed dimension means: 3 dimensions x 5.0.
const MAX_SUM: f64 = 15.0;

#[derive(Debug, Clone)]
pub struct SituationalAnswer {
    pub dimension: Dimension,
    pub value: i32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SituationalScore {
    pub responsibility: f64,
    pub obedience: f64,
    pub loyalty: f64,
    /// Summed dimension means normalized to 0-100 so the score is comparable
    /// with the percentage thresholds.
    pub total_pct: f64,
}

fn dimension_mean(answers: &[SituationalAnswer], dimension: Dimension) -> f64 {
    let values: Vec<f64> = answers
        .iter()
        .filter(|a| a.dimension == dimension)
        .map(|a| a.value as f64)
        .collect();
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

pub fn score(answers: &[SituationalAnswer]) -> SituationalScore {
    let responsibility = dimension_mean(answers, Dimension::SituationalResponsibility);
    let obedience = dimension_mean(answers, Dimension::SituationalObedience);
    let loyalty = dimension_mean(answers, Dimension::SituationalLoyalty);
    let total_pct = (responsibility + obedience + loyalty) / MAX_SUM * 100.0;

    SituationalScore {
        responsibility,
        obedience,
        loyalty,
        total_pct,
    }
}
