//! Likert-scale aggregation shared by the Big Five, commitment, obedience and
//! social-desirability instruments.

use crate::models::question::Dimension;

/// One captured Likert answer with the question attributes scoring needs.
#[derive(Debug, Clone)]
pub struct LikertAnswer {
    pub dimension: Dimension,
    pub value: i32,
    pub reversed: bool,
}

/// Effective value of an answer on the 1-5 scale, inverting reverse-scored
/// items.
pub fn adjusted(value: i32, reversed: bool) -> f64 {
    if reversed {
        (6 - value) as f64
    } else {
        value as f64
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn dimension_mean(answers: &[LikertAnswer], dimension: Dimension) -> f64 {
    let values: Vec<f64> = answers
        .iter()
        .filter(|a| a.dimension == dimension)
        .map(|a| adjusted(a.value, a.reversed))
        .collect();
    mean(&values)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BigFiveScores {
    pub responsibility: f64,
    pub agreeableness: f64,
    pub neuroticism: f64,
    pub openness: f64,
    pub extraversion: f64,
}

pub fn big_five(answers: &[LikertAnswer]) -> BigFiveScores {
    BigFiveScores {
        responsibility: dimension_mean(answers, Dimension::Responsibility),
        agreeableness: dimension_mean(answers, Dimension::Agreeableness),
        neuroticism: dimension_mean(answers, Dimension::Neuroticism),
        openness: dimension_mean(answers, Dimension::Openness),
        extraversion: dimension_mean(answers, Dimension::Extraversion),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitmentScores {
    pub affective: f64,
    pub continuance: f64,
    pub normative: f64,
    /// Mean of the affective and normative subscales; continuance is reported
    /// but does not enter the total.
    pub total: f64,
}

pub fn commitment(answers: &[LikertAnswer]) -> CommitmentScores {
    let affective = dimension_mean(answers, Dimension::AffectiveCommitment);
    let continuance = dimension_mean(answers, Dimension::ContinuanceCommitment);
    let normative = dimension_mean(answers, Dimension::NormativeCommitment);
    let total = if affective != 0.0 || normative != 0.0 {
        (affective + normative) / 2.0
    } else {
        0.0
    };
    CommitmentScores {
        affective,
        continuance,
        normative,
        total,
    }
}

/// Mean over every answer regardless of dimension, with inversion applied.
/// Used for the obedience and social-desirability instruments.
pub fn overall_mean(answers: &[LikertAnswer]) -> f64 {
    let values: Vec<f64> = answers
        .iter()
        .map(|a| adjusted(a.value, a.reversed))
        .collect();
    mean(&values)
}
