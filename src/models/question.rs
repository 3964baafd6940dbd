use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScaleKind {
    Likert5,
    Likert7,
    MultipleChoice,
    FreeText,
    Sequence,
    ColorRanking,
}

/// Scoring dimension a question contributes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    // Big Five
    Responsibility,
    Agreeableness,
    Neuroticism,
    Openness,
    Extraversion,
    // Organizational commitment (Allen & Meyer)
    AffectiveCommitment,
    ContinuanceCommitment,
    NormativeCommitment,
    // Obedience
    Discipline,
    NormConformity,
    AuthorityOrientation,
    // Situational judgment
    SituationalResponsibility,
    SituationalObedience,
    SituationalLoyalty,
    // Incomplete sentences
    WorkAttitude,
    AuthorityAttitude,
    PersonalCommitment,
    // Colors
    ColorPreference,
    // Social desirability
    SocialDesirability,
    // Attention to detail
    DocumentComparison,
    DataVerification,
    ErrorSequences,
    General,
}

impl Dimension {
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Responsibility => "Responsibility",
            Dimension::Agreeableness => "Agreeableness",
            Dimension::Neuroticism => "Neuroticism",
            Dimension::Openness => "Openness",
            Dimension::Extraversion => "Extraversion",
            Dimension::AffectiveCommitment => "Affective commitment",
            Dimension::ContinuanceCommitment => "Continuance commitment",
            Dimension::NormativeCommitment => "Normative commitment",
            Dimension::Discipline => "Discipline",
            Dimension::NormConformity => "Norm conformity",
            Dimension::AuthorityOrientation => "Authority orientation",
            Dimension::SituationalResponsibility => "Situational: responsibility",
            Dimension::SituationalObedience => "Situational: obedience",
            Dimension::SituationalLoyalty => "Situational: loyalty",
            Dimension::WorkAttitude => "Attitude towards work",
            Dimension::AuthorityAttitude => "Attitude towards authority",
            Dimension::PersonalCommitment => "Personal commitment",
            Dimension::ColorPreference => "Color preference",
            Dimension::SocialDesirability => "Social desirability",
            Dimension::DocumentComparison => "Document comparison",
            Dimension::DataVerification => "Data verification",
            Dimension::ErrorSequences => "Sequences with errors",
            Dimension::General => "General",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,
    pub instrument_id: Uuid,
    pub text: String,
    pub scale: ScaleKind,
    pub dimension: Dimension,
    /// Reverse-scored: on a 1-5 Likert scale the effective value is `6 - v`.
    pub reversed: bool,
    pub position: i32,
    /// Partner question measuring the same construct with different wording.
    /// Used only for the consistency index, never an ownership relation.
    pub consistency_pair: Option<Uuid>,
    /// Ground truth for auto-graded items: the sequence to recall for memory
    /// questions, the expected differences/inconsistencies/error value for
    /// attention questions.
    pub answer_key: Option<JsonValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChoiceOption {
    pub id: Uuid,
    pub question_id: Uuid,
    pub text: String,
    /// Likert/matrix numeric value; for matrices, value 1 marks the correct
    /// option.
    pub value: i32,
    pub position: i32,
}
