use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Closed catalog of instrument types. Scoring and selection dispatch by
/// matching on this enum, never on raw type strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentKind {
    BigFive,
    Commitment,
    Obedience,
    WorkingMemory,
    Matrices,
    TreeDrawing,
    PersonInRain,
    IncompleteSentences,
    ColorPreference,
    Situational,
    SocialDesirability,
    AttentionToDetail,
}

impl InstrumentKind {
    pub const ALL: [InstrumentKind; 12] = [
        InstrumentKind::BigFive,
        InstrumentKind::Commitment,
        InstrumentKind::Obedience,
        InstrumentKind::WorkingMemory,
        InstrumentKind::Matrices,
        InstrumentKind::TreeDrawing,
        InstrumentKind::PersonInRain,
        InstrumentKind::IncompleteSentences,
        InstrumentKind::ColorPreference,
        InstrumentKind::Situational,
        InstrumentKind::SocialDesirability,
        InstrumentKind::AttentionToDetail,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InstrumentKind::BigFive => "big_five",
            InstrumentKind::Commitment => "commitment",
            InstrumentKind::Obedience => "obedience",
            InstrumentKind::WorkingMemory => "working_memory",
            InstrumentKind::Matrices => "matrices",
            InstrumentKind::TreeDrawing => "tree_drawing",
            InstrumentKind::PersonInRain => "person_in_rain",
            InstrumentKind::IncompleteSentences => "incomplete_sentences",
            InstrumentKind::ColorPreference => "color_preference",
            InstrumentKind::Situational => "situational",
            InstrumentKind::SocialDesirability => "social_desirability",
            InstrumentKind::AttentionToDetail => "attention_to_detail",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            InstrumentKind::BigFive => "Big Five (OCEAN)",
            InstrumentKind::Commitment => "Organizational Commitment (Allen & Meyer)",
            InstrumentKind::Obedience => "Obedience/Conformity Scale",
            InstrumentKind::WorkingMemory => "Working Memory Test",
            InstrumentKind::Matrices => "Progressive Matrices",
            InstrumentKind::TreeDrawing => "Tree Drawing Test (Koch)",
            InstrumentKind::PersonInRain => "Person in the Rain",
            InstrumentKind::IncompleteSentences => "Incomplete Sentences (Sacks)",
            InstrumentKind::ColorPreference => "Color Preference Test (Luscher)",
            InstrumentKind::Situational => "Situational Judgment Test",
            InstrumentKind::SocialDesirability => "Social Desirability Scale",
            InstrumentKind::AttentionToDetail => "Attention to Detail",
        }
    }
}

impl std::str::FromStr for InstrumentKind {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        InstrumentKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or(())
    }
}

/// One entry of the instrument catalog. Reference data, edited only by
/// administrators; candidate sessions never mutate it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    pub id: Uuid,
    pub kind: InstrumentKind,
    pub name: String,
    pub instructions: String,
    /// Presentation order within a session.
    pub position: i32,
    pub active: bool,
    /// Requires manual (or AI-assisted) review of the answers.
    pub projective: bool,
    /// Total questions available in the bank.
    pub bank_size: i32,
    /// Questions to select per evaluation; 0 applies the whole bank.
    pub items_to_apply: i32,
    pub time_limit_minutes: Option<i32>,
}
