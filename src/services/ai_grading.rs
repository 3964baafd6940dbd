//! AI-assisted grading of projective answers (drawings, incomplete sentences,
//! color rankings) through an external provider.
//!
//! The collaborator never fails the surrounding review workflow: any
//! transport or parsing problem degrades to a low-confidence placeholder the
//! evaluator can override.

use std::future::Future;
use std::pin::Pin;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::Config;
use crate::error::Result;
use crate::models::instrument::InstrumentKind;
use crate::models::response::ProjectiveKind;
use crate::store::EvaluationStore;

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const GOOGLE_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/{model}:generateContent";

const MIN_SCORE: i64 = 1;
const MAX_SCORE: i64 = 10;
const FALLBACK_SCORE: i64 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GradeOutcome {
    /// 1-10, clamped.
    pub score: i32,
    pub interpretation: String,
    pub confidence: Confidence,
}

impl GradeOutcome {
    pub fn low(interpretation: impl Into<String>) -> Self {
        Self {
            score: FALLBACK_SCORE as i32,
            interpretation: interpretation.into(),
            confidence: Confidence::Low,
        }
    }
}

/// One incomplete-sentence answer, grouped for a single grading call.
#[derive(Debug, Clone)]
pub struct SentenceAnswer {
    pub dimension: String,
    pub stem: String,
    pub answer: String,
}

pub type GradeFuture = Pin<Box<dyn Future<Output = GradeOutcome> + Send + 'static>>;

/// External grading collaborator. Implementations must resolve every call —
/// failures are expressed as low-confidence outcomes, never as errors.
#[cfg_attr(test, mockall::automock)]
pub trait ProjectiveGrader: Send + Sync {
    fn grade_drawing(&self, instrument_name: String, image_b64: String) -> GradeFuture;
    fn grade_sentences(&self, answers: Vec<SentenceAnswer>) -> GradeFuture;
    fn grade_colors(&self, ranking: JsonValue) -> GradeFuture;
}

/// Parses the provider's JSON reply, tolerating markdown code fences, and
/// clamps it into the contract: score 1-10, confidence defaulting to LOW.
pub fn parse_grade(text: &str) -> GradeOutcome {
    let mut cleaned = text.trim();
    let stripped;
    if cleaned.starts_with("```") {
        stripped = cleaned
            .lines()
            .filter(|line| !line.trim_start().starts_with("```"))
            .collect::<Vec<_>>()
            .join("\n");
        cleaned = stripped.trim();
    }

    let Ok(value) = serde_json::from_str::<JsonValue>(cleaned) else {
        tracing::warn!("AI grader returned non-JSON output");
        return GradeOutcome::low(format!(
            "Could not parse the grading reply: {}",
            &cleaned.chars().take(200).collect::<String>()
        ));
    };

    let score = value
        .get("score")
        .and_then(|s| s.as_i64().or_else(|| s.as_f64().map(|f| f as i64)))
        .unwrap_or(FALLBACK_SCORE)
        .clamp(MIN_SCORE, MAX_SCORE) as i32;
    let interpretation = value
        .get("interpretation")
        .and_then(|i| i.as_str())
        .unwrap_or("No interpretation provided.")
        .to_string();
    let confidence = match value.get("confidence").and_then(|c| c.as_str()) {
        Some("HIGH") => Confidence::High,
        Some("MEDIUM") => Confidence::Medium,
        _ => Confidence::Low,
    };

    GradeOutcome {
        score,
        interpretation,
        confidence,
    }
}

fn drawing_prompt(instrument_name: &str) -> String {
    format!(
        "You are a psychologist with expertise in graphic projective tests.\n\
         Analyze the attached drawing from the \"{instrument_name}\" test.\n\
         Consider size and placement, stroke quality, included details, and\n\
         emotional indicators.\n\
         Reply EXCLUSIVELY with valid JSON (no markdown, no extra text):\n\
         {{\"score\": <1-10>, \"interpretation\": \"<brief analysis, max 200 words>\", \"confidence\": \"<HIGH|MEDIUM|LOW>\"}}"
    )
}

fn sentences_prompt(answers: &[SentenceAnswer]) -> String {
    let mut listing = String::new();
    for answer in answers {
        listing.push_str(&format!(
            "### {}\n- \"{}\" -> \"{}\"\n",
            answer.dimension, answer.stem, answer.answer
        ));
    }
    format!(
        "You are a psychologist with expertise in the Sacks incomplete-sentences test.\n\
         Analyze the following answers grouped by dimension.\n\n{listing}\n\
         Consider attitude towards work, authority and commitment, and the\n\
         coherence of the answers.\n\
         Reply EXCLUSIVELY with valid JSON (no markdown, no extra text):\n\
         {{\"score\": <1-10>, \"interpretation\": \"<brief analysis, max 200 words>\", \"confidence\": \"<HIGH|MEDIUM|LOW>\"}}"
    )
}

fn colors_prompt(ranking: &JsonValue) -> String {
    format!(
        "You are a psychologist with expertise in the Luscher color test.\n\
         Analyze the following color preference ranking:\n\n{ranking}\n\n\
         Consider significant preferences and rejections, current emotional\n\
         state, and fit with a work profile.\n\
         Reply EXCLUSIVELY with valid JSON (no markdown, no extra text):\n\
         {{\"score\": <1-10>, \"interpretation\": \"<brief analysis, max 200 words>\", \"confidence\": \"<HIGH|MEDIUM|LOW>\"}}"
    )
}

/// Splits a possible `data:image/...;base64,` URI into media type and payload.
fn split_data_uri(image_b64: &str) -> (&'static str, &str) {
    if let Some(rest) = image_b64.strip_prefix("data:") {
        if let Some((header, data)) = rest.split_once(',') {
            let media_type = if header.contains("image/jpeg") {
                "image/jpeg"
            } else {
                "image/png"
            };
            return (media_type, data);
        }
    }
    ("image/png", image_b64)
}

#[derive(Clone)]
pub struct HttpProjectiveGrader {
    client: Client,
    provider: String,
    anthropic_api_key: String,
    anthropic_model: String,
    google_api_key: String,
    google_model: String,
}

impl HttpProjectiveGrader {
    pub fn from_config(config: &Config, client: Client) -> Self {
        Self {
            client,
            provider: config.ai_provider.clone(),
            anthropic_api_key: config.anthropic_api_key.clone(),
            anthropic_model: config.anthropic_model.clone(),
            google_api_key: config.google_api_key.clone(),
            google_model: config.google_model.clone(),
        }
    }

    async fn call_anthropic(&self, prompt: String, image_b64: Option<String>) -> Result<String> {
        let mut content = Vec::new();
        if let Some(image) = &image_b64 {
            let (media_type, data) = split_data_uri(image);
            content.push(json!({
                "type": "image",
                "source": { "type": "base64", "media_type": media_type, "data": data },
            }));
        }
        content.push(json!({ "type": "text", "text": prompt }));

        let payload = json!({
            "model": self.anthropic_model,
            "max_tokens": 1024,
            "messages": [{ "role": "user", "content": content }],
        });

        let body: JsonValue = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.anthropic_api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(body["content"][0]["text"].as_str().unwrap_or_default().to_string())
    }

    async fn call_google(&self, prompt: String, image_b64: Option<String>) -> Result<String> {
        let mut parts = Vec::new();
        if let Some(image) = &image_b64 {
            let (mime_type, data) = split_data_uri(image);
            parts.push(json!({ "inline_data": { "mime_type": mime_type, "data": data } }));
        }
        parts.push(json!({ "text": prompt }));

        let payload = json!({
            "contents": [{ "parts": parts }],
            "generationConfig": { "temperature": 0.3, "maxOutputTokens": 1024 },
        });
        let url = GOOGLE_API_URL.replace("{model}", &self.google_model);

        let body: JsonValue = self
            .client
            .post(url)
            .query(&[("key", &self.google_api_key)])
            .json(&payload)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .unwrap_or_default()
            .to_string())
    }

    async fn grade(&self, prompt: String, image_b64: Option<String>) -> GradeOutcome {
        let reply = if self.provider == "google" {
            self.call_google(prompt, image_b64).await
        } else {
            self.call_anthropic(prompt, image_b64).await
        };
        match reply {
            Ok(text) => parse_grade(&text),
            Err(err) => {
                tracing::warn!(error = %err, "AI grading call failed");
                GradeOutcome::low(format!("Grading service unavailable: {}", err))
            }
        }
    }
}

impl ProjectiveGrader for HttpProjectiveGrader {
    fn grade_drawing(&self, instrument_name: String, image_b64: String) -> GradeFuture {
        let grader = self.clone();
        Box::pin(async move {
            if image_b64.is_empty() {
                return GradeOutcome::low("No image found to analyze.");
            }
            grader
                .grade(drawing_prompt(&instrument_name), Some(image_b64))
                .await
        })
    }

    fn grade_sentences(&self, answers: Vec<SentenceAnswer>) -> GradeFuture {
        let grader = self.clone();
        Box::pin(async move {
            if answers.is_empty() {
                return GradeOutcome::low("No sentence answers found to analyze.");
            }
            grader.grade(sentences_prompt(&answers), None).await
        })
    }

    fn grade_colors(&self, ranking: JsonValue) -> GradeFuture {
        let grader = self.clone();
        Box::pin(async move {
            if ranking.is_null() {
                return GradeOutcome::low("No color ranking found to analyze.");
            }
            grader.grade(colors_prompt(&ranking), None).await
        })
    }
}

/// Suggested grade for one projective instrument of an evaluation; covers one
/// or more captured responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct GradeSuggestion {
    pub instrument: InstrumentKind,
    pub response_ids: Vec<Uuid>,
    pub outcome: GradeOutcome,
}

/// Grades every unreviewed projective answer of an evaluation. Items are
/// isolated: one failing call yields a low-confidence suggestion for that item
/// and the rest are still graded.
pub async fn grade_pending(
    store: &dyn EvaluationStore,
    grader: &dyn ProjectiveGrader,
    evaluation_id: Uuid,
) -> Result<Vec<GradeSuggestion>> {
    let pending = store.unreviewed_projectives(evaluation_id)?;
    let mut suggestions = Vec::new();
    let mut sentence_answers: Vec<SentenceAnswer> = Vec::new();
    let mut sentence_ids: Vec<Uuid> = Vec::new();

    for response in &pending {
        let Some(instrument) = store.instrument(response.instrument_id)? else {
            continue;
        };
        match instrument.kind {
            InstrumentKind::TreeDrawing | InstrumentKind::PersonInRain
                if response.kind == ProjectiveKind::Drawing =>
            {
                let outcome = grader
                    .grade_drawing(instrument.name.clone(), response.canvas_image.clone())
                    .await;
                suggestions.push(GradeSuggestion {
                    instrument: instrument.kind,
                    response_ids: vec![response.id],
                    outcome,
                });
            }
            InstrumentKind::ColorPreference => {
                let ranking = response
                    .stroke_data
                    .clone()
                    .unwrap_or_else(|| JsonValue::String(response.text_answer.clone()));
                let outcome = grader.grade_colors(ranking).await;
                suggestions.push(GradeSuggestion {
                    instrument: instrument.kind,
                    response_ids: vec![response.id],
                    outcome,
                });
            }
            InstrumentKind::IncompleteSentences if response.kind == ProjectiveKind::Text => {
                let (dimension, stem) = match response.question_id {
                    Some(question_id) => match store.question(question_id)? {
                        Some(question) => {
                            (question.dimension.label().to_string(), question.text)
                        }
                        None => ("General".to_string(), String::new()),
                    },
                    None => ("General".to_string(), String::new()),
                };
                sentence_answers.push(SentenceAnswer {
                    dimension,
                    stem,
                    answer: response.text_answer.clone(),
                });
                sentence_ids.push(response.id);
            }
            _ => {}
        }
    }

    if !sentence_answers.is_empty() {
        let outcome = grader.grade_sentences(sentence_answers).await;
        suggestions.push(GradeSuggestion {
            instrument: InstrumentKind::IncompleteSentences,
            response_ids: sentence_ids,
            outcome,
        });
    }

    Ok(suggestions)
}
