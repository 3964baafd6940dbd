use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{Duration, Utc};
use serde_json::{json, Value as JsonValue};
use tower::ServiceExt;
use uuid::Uuid;

use psychoeval_backend::models::instrument::InstrumentKind;
use psychoeval_backend::models::question::{Dimension, Question};
use psychoeval_backend::services::ai_grading::{Confidence, GradeOutcome, ProjectiveGrader, SentenceAnswer};
use psychoeval_backend::store::memory::MemoryStore;
use psychoeval_backend::store::seed::seed_demo_catalog;
use psychoeval_backend::store::EvaluationStore;
use psychoeval_backend::{routes, AppState};

struct StubGrader;

type GradeFuture = Pin<Box<dyn Future<Output = GradeOutcome> + Send + 'static>>;

impl ProjectiveGrader for StubGrader {
    fn grade_drawing(&self, _instrument_name: String, _image_b64: String) -> GradeFuture {
        Box::pin(async {
            GradeOutcome {
                score: 7,
                interpretation: "Stable stroke, centered placement.".to_string(),
                confidence: Confidence::Medium,
            }
        })
    }

    fn grade_sentences(&self, _answers: Vec<SentenceAnswer>) -> GradeFuture {
        Box::pin(async {
            GradeOutcome {
                score: 8,
                interpretation: "Positive attitude towards work.".to_string(),
                confidence: Confidence::High,
            }
        })
    }

    fn grade_colors(&self, _ranking: JsonValue) -> GradeFuture {
        Box::pin(async {
            GradeOutcome {
                score: 6,
                interpretation: "Balanced preference ordering.".to_string(),
                confidence: Confidence::Medium,
            }
        })
    }
}

fn init_test_config() {
    std::env::set_var("SERVER_ADDRESS", "127.0.0.1:0");
    std::env::set_var("PUBLIC_RPS", "10000");
    let _ = psychoeval_backend::config::init_config();
}

fn app() -> (Router, Arc<MemoryStore>, Uuid) {
    init_test_config();
    let store = Arc::new(MemoryStore::new());
    let profile_id = seed_demo_catalog(store.as_ref()).expect("seed catalog");
    let state = AppState::new(store.clone(), Arc::new(StubGrader));
    (routes::router(state, 10_000), store, profile_id)
}

async fn send(
    app: &Router,
    method: &str,
    path: &str,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let mut builder = Request::builder().method(method).uri(path);
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).expect("request"))
        .await
        .expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let value = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(JsonValue::Null)
    };
    (status, value)
}

async fn create_evaluation(app: &Router, profile_id: Uuid, national_id: &str) -> (Uuid, String) {
    let (status, body) = send(
        app,
        "POST",
        "/api/panel/evaluations",
        Some(json!({
            "full_name": "Maria Fernanda Lopez",
            "national_id": national_id,
            "email": "maria@example.com",
            "applied_position": "Accounting assistant",
            "profile_id": profile_id,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    let id: Uuid = body["id"].as_str().unwrap().parse().unwrap();
    let token = body["token"].as_str().unwrap().to_string();
    (id, token)
}

/// Value a candidate aiming at the target profile would pick for a Likert
/// item: high on positive traits, low on neuroticism, moderate on the
/// social-desirability scale.
fn ideal_likert_value(kind: InstrumentKind, question: &Question) -> i32 {
    if kind == InstrumentKind::SocialDesirability {
        return if question.reversed { 4 } else { 2 };
    }
    let wants_high = question.dimension != Dimension::Neuroticism;
    match (wants_high, question.reversed) {
        (true, false) => 5,
        (true, true) => 1,
        (false, false) => 1,
        (false, true) => 5,
    }
}

/// Drives a full candidate session answering every selected question close to
/// the ideal profile. Returns after the last instrument, before finalize.
async fn answer_all_instruments(app: &Router, store: &MemoryStore, token: &str) {
    let instruments = store.active_instruments().unwrap();
    for instrument in instruments {
        let kind = instrument.kind;
        let path = format!(
            "/api/public/evaluations/{token}/instruments/{}",
            kind.as_str()
        );
        let (status, page) = send(app, "GET", &path, None).await;
        assert_eq!(status, StatusCode::OK, "opening {kind:?} failed: {page}");

        let question_ids: Vec<Uuid> = page["questions"]
            .as_array()
            .unwrap()
            .iter()
            .map(|q| q["id"].as_str().unwrap().parse().unwrap())
            .collect();

        match kind {
            InstrumentKind::BigFive
            | InstrumentKind::Commitment
            | InstrumentKind::Obedience
            | InstrumentKind::SocialDesirability => {
                for question_id in question_ids {
                    let question = store.question(question_id).unwrap().unwrap();
                    let value = ideal_likert_value(kind, &question);
                    let (status, body) = send(
                        app,
                        "POST",
                        &format!("/api/public/evaluations/{token}/responses/psychometric"),
                        Some(json!({ "question_id": question_id, "value": value })),
                    )
                    .await;
                    assert_eq!(status, StatusCode::OK, "likert answer failed: {body}");
                }
            }
            InstrumentKind::WorkingMemory => {
                for question_id in question_ids {
                    let question = store.question(question_id).unwrap().unwrap();
                    let answered = question.answer_key.clone().unwrap();
                    let (status, _) = send(
                        app,
                        "POST",
                        &format!("/api/public/evaluations/{token}/responses/memory"),
                        Some(json!({ "question_id": question_id, "answered": answered })),
                    )
                    .await;
                    assert_eq!(status, StatusCode::OK);
                }
            }
            InstrumentKind::Matrices => {
                for question_id in question_ids {
                    let correct = store
                        .options_for_question(question_id)
                        .unwrap()
                        .into_iter()
                        .find(|o| o.value == 1)
                        .unwrap();
                    let (status, _) = send(
                        app,
                        "POST",
                        &format!("/api/public/evaluations/{token}/responses/matrix"),
                        Some(json!({ "question_id": question_id, "option_id": correct.id })),
                    )
                    .await;
                    assert_eq!(status, StatusCode::OK);
                }
            }
            InstrumentKind::Situational => {
                for question_id in question_ids {
                    let best = store
                        .options_for_question(question_id)
                        .unwrap()
                        .into_iter()
                        .max_by_key(|o| o.value)
                        .unwrap();
                    let (status, _) = send(
                        app,
                        "POST",
                        &format!("/api/public/evaluations/{token}/responses/situational"),
                        Some(json!({
                            "question_id": question_id,
                            "option_id": best.id,
                            "justification": "It is the responsible course of action.",
                        })),
                    )
                    .await;
                    assert_eq!(status, StatusCode::OK);
                }
            }
            InstrumentKind::AttentionToDetail => {
                for question_id in question_ids {
                    let question = store.question(question_id).unwrap().unwrap();
                    let answer = question.answer_key.clone().unwrap();
                    let (status, body) = send(
                        app,
                        "POST",
                        &format!("/api/public/evaluations/{token}/responses/attention"),
                        Some(json!({ "question_id": question_id, "answer": answer })),
                    )
                    .await;
                    assert_eq!(status, StatusCode::OK, "attention answer failed: {body}");
                }
            }
            InstrumentKind::TreeDrawing | InstrumentKind::PersonInRain => {
                let image = format!("data:image/png;base64,{}", BASE64.encode(b"drawing"));
                let (status, body) = send(
                    app,
                    "POST",
                    &format!(
                        "/api/public/evaluations/{token}/instruments/{}/projective",
                        kind.as_str()
                    ),
                    Some(json!({ "kind": "drawing", "canvas_image": image })),
                )
                .await;
                assert_eq!(status, StatusCode::OK, "drawing failed: {body}");
            }
            InstrumentKind::IncompleteSentences => {
                for question_id in question_ids {
                    let (status, _) = send(
                        app,
                        "POST",
                        &format!(
                            "/api/public/evaluations/{token}/instruments/incomplete_sentences/projective"
                        ),
                        Some(json!({
                            "kind": "text",
                            "question_id": question_id,
                            "text_answer": "something I value and take care of",
                        })),
                    )
                    .await;
                    assert_eq!(status, StatusCode::OK);
                }
            }
            InstrumentKind::ColorPreference => {
                let (status, _) = send(
                    app,
                    "POST",
                    &format!(
                        "/api/public/evaluations/{token}/instruments/color_preference/projective"
                    ),
                    Some(json!({
                        "kind": "text",
                        "question_id": question_ids.first(),
                        "text_answer": "blue, green, yellow, red, violet, brown, grey, black",
                    })),
                )
                .await;
                assert_eq!(status, StatusCode::OK);
            }
        }
    }
}

#[tokio::test]
async fn full_candidate_flow_reaches_apto_after_review() {
    let (app, store, profile_id) = app();
    let (evaluation_id, token) = create_evaluation(&app, profile_id, "1712345678").await;

    // Pending summary.
    let (status, body) = send(&app, "GET", &format!("/api/public/evaluations/{token}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");
    assert_eq!(body["go_to_finalize"], false);

    // Wrong national id is rejected without a state change.
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/public/evaluations/{token}/verify"),
        Some(json!({ "national_id": "9999999999" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Correct id starts the session at the first instrument.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/public/evaluations/{token}/verify"),
        Some(json!({ "national_id": "1712345678" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "verify failed: {body}");
    assert_eq!(body["status"], "in_progress");
    assert_eq!(body["first_instrument"], "big_five");
    let total_questions = body["total_questions"].as_u64().unwrap();
    assert!(total_questions > 0);

    answer_all_instruments(&app, &store, &token).await;

    // Unknown instrument type 404s.
    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/public/evaluations/{token}/instruments/graphology"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Finalize completes the session and scores it.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/public/evaluations/{token}/finalize"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");

    // Start page now redirects to finalize instead of restarting.
    let (status, body) = send(&app, "GET", &format!("/api/public/evaluations/{token}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["go_to_finalize"], true);

    // Answering after completion conflicts.
    let some_question = store
        .psychometric_responses(evaluation_id)
        .unwrap()
        .first()
        .unwrap()
        .question_id;
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/public/evaluations/{token}/responses/psychometric"),
        Some(json!({ "question_id": some_question, "value": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Panel detail: projective answers hold the verdict at REVISION.
    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/panel/evaluations/{evaluation_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let result = &body["result"];
    assert_eq!(result["automatic_verdict"], "REVISION");
    assert_eq!(result["memory_pct"], 100.0);
    assert_eq!(result["matrices_pct"], 100.0);
    assert_eq!(result["situational_pct"], 100.0);
    assert_eq!(result["attention_pct"], 100.0);
    assert_eq!(result["reliable"], true);
    assert_eq!(result["consistency_pct"], 100.0);
    let pending = body["pending_projectives"].as_u64().unwrap();
    assert_eq!(pending, 6); // 2 drawings + 3 sentences + 1 color ranking

    // AI suggestions: one per drawing and color ranking, sentences grouped.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/panel/evaluations/{evaluation_id}/ai-grade"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["suggestions"].as_array().unwrap().len(), 4);

    // Review every projective answer; the last review recomputes and the
    // evaluation moves to reviewed.
    for response in store.unreviewed_projectives(evaluation_id).unwrap() {
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/panel/evaluations/{evaluation_id}/review"),
            Some(json!({
                "response_id": response.id,
                "score": 8,
                "observations": "No risk indicators.",
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/panel/evaluations/{evaluation_id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["evaluation"]["status"], "reviewed");
    assert_eq!(body["pending_projectives"], 0);
    let result = &body["result"];
    assert_eq!(result["automatic_verdict"], "APTO");
    assert_eq!(result["final_verdict"], "APTO");
    assert_eq!(result["tree_score"], 8.0);
}

#[tokio::test]
async fn scoring_is_idempotent_across_recomputes() {
    let (app, store, profile_id) = app();
    let (evaluation_id, token) = create_evaluation(&app, profile_id, "0912345678").await;
    send(
        &app,
        "POST",
        &format!("/api/public/evaluations/{token}/verify"),
        Some(json!({ "national_id": "0912345678" })),
    )
    .await;
    answer_all_instruments(&app, &store, &token).await;
    send(&app, "POST", &format!("/api/public/evaluations/{token}/finalize"), None).await;

    let first = store.result(evaluation_id).unwrap().unwrap();
    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/panel/evaluations/{evaluation_id}/recompute"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let second = store.result(evaluation_id).unwrap().unwrap();

    assert_eq!(first.responsibility, second.responsibility);
    assert_eq!(first.memory_pct, second.memory_pct);
    assert_eq!(first.attention_pct, second.attention_pct);
    assert_eq!(first.automatic_verdict, second.automatic_verdict);
}

#[tokio::test]
async fn duplicate_answer_submission_upserts() {
    let (app, store, profile_id) = app();
    let (evaluation_id, token) = create_evaluation(&app, profile_id, "0601234567").await;
    send(
        &app,
        "POST",
        &format!("/api/public/evaluations/{token}/verify"),
        Some(json!({ "national_id": "0601234567" })),
    )
    .await;

    let evaluation = store.evaluation(evaluation_id).unwrap().unwrap();
    let selected = evaluation.selected_questions.unwrap();
    let big_five = store
        .instrument_by_kind(InstrumentKind::BigFive)
        .unwrap()
        .unwrap();
    let question_id = store
        .questions_for_instrument(big_five.id)
        .unwrap()
        .into_iter()
        .find(|q| selected.contains(&q.id))
        .unwrap()
        .id;

    for value in [2, 4] {
        let (status, _) = send(
            &app,
            "POST",
            &format!("/api/public/evaluations/{token}/responses/psychometric"),
            Some(json!({ "question_id": question_id, "value": value })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let rows: Vec<_> = store
        .psychometric_responses(evaluation_id)
        .unwrap()
        .into_iter()
        .filter(|r| r.question_id == question_id)
        .collect();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].value, 4);
}

#[tokio::test]
async fn expired_link_is_gone_and_stays_expired() {
    let (app, store, profile_id) = app();
    let (evaluation_id, token) = create_evaluation(&app, profile_id, "1104567890").await;

    let mut evaluation = store.evaluation(evaluation_id).unwrap().unwrap();
    evaluation.expires_at = Utc::now() - Duration::hours(1);
    store.update_evaluation(&evaluation).unwrap();

    let (status, _) = send(&app, "GET", &format!("/api/public/evaluations/{token}"), None).await;
    assert_eq!(status, StatusCode::GONE);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/public/evaluations/{token}/verify"),
        Some(json!({ "national_id": "1104567890" })),
    )
    .await;
    assert_eq!(status, StatusCode::GONE);

    let stored = store.evaluation(evaluation_id).unwrap().unwrap();
    assert_eq!(
        stored.status,
        psychoeval_backend::models::evaluation::EvaluationStatus::Expired
    );
}

#[tokio::test]
async fn unknown_token_is_not_found() {
    let (app, _, _) = app();
    let (status, _) = send(&app, "GET", "/api/public/evaluations/nosuchtoken", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn manual_verdict_overrides_automatic() {
    let (app, store, profile_id) = app();
    let (evaluation_id, token) = create_evaluation(&app, profile_id, "1309876543").await;
    send(
        &app,
        "POST",
        &format!("/api/public/evaluations/{token}/verify"),
        Some(json!({ "national_id": "1309876543" })),
    )
    .await;
    answer_all_instruments(&app, &store, &token).await;
    send(&app, "POST", &format!("/api/public/evaluations/{token}/finalize"), None).await;

    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/panel/evaluations/{evaluation_id}/verdict"),
        Some(json!({ "verdict": "NO_APTO", "observations": "References did not check out." })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "verdict failed: {body}");
    assert_eq!(body["manual_verdict"], "NO_APTO");
    assert_eq!(body["final_verdict"], "NO_APTO");

    // Recomputation preserves the manual override.
    send(
        &app,
        "POST",
        &format!("/api/panel/evaluations/{evaluation_id}/recompute"),
        None,
    )
    .await;
    let result = store.result(evaluation_id).unwrap().unwrap();
    assert_eq!(
        result.final_verdict,
        psychoeval_backend::models::result::Verdict::NoApto
    );
}

#[tokio::test]
async fn expire_sweep_marks_overdue_pending_sessions() {
    let (app, store, profile_id) = app();
    let (evaluation_id, _token) = create_evaluation(&app, profile_id, "1801234567").await;

    let mut evaluation = store.evaluation(evaluation_id).unwrap().unwrap();
    evaluation.expires_at = Utc::now() - Duration::hours(2);
    store.update_evaluation(&evaluation).unwrap();

    let (status, body) = send(&app, "POST", "/api/panel/maintenance/expire", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expired"], 1);
}

#[tokio::test]
async fn public_surface_is_rate_limited_per_path() {
    init_test_config();
    let store = Arc::new(MemoryStore::new());
    seed_demo_catalog(store.as_ref()).expect("seed catalog");
    let state = AppState::new(store.clone(), Arc::new(StubGrader));
    let app = routes::router(state, 2);

    let path = "/api/public/evaluations/some-token";
    let (first, _) = send(&app, "GET", path, None).await;
    let (second, _) = send(&app, "GET", path, None).await;
    let (third, _) = send(&app, "GET", path, None).await;
    assert_eq!(first, StatusCode::NOT_FOUND);
    assert_eq!(second, StatusCode::NOT_FOUND);
    assert_eq!(third, StatusCode::TOO_MANY_REQUESTS);

    // The panel surface is not throttled.
    let (status, _) = send(&app, "GET", "/api/panel/evaluations", None).await;
    assert_eq!(status, StatusCode::OK);
}
