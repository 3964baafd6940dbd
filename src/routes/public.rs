use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{IntoResponse, Json, Response},
};
use validator::Validate;

use crate::dto::public_dto::{
    FinalizeResponse, InstrumentPageResponse, PublicOption, PublicQuestion, SaveResponseResponse,
    SessionSummaryResponse, SubmitAttentionRequest, SubmitMatrixRequest, SubmitMemoryRequest,
    SubmitProjectiveRequest, SubmitPsychometricRequest, SubmitSituationalRequest,
    VerifyIdentityRequest, VerifyIdentityResponse,
};
use crate::error::{Error, Result};
use crate::models::evaluation::EvaluationStatus;
use crate::models::instrument::InstrumentKind;
use crate::AppState;

fn parse_kind(raw: &str) -> Result<InstrumentKind> {
    raw.parse()
        .map_err(|_| Error::NotFound("Instrument not found".to_string()))
}

fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(|v| v.trim().to_string())
}

fn user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string())
}

#[utoipa::path(
    get,
    path = "/api/public/evaluations/{token}",
    responses(
        (status = 200, description = "Session summary", body = SessionSummaryResponse),
        (status = 404, description = "Unknown token"),
        (status = 410, description = "Link expired")
    )
)]
#[axum::debug_handler]
pub async fn get_session(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response> {
    let evaluation = state.sessions.lookup(&token)?;
    if evaluation.status == EvaluationStatus::Expired {
        return Err(Error::Expired("The evaluation link has expired".to_string()));
    }

    let response = SessionSummaryResponse {
        candidate_name: evaluation.full_name,
        applied_position: evaluation.applied_position,
        status: evaluation.status,
        expires_at: evaluation.expires_at,
        current_instrument: evaluation.current_instrument,
        go_to_finalize: matches!(
            evaluation.status,
            EvaluationStatus::Completed | EvaluationStatus::Reviewed
        ),
    };
    Ok(Json(response).into_response())
}

#[utoipa::path(
    post,
    path = "/api/public/evaluations/{token}/verify",
    request_body = VerifyIdentityRequest,
    responses(
        (status = 200, description = "Identity confirmed, session started", body = VerifyIdentityResponse),
        (status = 401, description = "Identification number does not match"),
        (status = 409, description = "Verification locked or session not pending")
    )
)]
#[axum::debug_handler]
pub async fn verify_identity(
    State(state): State<AppState>,
    Path(token): Path<String>,
    headers: HeaderMap,
    Json(req): Json<VerifyIdentityRequest>,
) -> Result<Response> {
    req.validate()?;
    let (evaluation, first_instrument) = state.sessions.verify_identity(
        &token,
        &req.national_id,
        client_ip(&headers),
        user_agent(&headers),
    )?;

    let response = VerifyIdentityResponse {
        status: evaluation.status,
        first_instrument,
        total_questions: evaluation
            .selected_questions
            .map(|ids| ids.len())
            .unwrap_or(0),
    };
    Ok(Json(response).into_response())
}

#[axum::debug_handler]
pub async fn get_instrument(
    State(state): State<AppState>,
    Path((token, kind)): Path<(String, String)>,
) -> Result<Response> {
    let kind = parse_kind(&kind)?;
    let page = state.sessions.open_instrument(&token, kind)?;

    let questions = page
        .questions
        .into_iter()
        .map(|(question, options)| PublicQuestion {
            id: question.id,
            text: question.text,
            scale: question.scale,
            position: question.position,
            options: options
                .into_iter()
                .map(|option| PublicOption {
                    id: option.id,
                    text: option.text,
                    position: option.position,
                })
                .collect(),
        })
        .collect();

    let response = InstrumentPageResponse {
        kind: page.instrument.kind,
        name: page.instrument.name,
        instructions: page.instrument.instructions,
        time_limit_minutes: page.instrument.time_limit_minutes,
        questions,
        next: page.next,
    };
    Ok(Json(response).into_response())
}

fn saved() -> Response {
    Json(SaveResponseResponse { saved: true }).into_response()
}

#[axum::debug_handler]
pub async fn save_psychometric(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(req): Json<SubmitPsychometricRequest>,
) -> Result<Response> {
    req.validate()?;
    state.sessions.save_psychometric(&token, req)?;
    Ok(saved())
}

#[axum::debug_handler]
pub async fn save_memory(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(req): Json<SubmitMemoryRequest>,
) -> Result<Response> {
    req.validate()?;
    state.sessions.save_memory(&token, req)?;
    Ok(saved())
}

#[axum::debug_handler]
pub async fn save_matrix(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(req): Json<SubmitMatrixRequest>,
) -> Result<Response> {
    req.validate()?;
    state.sessions.save_matrix(&token, req)?;
    Ok(saved())
}

#[axum::debug_handler]
pub async fn save_situational(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(req): Json<SubmitSituationalRequest>,
) -> Result<Response> {
    req.validate()?;
    state.sessions.save_situational(&token, req)?;
    Ok(saved())
}

#[axum::debug_handler]
pub async fn save_attention(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(req): Json<SubmitAttentionRequest>,
) -> Result<Response> {
    req.validate()?;
    state.sessions.save_attention(&token, req)?;
    Ok(saved())
}

#[axum::debug_handler]
pub async fn save_projective(
    State(state): State<AppState>,
    Path((token, kind)): Path<(String, String)>,
    Json(req): Json<SubmitProjectiveRequest>,
) -> Result<Response> {
    req.validate()?;
    let kind = parse_kind(&kind)?;
    state.sessions.save_projective(&token, kind, req)?;
    Ok(saved())
}

#[utoipa::path(
    post,
    path = "/api/public/evaluations/{token}/finalize",
    responses(
        (status = 200, description = "Evaluation completed", body = FinalizeResponse),
        (status = 409, description = "Session cannot be finalized"),
        (status = 410, description = "Link expired")
    )
)]
#[axum::debug_handler]
pub async fn finalize(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<Response> {
    let evaluation = state.sessions.finalize(&token)?;
    let response = FinalizeResponse {
        status: evaluation.status,
        finished_at: evaluation.finished_at,
        message: "Evaluation submitted. The results will be reviewed by the evaluation team."
            .to_string(),
    };
    Ok(Json(response).into_response())
}
