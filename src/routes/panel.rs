use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use uuid::Uuid;
use validator::Validate;

use crate::dto::panel_dto::{
    AiGradeResponse, CreateEvaluationRequest, CreateEvaluationResponse, CreateProfileRequest,
    EvaluationDetailResponse, EvaluationSummary, ExpireSweepResponse, ManualVerdictRequest,
    ReviewProjectiveRequest,
};
use crate::error::Result;
use crate::models::profile::TargetProfile;
use crate::services::ai_grading;
use crate::services::session::NewEvaluation;
use crate::AppState;

#[utoipa::path(
    post,
    path = "/api/panel/evaluations",
    request_body = CreateEvaluationRequest,
    responses(
        (status = 201, description = "Evaluation created, access token issued", body = CreateEvaluationResponse),
        (status = 400, description = "Invalid payload")
    )
)]
#[axum::debug_handler]
pub async fn create_evaluation(
    State(state): State<AppState>,
    Json(req): Json<CreateEvaluationRequest>,
) -> Result<Response> {
    req.validate()?;
    let evaluation = state.sessions.create_evaluation(NewEvaluation {
        full_name: req.full_name,
        national_id: req.national_id,
        email: req.email,
        phone: req.phone,
        applied_position: req.applied_position,
        profile_id: req.profile_id,
        expires_in_hours: req.expires_in_hours,
    })?;

    let response = CreateEvaluationResponse {
        id: evaluation.id,
        token: evaluation.token,
        expires_at: evaluation.expires_at,
        status: evaluation.status,
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

#[axum::debug_handler]
pub async fn list_evaluations(State(state): State<AppState>) -> Result<Response> {
    let mut summaries = Vec::new();
    for evaluation in state.sessions.list()? {
        let final_verdict = state.store.result(evaluation.id)?.map(|r| r.final_verdict);
        summaries.push(EvaluationSummary {
            id: evaluation.id,
            full_name: evaluation.full_name,
            national_id: evaluation.national_id,
            status: evaluation.status,
            created_at: evaluation.created_at,
            expires_at: evaluation.expires_at,
            final_verdict,
        });
    }
    Ok(Json(summaries).into_response())
}

#[axum::debug_handler]
pub async fn get_evaluation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let evaluation = state.sessions.get(id)?;
    let result = state.store.result(id)?;
    let pending_projectives = state.store.unreviewed_projectives(id)?.len();
    Ok(Json(EvaluationDetailResponse {
        evaluation,
        result,
        pending_projectives,
    })
    .into_response())
}

#[axum::debug_handler]
pub async fn cancel_evaluation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response> {
    let evaluation = state.sessions.cancel(id)?;
    Ok(Json(evaluation).into_response())
}

#[axum::debug_handler]
pub async fn recompute(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Response> {
    let result = state.sessions.recompute(id)?;
    Ok(Json(result).into_response())
}

#[axum::debug_handler]
pub async fn ai_grade(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Response> {
    state.sessions.get(id)?;
    let suggestions =
        ai_grading::grade_pending(state.store.as_ref(), state.grader.as_ref(), id).await?;
    Ok(Json(AiGradeResponse { suggestions }).into_response())
}

#[axum::debug_handler]
pub async fn review_projective(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ReviewProjectiveRequest>,
) -> Result<Response> {
    req.validate()?;
    let evaluation =
        state
            .sessions
            .review_projective(id, req.response_id, req.score, req.observations)?;
    Ok(Json(evaluation).into_response())
}

#[axum::debug_handler]
pub async fn manual_verdict(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ManualVerdictRequest>,
) -> Result<Response> {
    req.validate()?;
    let result = state
        .sessions
        .set_manual_verdict(id, req.verdict, req.observations)?;
    Ok(Json(result).into_response())
}

#[axum::debug_handler]
pub async fn create_profile(
    State(state): State<AppState>,
    Json(req): Json<CreateProfileRequest>,
) -> Result<Response> {
    req.validate()?;
    let mut profile = TargetProfile::standard(req.name);
    if let Some(v) = req.min_responsibility {
        profile.min_responsibility = v;
    }
    if let Some(v) = req.min_agreeableness {
        profile.min_agreeableness = v;
    }
    if let Some(v) = req.max_neuroticism {
        profile.max_neuroticism = v;
    }
    if let Some(v) = req.min_openness {
        profile.min_openness = v;
    }
    if let Some(v) = req.min_extraversion {
        profile.min_extraversion = v;
    }
    if let Some(v) = req.min_commitment {
        profile.min_commitment = v;
    }
    if let Some(v) = req.min_obedience {
        profile.min_obedience = v;
    }
    if let Some(v) = req.min_memory_pct {
        profile.min_memory_pct = v;
    }
    if let Some(v) = req.min_matrices_pct {
        profile.min_matrices_pct = v;
    }
    if let Some(v) = req.min_situational_pct {
        profile.min_situational_pct = v;
    }
    if let Some(v) = req.min_attention_pct {
        profile.min_attention_pct = v;
    }
    if let Some(v) = req.verdict_method {
        profile.verdict_method = v;
    }
    state.store.insert_profile(profile.clone())?;
    Ok((StatusCode::CREATED, Json(profile)).into_response())
}

#[axum::debug_handler]
pub async fn list_profiles(State(state): State<AppState>) -> Result<Response> {
    Ok(Json(state.store.profiles()?).into_response())
}

#[axum::debug_handler]
pub async fn expire_overdue(State(state): State<AppState>) -> Result<Response> {
    let expired = state.sessions.expire_overdue()?;
    Ok(Json(ExpireSweepResponse { expired }).into_response())
}
