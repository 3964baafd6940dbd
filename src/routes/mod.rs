pub mod health;
pub mod panel;
pub mod public;

use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};

use crate::middleware::rate_limit::{path_throttle_middleware, PathRateLimiter};
use crate::AppState;

/// Full application router. The candidate-facing surface carries a
/// per-path request throttle; token-scoped URLs each get their own budget.
pub fn router(state: AppState, public_rps: u32) -> Router {
    let public_api = Router::new()
        .route("/api/public/evaluations/:token", get(public::get_session))
        .route(
            "/api/public/evaluations/:token/verify",
            post(public::verify_identity),
        )
        .route(
            "/api/public/evaluations/:token/instruments/:kind",
            get(public::get_instrument),
        )
        .route(
            "/api/public/evaluations/:token/instruments/:kind/projective",
            post(public::save_projective),
        )
        .route(
            "/api/public/evaluations/:token/responses/psychometric",
            post(public::save_psychometric),
        )
        .route(
            "/api/public/evaluations/:token/responses/memory",
            post(public::save_memory),
        )
        .route(
            "/api/public/evaluations/:token/responses/matrix",
            post(public::save_matrix),
        )
        .route(
            "/api/public/evaluations/:token/responses/situational",
            post(public::save_situational),
        )
        .route(
            "/api/public/evaluations/:token/responses/attention",
            post(public::save_attention),
        )
        .route(
            "/api/public/evaluations/:token/finalize",
            post(public::finalize),
        )
        .layer(axum::middleware::from_fn_with_state(
            PathRateLimiter::new(public_rps, Duration::from_secs(1)),
            path_throttle_middleware,
        ));

    let panel_api = Router::new()
        .route(
            "/api/panel/evaluations",
            get(panel::list_evaluations).post(panel::create_evaluation),
        )
        .route("/api/panel/evaluations/:id", get(panel::get_evaluation))
        .route(
            "/api/panel/evaluations/:id/cancel",
            post(panel::cancel_evaluation),
        )
        .route(
            "/api/panel/evaluations/:id/recompute",
            post(panel::recompute),
        )
        .route("/api/panel/evaluations/:id/ai-grade", post(panel::ai_grade))
        .route(
            "/api/panel/evaluations/:id/review",
            post(panel::review_projective),
        )
        .route(
            "/api/panel/evaluations/:id/verdict",
            post(panel::manual_verdict),
        )
        .route(
            "/api/panel/profiles",
            get(panel::list_profiles).post(panel::create_profile),
        )
        .route(
            "/api/panel/maintenance/expire",
            post(panel::expire_overdue),
        );

    Router::new()
        .route("/health", get(health::health))
        .merge(public_api)
        .merge(panel_api)
        .with_state(state)
}
