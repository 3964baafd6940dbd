pub mod config;
pub mod dto;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;
pub mod utils;

use std::sync::Arc;

use crate::services::ai_grading::ProjectiveGrader;
use crate::services::scoring::ScoringService;
use crate::services::session::SessionService;
use crate::store::EvaluationStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EvaluationStore>,
    pub sessions: SessionService,
    pub scoring: ScoringService,
    pub grader: Arc<dyn ProjectiveGrader>,
}

impl AppState {
    pub fn new(store: Arc<dyn EvaluationStore>, grader: Arc<dyn ProjectiveGrader>) -> Self {
        let config = crate::config::get_config();

        let scoring = ScoringService::new(store.clone(), config.default_profile_id);
        let sessions = SessionService::new(
            store.clone(),
            scoring.clone(),
            config.evaluation_ttl_hours,
            config.max_verification_attempts,
        );

        Self {
            store,
            sessions,
            scoring,
            grader,
        }
    }
}
