// API routes and handlers

pub mod admin;
pub mod attendance;
pub mod auth;
pub mod dashboard;
pub mod exercise_entries;
pub mod gyms;
pub mod health;
pub mod memberships;
pub mod notices;
pub mod recommendations;
pub mod routes;
pub mod routines;

use std::sync::Arc;

use axum::extract::FromRef;
use sqlx::PgPool;

use crate::auth::AuthService;
use crate::services::ExerciseRecommender;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub auth_service: AuthService,
    pub recommender: Arc<ExerciseRecommender>,
}

impl AppState {
    pub fn new(db: PgPool, auth_service: AuthService) -> Self {
        Self {
            db,
            auth_service,
            recommender: Arc::new(ExerciseRecommender::default()),
        }
    }
}

impl FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        state.auth_service.clone()
    }
}
