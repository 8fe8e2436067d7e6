pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::intake::handle_extract_resume_text;
use crate::state::AppState;
use crate::tailoring::handlers;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/generations",
            post(handlers::handle_create_generation),
        )
        .route(
            "/api/v1/generations/:id",
            get(handlers::handle_get_generation),
        )
        .route(
            "/api/v1/resume-text/extract",
            post(handle_extract_resume_text),
        )
        .with_state(state)
}
