mod v1;

use axum::{Router, routing::get};

use crate::{handlers::health_handler, infra::app_state::AppState};

/// Assemble the full API router.
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .nest("/api/v1", v1::create_v1_router())
        .with_state(state)
}
