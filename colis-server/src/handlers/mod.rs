pub mod demand_handlers;
pub mod mission_handlers;
pub mod parcel_handlers;

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::{errors::AppResult, infra::app_state::AppState};

/// `GET /health`: liveness probe including a datastore round trip.
pub async fn health_handler(State(state): State<AppState>) -> AppResult<Json<Value>> {
    colis_core::db::health_check(&state.pool).await?;
    Ok(Json(json!({ "status": "ok" })))
}
