use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use colis_model::{ParcelID, TrackingHistoryEntry};

use crate::{errors::AppResult, infra::app_state::AppState};

/// `GET /parcels/{id}/history`: the append-only tracking trail, oldest
/// first.
pub async fn parcel_history_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<TrackingHistoryEntry>>> {
    let history = state.engine.parcel_history(ParcelID::from(id)).await?;
    Ok(Json(history))
}
