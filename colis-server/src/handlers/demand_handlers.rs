use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use uuid::Uuid;

use colis_model::{Demand, DemandID, DemandStatus};

use crate::{errors::AppResult, infra::app_state::AppState};

#[derive(Debug, Deserialize)]
pub struct ReviewDemandRequest {
    pub status: DemandStatus,
}

/// `PUT /demands/{id}`: review-staff acceptance or rejection of a submitted
/// demand.
pub async fn review_demand_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ReviewDemandRequest>,
) -> AppResult<Json<Demand>> {
    let demand = state
        .engine
        .review_demand(DemandID::from(id), body.status)
        .await?;
    Ok(Json(demand))
}
