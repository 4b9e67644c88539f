use axum::{
    Router,
    routing::{get, post, put},
};

use crate::{
    handlers::{
        demand_handlers::review_demand_handler,
        mission_handlers::{
            available_demands_handler, create_mission_handler, get_mission_handler,
            list_missions_handler, security_code_handler, transition_mission_handler,
        },
        parcel_handlers::parcel_history_handler,
    },
    infra::app_state::AppState,
};

/// Create all v1 API routes.
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        // Mission lifecycle
        .route("/missions", post(create_mission_handler))
        .route("/missions", get(list_missions_handler))
        .route("/missions/available-demands", get(available_demands_handler))
        .route("/missions/{id}", get(get_mission_handler))
        .route("/missions/{id}", put(transition_mission_handler))
        .route("/missions/{id}/security-code", get(security_code_handler))
        // Demand review
        .route("/demands/{id}", put(review_demand_handler))
        // Parcel tracking
        .route("/parcels/{id}/history", get(parcel_history_handler))
}
