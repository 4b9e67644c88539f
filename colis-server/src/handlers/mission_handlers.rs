use std::future::Future;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use colis_core::{
    AgencyScope, ClaimRejection, CoreError, CreateMission, MissionFilter, MissionPage,
    MissionParcel,
};
use colis_model::{Demand, DemandID, Mission, MissionID, MissionStatus, ParcelID};

use crate::{errors::AppResult, infra::app_state::AppState};

/// Header the external authentication layer uses to convey the caller's
/// agency scope; absent means an unscoped operator.
pub const AGENCY_SCOPE_HEADER: &str = "x-agency-scope";

/// Re-run `op` once when it fails with an unclassified constraint violation;
/// a second failure (or any other error) surfaces unchanged.
pub(crate) async fn retry_once<T, F, Fut>(op: F) -> Result<T, CoreError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, CoreError>>,
{
    match op().await {
        Err(CoreError::ConstraintViolation(_)) => op().await,
        other => other,
    }
}

pub(crate) fn scope_from(headers: &HeaderMap, agency_param: Option<&str>) -> AgencyScope {
    let header_scope = headers
        .get(AGENCY_SCOPE_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty());

    match header_scope.or(agency_param) {
        Some(agency) => AgencyScope::scoped(agency),
        None => AgencyScope::Unscoped,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateMissionRequest {
    pub driver_id: Uuid,
    #[serde(default)]
    pub demand_ids: Vec<Uuid>,
    /// Legacy direct-parcel mode.
    #[serde(default)]
    pub parcel_ids: Vec<Uuid>,
    pub shipper_id: Option<Uuid>,
    /// Required in direct-parcel mode; ignored when demands are claimed.
    pub agency: Option<String>,
    /// When false, any per-demand rejection aborts the creation.
    #[serde(default = "default_true")]
    pub allow_partial: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct RejectedDemandDto {
    pub demand_id: DemandID,
    pub reason: ClaimRejection,
}

#[derive(Debug, Serialize)]
pub struct MissionCreatedDto {
    /// The created mission, completion code included: this response is the
    /// dispatcher's one chance to hand the code to the warehouse.
    #[serde(flatten)]
    pub mission: Mission,
    pub claimed: Vec<DemandID>,
    pub rejected: Vec<RejectedDemandDto>,
}

/// `POST /missions`
pub async fn create_mission_handler(
    State(state): State<AppState>,
    Json(body): Json<CreateMissionRequest>,
) -> AppResult<(StatusCode, Json<MissionCreatedDto>)> {
    let request = CreateMission {
        driver_id: body.driver_id.into(),
        demand_ids: body.demand_ids.iter().copied().map(DemandID::from).collect(),
        parcel_ids: body.parcel_ids.iter().copied().map(ParcelID::from).collect(),
        shipper_id: body.shipper_id.map(Into::into),
        agency: body.agency.clone(),
        allow_partial: body.allow_partial,
    };

    let created = retry_once(|| state.engine.create_mission(request.clone())).await?;

    Ok((
        StatusCode::CREATED,
        Json(MissionCreatedDto {
            mission: created.mission,
            claimed: created.claimed,
            rejected: created
                .rejected
                .into_iter()
                .map(|(demand_id, reason)| RejectedDemandDto { demand_id, reason })
                .collect(),
        }),
    ))
}

#[derive(Debug, Clone, Deserialize)]
pub struct TransitionRequest {
    pub status: MissionStatus,
    pub code: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TransitionResponseDto {
    #[serde(flatten)]
    pub mission: Mission,
    pub parcels: Vec<MissionParcel>,
    pub updated_parcels: usize,
    pub released_demands: u64,
    pub unresolved_agency: bool,
}

/// `PUT /missions/{id}`: apply a state-machine transition.
pub async fn transition_mission_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<TransitionRequest>,
) -> AppResult<Json<TransitionResponseDto>> {
    let mission_id = MissionID::from(id);
    let code = body.code.as_deref();

    let outcome = retry_once(|| state.engine.transition(mission_id, body.status, code)).await?;

    let detail = state
        .engine
        .get_mission(mission_id, &AgencyScope::Unscoped)
        .await?;

    Ok(Json(TransitionResponseDto {
        mission: outcome.mission,
        parcels: detail.parcels,
        updated_parcels: outcome.updated_parcels,
        released_demands: outcome.released_demands,
        unresolved_agency: outcome.unresolved_agency,
    }))
}

#[derive(Debug, Deserialize)]
pub struct ListMissionsQuery {
    pub agency: Option<String>,
    pub status: Option<MissionStatus>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// `GET /missions?agency=&status=&page=&limit=`
pub async fn list_missions_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<ListMissionsQuery>,
) -> AppResult<Json<MissionPage>> {
    let filter = MissionFilter {
        scope: scope_from(&headers, query.agency.as_deref()),
        status: query.status,
        page: query.page.unwrap_or(1),
        limit: query.limit.unwrap_or(20),
    };

    let page = state.engine.list_missions(&filter).await?;
    Ok(Json(page))
}

/// `GET /missions/{id}`
pub async fn get_mission_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> AppResult<Json<colis_core::MissionDetail>> {
    let scope = scope_from(&headers, None);
    let detail = state.engine.get_mission(MissionID::from(id), &scope).await?;
    Ok(Json(detail))
}

#[derive(Debug, Serialize)]
pub struct SecurityCodeDto {
    pub mission_id: MissionID,
    pub code: String,
}

/// `GET /missions/{id}/security-code` (privileged)
pub async fn security_code_handler(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<SecurityCodeDto>> {
    let mission_id = MissionID::from(id);
    let code = state.engine.security_code(mission_id).await?;
    Ok(Json(SecurityCodeDto { mission_id, code }))
}

/// `GET /missions/available-demands`
pub async fn available_demands_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<Demand>>> {
    let demands = state.engine.available_demands().await?;
    Ok(Json(demands))
}
