//! Mission lifecycle orchestration.
//!
//! Every mutating operation here runs inside a single database transaction:
//! claim checks, the mission status write, the parcel cascade and the
//! warehouse confirmation either all commit or all roll back, so a crash can
//! never leave a mission half-cascaded.

use rand::Rng;
use rand::distr::Alphanumeric;
use sqlx::{FromRow as _, PgConnection, PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use colis_model::{
    Demand, DemandID, DemandStatus, DriverID, LinkOrigin, Mission, MissionID,
    MissionStatus, Parcel, ParcelID, ParcelLinkSubStatus, ShipperID,
    TrackingHistoryEntry,
};

use crate::codes::CompletionCodeService;
use crate::demands::{ClaimRejection, DemandAggregator};
use crate::error::{CoreError, Result};
use crate::rows::{DemandRow, HistoryRow, MISSION_COLUMNS, MissionRow, ParcelRow};
use crate::sync::StatusSynchronizer;
use crate::warehouse::WarehouseResolver;

/// Visibility scope of the caller, derived from their role by the (external)
/// authentication layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AgencyScope {
    /// Sees every mission.
    #[default]
    Unscoped,
    /// Sees only missions whose denormalized agency matches
    /// (case-insensitive exact).
    Agency(String),
}

impl AgencyScope {
    /// Scope limited to one agency.
    pub fn scoped(agency: impl Into<String>) -> Self {
        Self::Agency(agency.into())
    }

    /// Whether a mission with `agency` is visible under this scope.
    pub fn allows(&self, agency: &str) -> bool {
        match self {
            Self::Unscoped => true,
            Self::Agency(own) => own.to_lowercase() == agency.to_lowercase(),
        }
    }
}

/// Listing filter; ordering is always creation time descending.
#[derive(Debug, Clone)]
pub struct MissionFilter {
    /// Caller visibility scope.
    pub scope: AgencyScope,
    /// Optional status narrowing.
    pub status: Option<MissionStatus>,
    /// 1-based page.
    pub page: u32,
    /// Page size (clamped to 100).
    pub limit: u32,
}

impl Default for MissionFilter {
    fn default() -> Self {
        Self {
            scope: AgencyScope::Unscoped,
            status: None,
            page: 1,
            limit: 20,
        }
    }
}

/// One mission in a listing, with its cascaded link counts. The completion
/// code is redacted; listings are not privileged.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MissionSummary {
    /// The mission, code redacted.
    #[serde(flatten)]
    pub mission: Mission,
    /// Number of claimed demands.
    pub demand_count: i64,
    /// Number of linked parcels.
    pub parcel_link_count: i64,
}

/// A page of missions.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MissionPage {
    /// Missions on this page, newest first.
    pub missions: Vec<MissionSummary>,
    /// Total rows matching the filter.
    pub total: i64,
    /// Echoed page number.
    pub page: u32,
    /// Echoed page size.
    pub limit: u32,
}

/// A parcel as attached to one mission.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MissionParcel {
    /// The parcel record.
    #[serde(flatten)]
    pub parcel: Parcel,
    /// How it reached the mission.
    pub via: LinkOrigin,
    /// Per-parcel outcome within the mission.
    pub sub_status: ParcelLinkSubStatus,
}

/// A mission with its demands and parcels expanded.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MissionDetail {
    /// The mission, code redacted.
    #[serde(flatten)]
    pub mission: Mission,
    /// Claimed demands.
    pub demands: Vec<Demand>,
    /// Attached parcels with link metadata.
    pub parcels: Vec<MissionParcel>,
}

/// Mission-creation request.
#[derive(Debug, Clone)]
pub struct CreateMission {
    /// The driver assigned to the mission.
    pub driver_id: DriverID,
    /// Demands to claim.
    pub demand_ids: Vec<DemandID>,
    /// Parcels to attach directly (legacy direct-parcel mode).
    pub parcel_ids: Vec<ParcelID>,
    /// Originating shipper, direct mode only.
    pub shipper_id: Option<ShipperID>,
    /// Agency for direct mode (demand mode derives it from the first
    /// claimed demand).
    pub agency: Option<String>,
    /// When false, any per-demand rejection aborts the whole creation.
    pub allow_partial: bool,
}

/// Result of a successful mission creation.
#[derive(Debug, Clone)]
pub struct MissionCreated {
    /// The created mission, completion code included.
    pub mission: Mission,
    /// Demands actually claimed.
    pub claimed: Vec<DemandID>,
    /// Demands rejected, with reasons.
    pub rejected: Vec<(DemandID, ClaimRejection)>,
}

/// Result of a successful transition.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    /// The mission after the transition, code redacted.
    pub mission: Mission,
    /// Parcels moved by the cascade.
    pub updated_parcels: usize,
    /// Demands released back to the pool (cancellation only).
    pub released_demands: u64,
    /// Set when the terminal transition could not resolve a warehouse for
    /// the mission's agency (soft condition).
    pub unresolved_agency: bool,
}

/// Orchestrates mission creation, transitions and queries.
///
/// Holds the connection pool it was constructed with; the pool's lifecycle
/// (open/close) belongs to the process entry point.
#[derive(Debug, Clone)]
pub struct MissionLifecycleEngine {
    pool: PgPool,
    aggregator: DemandAggregator,
    codes: CompletionCodeService,
    synchronizer: StatusSynchronizer,
    resolver: WarehouseResolver,
}

impl MissionLifecycleEngine {
    /// Build the engine over an externally owned pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            aggregator: DemandAggregator,
            codes: CompletionCodeService,
            synchronizer: StatusSynchronizer,
            resolver: WarehouseResolver,
        }
    }

    /// Create a mission: claim demands (and/or attach parcels directly),
    /// issue the completion code, and persist the links, all in one
    /// transaction.
    #[instrument(skip(self, request), fields(driver = %request.driver_id))]
    pub async fn create_mission(&self, request: CreateMission) -> Result<MissionCreated> {
        let mut tx = self.pool.begin().await?;

        let outcome = self
            .aggregator
            .lock_claimable(&mut tx, &request.demand_ids)
            .await?;

        if !request.allow_partial {
            if let Some((id, reason)) = outcome.rejected.first() {
                return Err(match reason {
                    ClaimRejection::AlreadyAssigned => CoreError::AlreadyAssigned(*id),
                    ClaimRejection::NotAccepted => CoreError::InvalidTransition {
                        from: "unaccepted demand".to_string(),
                        to: "claimed".to_string(),
                    },
                    ClaimRejection::NotFound => CoreError::not_found("demand", id),
                });
            }
        }

        let direct_ids: Vec<Uuid> = request.parcel_ids.iter().map(ParcelID::to_uuid).collect();
        if outcome.claimed.is_empty() && direct_ids.is_empty() {
            return Err(CoreError::NoDemandsClaimed {
                rejected: outcome.rejected,
            });
        }

        // Demand mode denormalizes the agency from the first claimed demand;
        // direct mode requires it in the request.
        let agency = match outcome.claimed.first() {
            Some(demand) => demand.agency.clone(),
            None => request.agency.clone().ok_or_else(|| {
                CoreError::InvalidRequest(
                    "direct-parcel mission creation requires an agency".to_string(),
                )
            })?,
        };

        let mission_id = MissionID::new();
        let completion_code = self.codes.issue();
        let code = mission_code();

        let row = sqlx::query_as::<_, MissionRow>(&format!(
            r#"
            INSERT INTO missions (id, code, driver_id, shipper_id, agency, status, completion_code)
            VALUES ($1, $2, $3, $4, $5, 'pending', $6)
            RETURNING {MISSION_COLUMNS}
            "#,
        ))
        .bind(mission_id.to_uuid())
        .bind(&code)
        .bind(request.driver_id.to_uuid())
        .bind(request.shipper_id.map(|s| s.to_uuid()))
        .bind(&agency)
        .bind(&completion_code)
        .fetch_one(&mut *tx)
        .await?;

        let mut parcel_ids = self
            .aggregator
            .link_demands(&mut tx, mission_id, &outcome.claimed)
            .await?;

        if !direct_ids.is_empty() {
            let attached = self
                .aggregator
                .link_direct_parcels(&mut tx, mission_id, &direct_ids)
                .await?;
            parcel_ids.extend(attached);
        }
        parcel_ids.sort_unstable();
        parcel_ids.dedup();

        sqlx::query("UPDATE missions SET parcel_count = $2 WHERE id = $1")
            .bind(mission_id.to_uuid())
            .bind(parcel_ids.len() as i32)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let mut mission = row.into_mission()?;
        mission.parcel_count = parcel_ids.len() as i32;

        info!(
            mission = %mission.code,
            claimed = outcome.claimed.len(),
            rejected = outcome.rejected.len(),
            parcels = parcel_ids.len(),
            "mission created"
        );

        Ok(MissionCreated {
            mission,
            claimed: outcome.claimed.iter().map(|d| d.id).collect(),
            rejected: outcome.rejected,
        })
    }

    /// Apply a state-machine transition and cascade it onto the mission's
    /// parcels in the same transaction.
    ///
    /// The terminal `AtWarehouse` transition additionally requires the
    /// mission's completion code and confirms the parcels' warehouse
    /// assignment; cancellation releases the claimed demands instead of
    /// cascading.
    #[instrument(skip(self, code), fields(mission = %mission_id, target = %target))]
    pub async fn transition(
        &self,
        mission_id: MissionID,
        target: MissionStatus,
        code: Option<&str>,
    ) -> Result<TransitionOutcome> {
        let mut tx = self.pool.begin().await?;

        // The row lock serializes a driver double-submitting the same call:
        // the second attempt sees the already-advanced state and fails the
        // state-machine check with no side effect.
        let mission = fetch_mission_for_update(&mut tx, mission_id).await?;

        if !mission.status.can_transition_to(target) {
            return Err(CoreError::InvalidTransition {
                from: mission.status.to_string(),
                to: target.to_string(),
            });
        }

        if target == MissionStatus::AtWarehouse {
            let issued = mission.completion_code.as_deref().unwrap_or_default();
            if !self.codes.verify(issued, code.unwrap_or_default()) {
                return Err(CoreError::CodeMismatch(mission_id));
            }
        }

        sqlx::query(
            r#"
            UPDATE missions
            SET status = $2,
                accepted_at = CASE WHEN $2 = 'to_pickup' THEN now() ELSE accepted_at END,
                completed_at = CASE WHEN $2 = 'at_warehouse' THEN now() ELSE completed_at END
            WHERE id = $1
            "#,
        )
        .bind(mission_id.to_uuid())
        .bind(target.as_str())
        .execute(&mut *tx)
        .await?;

        let mut released_demands = 0;
        let mut updated_parcels = 0;
        let mut unresolved_agency = false;

        if target == MissionStatus::Cancelled {
            released_demands = self.aggregator.release_claims(&mut tx, mission_id).await?;
        } else {
            let cascade = self.synchronizer.cascade(&mut tx, &mission, target).await?;
            updated_parcels = cascade.updated_parcels;

            if target == MissionStatus::AtWarehouse {
                let resolved = self
                    .resolver
                    .assign_parcels_for_agency(
                        &mut tx,
                        &cascade.covered_parcel_ids,
                        &mission.agency,
                    )
                    .await?;
                unresolved_agency = resolved.is_none();
            }
        }

        tx.commit().await?;

        if unresolved_agency {
            warn!(mission = %mission.code, agency = %mission.agency, "mission completed with unresolved agency");
        }
        info!(
            mission = %mission.code,
            from = %mission.status,
            to = %target,
            updated_parcels,
            released_demands,
            "mission transitioned"
        );

        let mission = self.fetch_mission(mission_id).await?;
        Ok(TransitionOutcome {
            mission: mission.redacted(),
            updated_parcels,
            released_demands,
            unresolved_agency,
        })
    }

    /// Filtered, paginated mission listing, newest first.
    pub async fn list_missions(&self, filter: &MissionFilter) -> Result<MissionPage> {
        let limit = filter.limit.clamp(1, 100);
        let page = filter.page.max(1);
        let offset = (page - 1) as i64 * limit as i64;

        let mut builder = QueryBuilder::<Postgres>::new(format!(
            r#"
            SELECT {MISSION_COLUMNS},
                (SELECT count(*) FROM mission_demands md WHERE md.mission_id = missions.id) AS demand_count,
                (SELECT count(*) FROM mission_parcels mp WHERE mp.mission_id = missions.id) AS parcel_link_count
            FROM missions
            WHERE 1=1
            "#,
        ));
        push_filters(&mut builder, filter);
        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind(limit as i64);
        builder.push(" OFFSET ");
        builder.push_bind(offset);

        let rows = builder.build().fetch_all(&self.pool).await?;

        let mut missions = Vec::with_capacity(rows.len());
        for row in rows {
            use sqlx::Row as _;
            let demand_count: i64 = row.try_get("demand_count")?;
            let parcel_link_count: i64 = row.try_get("parcel_link_count")?;
            let mission_row = MissionRow::from_row(&row)?;
            missions.push(MissionSummary {
                mission: mission_row.into_mission()?.redacted(),
                demand_count,
                parcel_link_count,
            });
        }

        let mut count_builder =
            QueryBuilder::<Postgres>::new("SELECT count(*) FROM missions WHERE 1=1");
        push_filters(&mut count_builder, filter);
        let total: i64 = count_builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        Ok(MissionPage {
            missions,
            total,
            page,
            limit,
        })
    }

    /// Mission with demands and parcels expanded, subject to the caller's
    /// agency scope. Missions outside the scope are reported as not found.
    pub async fn get_mission(
        &self,
        mission_id: MissionID,
        scope: &AgencyScope,
    ) -> Result<MissionDetail> {
        let mission = self.fetch_mission(mission_id).await?;
        if !scope.allows(&mission.agency) {
            return Err(CoreError::not_found("mission", mission_id));
        }

        let demand_rows = sqlx::query_as::<_, DemandRow>(
            r#"
            SELECT d.id, d.shipper_id, d.agency, d.status, d.created_at
            FROM demands d
            JOIN mission_demands md ON md.demand_id = d.id
            WHERE md.mission_id = $1
            ORDER BY d.created_at
            "#,
        )
        .bind(mission_id.to_uuid())
        .fetch_all(&self.pool)
        .await?;
        let demands = demand_rows
            .into_iter()
            .map(DemandRow::into_demand)
            .collect::<Result<Vec<_>>>()?;

        let parcel_rows = sqlx::query(
            r#"
            SELECT p.id, p.tracking_code, p.status, p.warehouse_id, p.shipper_id,
                   p.created_at, mp.via, mp.sub_status
            FROM parcels p
            JOIN mission_parcels mp ON mp.parcel_id = p.id
            WHERE mp.mission_id = $1
            ORDER BY p.id
            "#,
        )
        .bind(mission_id.to_uuid())
        .fetch_all(&self.pool)
        .await?;

        let mut parcels = Vec::with_capacity(parcel_rows.len());
        for row in parcel_rows {
            use sqlx::Row as _;
            let via: String = row.try_get("via")?;
            let sub_status: String = row.try_get("sub_status")?;
            let parcel_row = ParcelRow::from_row(&row)?;
            parcels.push(MissionParcel {
                parcel: parcel_row.into_parcel()?,
                via: via.parse()?,
                sub_status: sub_status.parse()?,
            });
        }

        Ok(MissionDetail {
            mission: mission.redacted(),
            demands,
            parcels,
        })
    }

    /// Privileged read of the mission's completion code.
    pub async fn security_code(&self, mission_id: MissionID) -> Result<String> {
        let mission = self.fetch_mission(mission_id).await?;
        mission
            .completion_code
            .ok_or_else(|| CoreError::not_found("completion code", mission_id))
    }

    /// Demands eligible for a new mission.
    pub async fn available_demands(&self) -> Result<Vec<Demand>> {
        self.aggregator.available_demands(&self.pool).await
    }

    /// Review-staff mutation: accept or reject a submitted demand.
    pub async fn review_demand(
        &self,
        demand_id: DemandID,
        status: DemandStatus,
    ) -> Result<Demand> {
        let mut tx = self.pool.begin().await?;
        let demand = self
            .aggregator
            .set_review_status(&mut tx, demand_id, status)
            .await?;
        tx.commit().await?;
        Ok(demand)
    }

    /// Append-only tracking trail of one parcel, oldest first.
    pub async fn parcel_history(&self, parcel_id: ParcelID) -> Result<Vec<TrackingHistoryEntry>> {
        let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM parcels WHERE id = $1")
            .bind(parcel_id.to_uuid())
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(CoreError::not_found("parcel", parcel_id));
        }

        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT id, parcel_id, status, previous_status, actor, note, created_at
            FROM tracking_history
            WHERE parcel_id = $1
            ORDER BY created_at, id
            "#,
        )
        .bind(parcel_id.to_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(HistoryRow::into_entry).collect()
    }

    async fn fetch_mission(&self, mission_id: MissionID) -> Result<Mission> {
        sqlx::query_as::<_, MissionRow>(&format!(
            "SELECT {MISSION_COLUMNS} FROM missions WHERE id = $1",
        ))
        .bind(mission_id.to_uuid())
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| CoreError::not_found("mission", mission_id))?
        .into_mission()
    }
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &MissionFilter) {
    if let AgencyScope::Agency(agency) = &filter.scope {
        builder.push(" AND lower(agency) = lower(");
        builder.push_bind(agency.clone());
        builder.push(")");
    }
    if let Some(status) = filter.status {
        builder.push(" AND status = ");
        builder.push_bind(status.as_str());
    }
}

async fn fetch_mission_for_update(
    conn: &mut PgConnection,
    mission_id: MissionID,
) -> Result<Mission> {
    sqlx::query_as::<_, MissionRow>(&format!(
        "SELECT {MISSION_COLUMNS} FROM missions WHERE id = $1 FOR UPDATE",
    ))
    .bind(mission_id.to_uuid())
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| CoreError::not_found("mission", mission_id))?
    .into_mission()
}

fn mission_code() -> String {
    let suffix: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(|b| (b as char).to_ascii_uppercase())
        .collect();
    format!("M-{suffix}")
}
