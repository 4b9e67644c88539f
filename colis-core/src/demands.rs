//! Demand aggregation: claiming accepted demands into a mission and
//! expanding them into parcel links.
//!
//! Claim uniqueness is transactional: the creating transaction locks the
//! demand rows (`FOR UPDATE`, ordered by id so concurrent creations cannot
//! deadlock), re-checks for links to non-terminal missions, and only then
//! inserts. A racing creation observes the winner's link once the lock is
//! granted and rejects the demand instead of failing the whole call.

use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use colis_model::{Demand, DemandID, DemandStatus, MissionID};

use crate::error::{CoreError, Result};
use crate::rows::DemandRow;

/// Why a requested demand was not claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimRejection {
    /// Another active mission already links the demand.
    AlreadyAssigned,
    /// The demand is not in the `accepted` review state.
    NotAccepted,
    /// No such demand.
    NotFound,
}

/// Result of a claim attempt over a batch of demand ids.
#[derive(Debug, Clone)]
pub struct ClaimOutcome {
    /// Demands successfully locked and free to claim, in id order.
    pub claimed: Vec<Demand>,
    /// Per-demand rejection reasons for the rest.
    pub rejected: Vec<(DemandID, ClaimRejection)>,
}

/// Selects and claims demands for mission creation, and expands claimed
/// demands into mission-parcel links.
#[derive(Debug, Clone, Copy, Default)]
pub struct DemandAggregator;

impl DemandAggregator {
    /// Lock the requested demands and split them into claimable and
    /// rejected. Must run inside the mission-creation transaction; the row
    /// locks are what serialize racing claims.
    pub async fn lock_claimable(
        &self,
        conn: &mut PgConnection,
        demand_ids: &[DemandID],
    ) -> Result<ClaimOutcome> {
        let ids: Vec<Uuid> = demand_ids.iter().map(DemandID::to_uuid).collect();

        let rows = sqlx::query_as::<_, DemandRow>(
            r#"
            SELECT id, shipper_id, agency, status, created_at
            FROM demands
            WHERE id = ANY($1)
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(&ids)
        .fetch_all(&mut *conn)
        .await?;

        let mut rejected: Vec<(DemandID, ClaimRejection)> = demand_ids
            .iter()
            .filter(|id| !rows.iter().any(|r| r.id == id.to_uuid()))
            .map(|id| (*id, ClaimRejection::NotFound))
            .collect();

        let mut accepted = Vec::with_capacity(rows.len());
        for row in rows {
            let demand = row.into_demand()?;
            if demand.status == DemandStatus::Accepted {
                accepted.push(demand);
            } else {
                rejected.push((demand.id, ClaimRejection::NotAccepted));
            }
        }

        // Re-check under lock: a demand linked to any non-terminal mission
        // is taken.
        let accepted_ids: Vec<Uuid> = accepted.iter().map(|d| d.id.to_uuid()).collect();
        let taken: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT md.demand_id
            FROM mission_demands md
            JOIN missions m ON m.id = md.mission_id
            WHERE md.demand_id = ANY($1)
              AND m.status NOT IN ('at_warehouse', 'cancelled')
            "#,
        )
        .bind(&accepted_ids)
        .fetch_all(&mut *conn)
        .await?;

        let (claimed, already): (Vec<Demand>, Vec<Demand>) = accepted
            .into_iter()
            .partition(|d| !taken.contains(d.id.as_uuid()));
        rejected.extend(
            already
                .into_iter()
                .map(|d| (d.id, ClaimRejection::AlreadyAssigned)),
        );

        Ok(ClaimOutcome { claimed, rejected })
    }

    /// Insert the claim links for `demands` and expand their parcels into
    /// `mission_parcels` with origin `demand`. Returns the distinct parcel
    /// ids attached.
    pub async fn link_demands(
        &self,
        conn: &mut PgConnection,
        mission_id: MissionID,
        demands: &[Demand],
    ) -> Result<Vec<Uuid>> {
        let demand_ids: Vec<Uuid> = demands.iter().map(|d| d.id.to_uuid()).collect();

        sqlx::query(
            r#"
            INSERT INTO mission_demands (mission_id, demand_id)
            SELECT $1, d.id FROM UNNEST($2::uuid[]) AS d(id)
            "#,
        )
        .bind(mission_id.to_uuid())
        .bind(&demand_ids)
        .execute(&mut *conn)
        .await?;

        // A parcel reachable through two claimed demands is linked once.
        let parcel_ids: Vec<Uuid> = sqlx::query_scalar(
            r#"
            INSERT INTO mission_parcels (mission_id, parcel_id, via)
            SELECT DISTINCT $1, dp.parcel_id, 'demand'
            FROM demand_parcels dp
            WHERE dp.demand_id = ANY($2)
            ON CONFLICT (mission_id, parcel_id) DO NOTHING
            RETURNING parcel_id
            "#,
        )
        .bind(mission_id.to_uuid())
        .bind(&demand_ids)
        .fetch_all(&mut *conn)
        .await?;

        Ok(parcel_ids)
    }

    /// Attach parcels directly (legacy direct-parcel mode), verifying each
    /// id exists. Returns the attached parcel ids.
    pub async fn link_direct_parcels(
        &self,
        conn: &mut PgConnection,
        mission_id: MissionID,
        parcel_ids: &[Uuid],
    ) -> Result<Vec<Uuid>> {
        let found: Vec<Uuid> = sqlx::query_scalar(
            "SELECT id FROM parcels WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(parcel_ids)
        .fetch_all(&mut *conn)
        .await?;

        if let Some(missing) = parcel_ids.iter().find(|id| !found.contains(id)) {
            return Err(CoreError::not_found("parcel", missing));
        }

        sqlx::query(
            r#"
            INSERT INTO mission_parcels (mission_id, parcel_id, via)
            SELECT $1, p.id, 'direct' FROM UNNEST($2::uuid[]) AS p(id)
            ON CONFLICT (mission_id, parcel_id) DO NOTHING
            "#,
        )
        .bind(mission_id.to_uuid())
        .bind(parcel_ids)
        .execute(&mut *conn)
        .await?;

        Ok(found)
    }

    /// Delete the mission's claim links, making the demands immediately
    /// claimable by a new mission. Used by cancellation only.
    pub async fn release_claims(
        &self,
        conn: &mut PgConnection,
        mission_id: MissionID,
    ) -> Result<u64> {
        let result = sqlx::query("DELETE FROM mission_demands WHERE mission_id = $1")
            .bind(mission_id.to_uuid())
            .execute(conn)
            .await?;

        Ok(result.rows_affected())
    }

    /// Demands eligible for a new mission: accepted and not linked to any
    /// non-terminal mission.
    pub async fn available_demands(&self, pool: &PgPool) -> Result<Vec<Demand>> {
        let rows = sqlx::query_as::<_, DemandRow>(
            r#"
            SELECT d.id, d.shipper_id, d.agency, d.status, d.created_at
            FROM demands d
            WHERE d.status = 'accepted'
              AND NOT EXISTS (
                  SELECT 1
                  FROM mission_demands md
                  JOIN missions m ON m.id = md.mission_id
                  WHERE md.demand_id = d.id
                    AND m.status NOT IN ('at_warehouse', 'cancelled')
              )
            ORDER BY d.created_at
            "#,
        )
        .fetch_all(pool)
        .await?;

        rows.into_iter().map(DemandRow::into_demand).collect()
    }

    /// Review-staff mutation: move a submitted demand to accepted/rejected.
    pub async fn set_review_status(
        &self,
        conn: &mut PgConnection,
        demand_id: DemandID,
        status: DemandStatus,
    ) -> Result<Demand> {
        let current = sqlx::query_as::<_, DemandRow>(
            r#"
            SELECT id, shipper_id, agency, status, created_at
            FROM demands
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(demand_id.to_uuid())
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| CoreError::not_found("demand", demand_id))?
        .into_demand()?;

        if current.status != DemandStatus::Submitted || status == DemandStatus::Submitted {
            return Err(CoreError::InvalidTransition {
                from: current.status.to_string(),
                to: status.to_string(),
            });
        }

        let row = sqlx::query_as::<_, DemandRow>(
            r#"
            UPDATE demands
            SET status = $2
            WHERE id = $1
            RETURNING id, shipper_id, agency, status, created_at
            "#,
        )
        .bind(demand_id.to_uuid())
        .bind(status.as_str())
        .fetch_one(conn)
        .await?;

        row.into_demand()
    }
}
