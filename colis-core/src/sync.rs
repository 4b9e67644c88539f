//! Parcel-status cascade.
//!
//! When a mission changes state, every parcel it covers is brought to the
//! mapped parcel status inside the same transaction, with one tracking
//! history row per updated parcel. Parcels already at or beyond the target
//! are left untouched, which keeps the cascade idempotent under retry and
//! preserves the invariant that a covered parcel is never strictly ahead of
//! its mission.

use sqlx::PgConnection;
use uuid::Uuid;

use colis_model::{Mission, MissionStatus, ParcelStatus};

use crate::error::Result;
use crate::rows::ParcelRow;

/// Outcome of one cascade call.
#[derive(Debug, Clone, Default)]
pub struct CascadeOutcome {
    /// Parcels whose status was moved to the target.
    pub updated_parcels: usize,
    /// Every parcel covered by the mission, updated or not.
    pub covered_parcel_ids: Vec<Uuid>,
}

/// Propagates a mission's status onto every parcel it covers.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusSynchronizer;

impl StatusSynchronizer {
    /// All parcels reachable from the mission: the materialized
    /// `mission_parcels` links plus anything reachable through claimed
    /// demands (covers parcels added to a demand after the claim).
    pub async fn covered_parcels(
        &self,
        conn: &mut PgConnection,
        mission_id: Uuid,
    ) -> Result<Vec<ParcelRow>> {
        let rows = sqlx::query_as::<_, ParcelRow>(
            r#"
            SELECT id, tracking_code, status, warehouse_id, shipper_id, created_at
            FROM parcels
            WHERE id IN (
                SELECT mp.parcel_id
                FROM mission_parcels mp
                WHERE mp.mission_id = $1
                UNION
                SELECT dp.parcel_id
                FROM demand_parcels dp
                JOIN mission_demands md ON md.demand_id = dp.demand_id
                WHERE md.mission_id = $1
            )
            ORDER BY id
            FOR UPDATE
            "#,
        )
        .bind(mission_id)
        .fetch_all(conn)
        .await?;

        Ok(rows)
    }

    /// Cascade `new_status` onto the mission's parcels.
    ///
    /// Runs entirely on the caller's transaction: either every eligible
    /// parcel is updated and a history row appended, or the whole
    /// transaction rolls back.
    pub async fn cascade(
        &self,
        conn: &mut PgConnection,
        mission: &Mission,
        new_status: MissionStatus,
    ) -> Result<CascadeOutcome> {
        let Some(target) = new_status.parcel_target() else {
            // Cancellation: parcels are never rolled back.
            return Ok(CascadeOutcome::default());
        };

        let parcels = self.covered_parcels(&mut *conn, mission.id.to_uuid()).await?;
        let covered_parcel_ids: Vec<Uuid> = parcels.iter().map(|p| p.id).collect();

        // Monotonicity guard: skip parcels at or beyond the target.
        let mut updatable_ids = Vec::new();
        let mut previous = Vec::new();
        for row in parcels {
            let status: ParcelStatus = row.status.parse()?;
            if status.phase_rank() < target.phase_rank() {
                updatable_ids.push(row.id);
                previous.push(status.as_str().to_string());
            }
        }

        // Mirror the pickup scan onto the per-parcel sub-status. Runs even
        // when every parcel is already at or beyond the target, since the
        // link rows of this mission start at 'pending' regardless.
        if new_status == MissionStatus::PickedUp {
            sqlx::query(
                r#"
                UPDATE mission_parcels
                SET sub_status = 'picked_up'
                WHERE mission_id = $1
                  AND sub_status = 'pending'
                "#,
            )
            .bind(mission.id.to_uuid())
            .execute(&mut *conn)
            .await?;
        }

        if updatable_ids.is_empty() {
            return Ok(CascadeOutcome {
                updated_parcels: 0,
                covered_parcel_ids,
            });
        }

        sqlx::query("UPDATE parcels SET status = $2 WHERE id = ANY($1)")
            .bind(&updatable_ids)
            .bind(target.as_str())
            .execute(&mut *conn)
            .await?;

        let note = format!("mission {} moved to {}", mission.code, new_status);
        sqlx::query(
            r#"
            INSERT INTO tracking_history (parcel_id, status, previous_status, actor, note)
            SELECT u.id, $2, u.prev, $3, $4
            FROM UNNEST($1::uuid[], $5::text[]) AS u(id, prev)
            "#,
        )
        .bind(&updatable_ids)
        .bind(target.as_str())
        .bind(&mission.code)
        .bind(&note)
        .bind(&previous)
        .execute(&mut *conn)
        .await?;

        Ok(CascadeOutcome {
            updated_parcels: updatable_ids.len(),
            covered_parcel_ids,
        })
    }
}
