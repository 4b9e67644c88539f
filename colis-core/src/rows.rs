//! Row structs and validated mapping into domain types.
//!
//! Status columns come back as TEXT; mapping goes through the model's
//! `FromStr` impls so an out-of-set value surfaces as a typed error instead
//! of leaking a free-form string.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use colis_model::{
    Demand, Mission, Parcel, TrackingHistoryEntry, Warehouse,
};

use crate::error::Result;

#[derive(Debug, FromRow)]
pub(crate) struct MissionRow {
    pub id: Uuid,
    pub code: String,
    pub driver_id: Uuid,
    pub shipper_id: Option<Uuid>,
    pub agency: String,
    pub status: String,
    pub completion_code: Option<String>,
    pub parcel_count: i32,
    pub created_at: DateTime<Utc>,
    pub accepted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl MissionRow {
    pub(crate) fn into_mission(self) -> Result<Mission> {
        Ok(Mission {
            id: self.id.into(),
            code: self.code,
            driver_id: self.driver_id.into(),
            shipper_id: self.shipper_id.map(Into::into),
            agency: self.agency,
            status: self.status.parse()?,
            completion_code: self.completion_code,
            parcel_count: self.parcel_count,
            created_at: self.created_at,
            accepted_at: self.accepted_at,
            completed_at: self.completed_at,
        })
    }
}

/// Columns selected for every mission read; keep in sync with `MissionRow`.
pub(crate) const MISSION_COLUMNS: &str = "id, code, driver_id, shipper_id, agency, status, \
     completion_code, parcel_count, created_at, accepted_at, completed_at";

#[derive(Debug, FromRow)]
pub(crate) struct DemandRow {
    pub id: Uuid,
    pub shipper_id: Uuid,
    pub agency: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl DemandRow {
    pub(crate) fn into_demand(self) -> Result<Demand> {
        Ok(Demand {
            id: self.id.into(),
            shipper_id: self.shipper_id.into(),
            agency: self.agency,
            status: self.status.parse()?,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct ParcelRow {
    pub id: Uuid,
    pub tracking_code: String,
    pub status: String,
    pub warehouse_id: Option<Uuid>,
    pub shipper_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl ParcelRow {
    pub(crate) fn into_parcel(self) -> Result<Parcel> {
        Ok(Parcel {
            id: self.id.into(),
            tracking_code: self.tracking_code,
            status: self.status.parse()?,
            warehouse_id: self.warehouse_id.map(Into::into),
            shipper_id: self.shipper_id.into(),
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct WarehouseRow {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl WarehouseRow {
    pub(crate) fn into_warehouse(self) -> Warehouse {
        Warehouse {
            id: self.id.into(),
            name: self.name,
            created_at: self.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct HistoryRow {
    pub id: i64,
    pub parcel_id: Uuid,
    pub status: String,
    pub previous_status: Option<String>,
    pub actor: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl HistoryRow {
    pub(crate) fn into_entry(self) -> Result<TrackingHistoryEntry> {
        Ok(TrackingHistoryEntry {
            id: self.id,
            parcel_id: self.parcel_id.into(),
            status: self.status.parse()?,
            previous_status: self.previous_status.as_deref().map(str::parse).transpose()?,
            actor: self.actor,
            note: self.note,
            created_at: self.created_at,
        })
    }
}
