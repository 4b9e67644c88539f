use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::ParcelID;
use crate::status::ParcelStatus;

/// One append-only audit record of a parcel status change.
///
/// Rows are never updated or deleted; per parcel they form a strictly
/// increasing timestamp sequence and are the authoritative trail for its
/// lifecycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingHistoryEntry {
    /// Monotonic row id.
    pub id: i64,
    /// The parcel whose status changed.
    pub parcel_id: ParcelID,
    /// Status after the change.
    pub status: ParcelStatus,
    /// Status before the change; `None` only for the intake-created first
    /// entry.
    pub previous_status: Option<ParcelStatus>,
    /// Who drove the change (mission code, staff account, system).
    pub actor: String,
    /// Human-readable context for the change.
    pub note: Option<String>,
    /// When the change was recorded.
    pub created_at: DateTime<Utc>,
}
