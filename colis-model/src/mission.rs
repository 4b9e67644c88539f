use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{DriverID, MissionID, ParcelID, ShipperID};
use crate::status::{LinkOrigin, MissionStatus, ParcelLinkSubStatus};

/// A driver's assigned unit of pickup work aggregating one or more demands
/// and/or directly attached parcels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    /// Identifier.
    pub id: MissionID,
    /// Human-readable mission code (`M-` + 8 uppercase alphanumerics).
    pub code: String,
    /// The driver assigned to carry the mission out.
    pub driver_id: DriverID,
    /// Originating shipper in legacy direct-parcel mode.
    pub shipper_id: Option<ShipperID>,
    /// Originating agency, denormalized for visibility filtering.
    pub agency: String,
    /// Position in the pickup state machine.
    pub status: MissionStatus,
    /// One-time completion code gating the terminal warehouse deposit.
    /// Redacted from non-privileged API responses.
    pub completion_code: Option<String>,
    /// Cached count of parcels covered by the mission.
    pub parcel_count: i32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// When the driver accepted (entered `ToPickup`).
    pub accepted_at: Option<DateTime<Utc>>,
    /// When the mission reached `AtWarehouse`.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Mission {
    /// Copy with the completion code stripped, for unprivileged responses.
    pub fn redacted(mut self) -> Self {
        self.completion_code = None;
        self
    }
}

/// Association between a mission and one parcel it covers.
///
/// A single table with a `via` discriminant replaces the overlapping link
/// tables the legacy system grew: the origin records whether the parcel came
/// in through a claimed demand or was attached directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionParcelLink {
    /// The covering mission.
    pub mission_id: MissionID,
    /// The covered parcel.
    pub parcel_id: ParcelID,
    /// How the parcel reached the mission.
    pub via: LinkOrigin,
    /// Per-parcel outcome within this mission, independent of the parcel's
    /// own status field.
    pub sub_status: ParcelLinkSubStatus,
}
