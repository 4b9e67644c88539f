use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{DemandID, ShipperID};
use crate::status::DemandStatus;

/// A client's request to have parcels picked up, prior to driver assignment.
///
/// Owned by the submitting expéditeur; review staff move it between
/// `Submitted`/`Accepted`/`Rejected`, and the mission engine claims and
/// releases it through the mission-demand link table (the demand row itself
/// is never marked claimed).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Demand {
    /// Identifier.
    pub id: DemandID,
    /// The shipper who submitted the demand.
    pub shipper_id: ShipperID,
    /// The shipper's agency, denormalized for warehouse resolution and
    /// mission visibility filtering.
    pub agency: String,
    /// Review lifecycle status.
    pub status: DemandStatus,
    /// Submission time.
    pub created_at: DateTime<Utc>,
}
