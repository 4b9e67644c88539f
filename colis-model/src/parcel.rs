use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{ParcelID, ShipperID, WarehouseID};
use crate::status::ParcelStatus;

/// The physical shipment.
///
/// Created by the expéditeur-facing intake flow; its pickup-phase status is
/// mutated exclusively by the status synchronizer and its warehouse
/// reference by the warehouse resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parcel {
    /// Identifier.
    pub id: ParcelID,
    /// Public tracking code printed on the label.
    pub tracking_code: String,
    /// Current lifecycle status.
    pub status: ParcelStatus,
    /// Physical depot the parcel is assigned to, once resolved.
    pub warehouse_id: Option<WarehouseID>,
    /// Owning shipper.
    pub shipper_id: ShipperID,
    /// Intake time.
    pub created_at: DateTime<Utc>,
}
