use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::WarehouseID;

/// A physical depot.
///
/// Resolution matches the depot name against a shipper's agency string, so
/// the name doubles as the (brittle) lookup key; see the resolver for the
/// matching policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Warehouse {
    /// Identifier.
    pub id: WarehouseID,
    /// Depot name, e.g. `"Entrepôt Sousse"`.
    pub name: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}
