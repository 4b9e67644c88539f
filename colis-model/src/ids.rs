//! Strongly typed identifiers for the persisted record types.
//!
//! Every id is a UUID v7 newtype so mission/demand/parcel references cannot
//! be swapped for one another at a call site.

use uuid::Uuid;

macro_rules! define_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            PartialOrd,
            Ord,
            Hash,
            serde::Serialize,
            serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Mint a fresh time-ordered identifier.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Borrow the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Copy out the underlying UUID.
            pub fn to_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Identifier of a pickup mission.
    MissionID
);
define_id!(
    /// Identifier of a client pickup demand.
    DemandID
);
define_id!(
    /// Identifier of a physical parcel.
    ParcelID
);
define_id!(
    /// Identifier of a warehouse depot.
    WarehouseID
);
define_id!(
    /// Identifier of a shipper (expéditeur) account.
    ShipperID
);
define_id!(
    /// Identifier of a driver account.
    DriverID
);
