//! # Colis Model
//!
//! Shared data models for the colis parcel-delivery platform: strongly typed
//! identifiers, closed status enumerations, and the record types persisted by
//! the pickup-mission engine.
//!
//! Statuses serialize to stable `snake_case` strings and parse back through
//! validating [`FromStr`](std::str::FromStr) implementations, so unknown
//! values coming out of the datastore are rejected at the boundary instead of
//! leaking free-form strings into the rest of the system.

pub mod demand;
pub mod error;
pub mod ids;
pub mod mission;
pub mod parcel;
pub mod status;
pub mod tracking;
pub mod warehouse;

pub use demand::Demand;
pub use error::ModelError;
pub use ids::{DemandID, DriverID, MissionID, ParcelID, ShipperID, WarehouseID};
pub use mission::{Mission, MissionParcelLink};
pub use parcel::Parcel;
pub use status::{
    DemandStatus, LinkOrigin, MissionStatus, ParcelLinkSubStatus, ParcelStatus,
};
pub use tracking::TrackingHistoryEntry;
pub use warehouse::Warehouse;
