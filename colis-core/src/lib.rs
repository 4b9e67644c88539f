//! # Colis Core
//!
//! Pickup-mission lifecycle and parcel-status synchronization engine for the
//! colis parcel-delivery platform.
//!
//! ## Overview
//!
//! The engine aggregates accepted client demands into driver missions,
//! drives each mission through a fixed state machine, and cascades every
//! mission-state change atomically onto all covered parcels while recording
//! an immutable tracking-history trail. It is built from four collaborators
//! orchestrated by [`MissionLifecycleEngine`]:
//!
//! - [`DemandAggregator`](demands::DemandAggregator): claims demands into a
//!   mission, guaranteeing at most one active claim per demand.
//! - [`CompletionCodeService`](codes::CompletionCodeService): issues the
//!   one-time code gating the terminal warehouse deposit.
//! - [`StatusSynchronizer`](sync::StatusSynchronizer): the atomic parcel
//!   cascade with monotonicity guard and history logging.
//! - [`WarehouseResolver`](warehouse::WarehouseResolver): maps a shipper's
//!   agency string onto a physical depot.
//!
//! All mutating operations execute inside a single database transaction per
//! call; there is no in-process locking beyond what the transactions
//! provide. Connection-pool lifecycle belongs to the process entry point,
//! which passes the pool into [`MissionLifecycleEngine::new`].

pub mod codes;
pub mod db;
pub mod demands;
pub mod error;
pub mod lifecycle;
pub mod sync;
pub mod warehouse;

pub(crate) mod rows;

pub use codes::CompletionCodeService;
pub use demands::{ClaimOutcome, ClaimRejection, DemandAggregator};
pub use error::{CoreError, Result};
pub use lifecycle::{
    AgencyScope, CreateMission, MissionCreated, MissionDetail, MissionFilter,
    MissionLifecycleEngine, MissionPage, MissionParcel, MissionSummary,
    TransitionOutcome,
};
pub use sync::{CascadeOutcome, StatusSynchronizer};
pub use warehouse::WarehouseResolver;

/// Schema migrations, applied by the server at startup and by
/// `#[sqlx::test]` harnesses.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
