//! Closed status enumerations and the mission→parcel status mapping.
//!
//! The source-of-truth representation everywhere (datastore, API, logs) is
//! the `snake_case` string returned by `as_str`; parsing is strict and
//! rejects anything outside the closed sets.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Lifecycle of a client pickup demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DemandStatus {
    /// Submitted by the expéditeur, awaiting review.
    Submitted,
    /// Approved by review staff; eligible for mission aggregation.
    Accepted,
    /// Refused by review staff.
    Rejected,
}

impl DemandStatus {
    /// Stable string form stored in the datastore.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Submitted => "submitted",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl FromStr for DemandStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "submitted" => Ok(Self::Submitted),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(ModelError::UnknownStatus {
                kind: "demand",
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for DemandStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State machine of a pickup mission.
///
/// Forward-only: `Pending → ToPickup → PickedUp → AtWarehouse`, with
/// `Cancelled` reachable from any non-terminal state. `AtWarehouse` and
/// `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissionStatus {
    /// Created; driver not yet under way.
    Pending,
    /// Driver accepted and is heading to the pickup points.
    ToPickup,
    /// Driver is scanning parcels in.
    PickedUp,
    /// Parcels deposited at the warehouse (terminal).
    AtWarehouse,
    /// Abandoned before completion (terminal).
    Cancelled,
}

impl MissionStatus {
    /// Stable string form stored in the datastore.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::ToPickup => "to_pickup",
            Self::PickedUp => "picked_up",
            Self::AtWarehouse => "at_warehouse",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether no further transition is permitted from this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::AtWarehouse | Self::Cancelled)
    }

    /// Whether the state machine permits moving from `self` to `target`.
    ///
    /// No transition skips a state and none regresses; cancellation is the
    /// only exception and is allowed from every non-terminal state.
    pub fn can_transition_to(&self, target: MissionStatus) -> bool {
        match (self, target) {
            (Self::Pending, Self::ToPickup) => true,
            (Self::ToPickup, Self::PickedUp) => true,
            (Self::PickedUp, Self::AtWarehouse) => true,
            (from, Self::Cancelled) => !from.is_terminal(),
            _ => false,
        }
    }

    /// Parcel status cascaded onto every covered parcel when the mission
    /// enters this state. Cancellation deliberately maps to nothing: parcels
    /// are never rolled back.
    pub fn parcel_target(&self) -> Option<ParcelStatus> {
        match self {
            Self::Pending => Some(ParcelStatus::Pending),
            Self::ToPickup => Some(ParcelStatus::ToPickup),
            Self::PickedUp => Some(ParcelStatus::PickedUp),
            Self::AtWarehouse => Some(ParcelStatus::AtWarehouse),
            Self::Cancelled => None,
        }
    }
}

impl FromStr for MissionStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "to_pickup" => Ok(Self::ToPickup),
            "picked_up" => Ok(Self::PickedUp),
            "at_warehouse" => Ok(Self::AtWarehouse),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ModelError::UnknownStatus {
                kind: "mission",
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for MissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full delivery lifecycle of a parcel.
///
/// The first four values are the pickup phase driven by the mission engine;
/// the rest belong to the downstream delivery and return flows, which only
/// read parcels here. The variant order is the lifecycle order used by
/// [`ParcelStatus::phase_rank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParcelStatus {
    /// Created by the intake flow, no mission yet under way.
    Pending,
    /// A driver is on the way to collect it.
    ToPickup,
    /// Scanned into a driver's vehicle.
    PickedUp,
    /// Deposited at the origin warehouse.
    AtWarehouse,
    /// Travelling between depots.
    InTransit,
    /// Arrived at the destination hub.
    AtDeliveryHub,
    /// On a delivery round.
    OutForDelivery,
    /// Handed to the recipient.
    Delivered,
    /// A delivery attempt failed; another will be scheduled.
    DeliveryFailed,
    /// Flagged for return to the shipper.
    ReturnScheduled,
    /// Back at a warehouse on the return leg.
    ReturnedToWarehouse,
    /// Handed back to the shipper (terminal return).
    ReturnedToShipper,
    /// Lost in handling.
    Lost,
}

impl ParcelStatus {
    /// Stable string form stored in the datastore.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::ToPickup => "to_pickup",
            Self::PickedUp => "picked_up",
            Self::AtWarehouse => "at_warehouse",
            Self::InTransit => "in_transit",
            Self::AtDeliveryHub => "at_delivery_hub",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::DeliveryFailed => "delivery_failed",
            Self::ReturnScheduled => "return_scheduled",
            Self::ReturnedToWarehouse => "returned_to_warehouse",
            Self::ReturnedToShipper => "returned_to_shipper",
            Self::Lost => "lost",
        }
    }

    /// Position in the lifecycle, used by the cascade monotonicity guard: a
    /// parcel whose rank is at or beyond the target's rank is left untouched.
    pub fn phase_rank(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::ToPickup => 1,
            Self::PickedUp => 2,
            Self::AtWarehouse => 3,
            Self::InTransit => 4,
            Self::AtDeliveryHub => 5,
            Self::OutForDelivery => 6,
            Self::Delivered => 7,
            Self::DeliveryFailed => 8,
            Self::ReturnScheduled => 9,
            Self::ReturnedToWarehouse => 10,
            Self::ReturnedToShipper => 11,
            Self::Lost => 12,
        }
    }
}

impl FromStr for ParcelStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "to_pickup" => Ok(Self::ToPickup),
            "picked_up" => Ok(Self::PickedUp),
            "at_warehouse" => Ok(Self::AtWarehouse),
            "in_transit" => Ok(Self::InTransit),
            "at_delivery_hub" => Ok(Self::AtDeliveryHub),
            "out_for_delivery" => Ok(Self::OutForDelivery),
            "delivered" => Ok(Self::Delivered),
            "delivery_failed" => Ok(Self::DeliveryFailed),
            "return_scheduled" => Ok(Self::ReturnScheduled),
            "returned_to_warehouse" => Ok(Self::ReturnedToWarehouse),
            "returned_to_shipper" => Ok(Self::ReturnedToShipper),
            "lost" => Ok(Self::Lost),
            other => Err(ModelError::UnknownStatus {
                kind: "parcel",
                value: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for ParcelStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-parcel outcome within one mission, independent of the parcel's own
/// status field; allows partial failure inside a mission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParcelLinkSubStatus {
    /// Not handled yet.
    Pending,
    /// Collected by the driver.
    PickedUp,
    /// Dropped at its destination.
    Delivered,
    /// Could not be handled on this mission.
    Failed,
}

impl ParcelLinkSubStatus {
    /// Stable string form stored in the datastore.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::PickedUp => "picked_up",
            Self::Delivered => "delivered",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for ParcelLinkSubStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "picked_up" => Ok(Self::PickedUp),
            "delivered" => Ok(Self::Delivered),
            "failed" => Ok(Self::Failed),
            other => Err(ModelError::UnknownStatus {
                kind: "parcel link",
                value: other.to_string(),
            }),
        }
    }
}

/// How a parcel reached a mission: through a claimed demand or attached
/// directly in legacy direct-parcel mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkOrigin {
    /// Expanded from a claimed demand's parcel links.
    Demand,
    /// Attached directly at mission creation.
    Direct,
}

impl LinkOrigin {
    /// Stable string form stored in the datastore.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Demand => "demand",
            Self::Direct => "direct",
        }
    }
}

impl FromStr for LinkOrigin {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "demand" => Ok(Self::Demand),
            "direct" => Ok(Self::Direct),
            other => Err(ModelError::UnknownLinkOrigin(other.to_string())),
        }
    }
}
