//! Core domain traits for depot clustering.
//!
//! These are intentionally minimal. Concrete apps implement them for their
//! own booking and vehicle rows.

use std::collections::HashMap;
use std::fmt;
use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::settings::SettingsError;

/// Unique identifier for clustering entities.
pub trait Id: Clone + Eq + Hash + Debug {}

impl<T> Id for T where T: Clone + Eq + Hash + Debug {}

/// A booking is a single service visit that needs a home depot.
pub trait Booking {
    type Id: Id;

    fn id(&self) -> &Self::Id;

    /// Primary service identifier.
    fn service_id(&self) -> Option<&str>;

    /// Additional service identifiers for multi-service bookings.
    fn service_ids(&self) -> &[String];
}

/// A vehicle, anchored at a home location that acts as its depot.
pub trait Vehicle {
    type Id: Id;

    fn id(&self) -> &Self::Id;

    /// Home location identifier. Vehicles without one never form a depot.
    fn home_location_id(&self) -> Option<&str>;

    /// Service types this vehicle can perform. Empty means any service.
    fn service_types(&self) -> &[String];
}

/// Reads persisted settings by key.
///
/// Keys that have no stored row are simply absent from the returned map.
pub trait SettingsStore {
    fn fetch_settings(&self, keys: &[&str]) -> Result<HashMap<String, serde_json::Value>, SettingsError>;
}

/// Why a booking could not be placed in any depot cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnassignedReason {
    OutOfServiceArea,
    NoVehicleAvailable,
    CapacityExceeded,
    NoCoordinates,
    NoMatchingService,
}

impl UnassignedReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnassignedReason::OutOfServiceArea => "out_of_service_area",
            UnassignedReason::NoVehicleAvailable => "no_vehicle_available",
            UnassignedReason::CapacityExceeded => "capacity_exceeded",
            UnassignedReason::NoCoordinates => "no_coordinates",
            UnassignedReason::NoMatchingService => "no_matching_service",
        }
    }
}

impl fmt::Display for UnassignedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
