//! Builders for test bookings and vehicles with sensible defaults.

use std::collections::HashMap;

use depot_clustering::clustering::BookingWithCoordinates;
use depot_clustering::depot::DepotLocation;
use depot_clustering::haversine::Coordinates;
use depot_clustering::traits::{Booking, Vehicle};

use super::nevada_locations::Location;

#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct TestId(pub String);

impl TestId {
    pub fn new(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Clone, Debug)]
pub struct TestBooking {
    pub id: TestId,
    pub service_id: Option<String>,
    pub service_ids: Vec<String>,
}

impl TestBooking {
    pub fn new(id: &str) -> Self {
        Self {
            id: TestId::new(id),
            service_id: None,
            service_ids: Vec::new(),
        }
    }

    pub fn service(mut self, service_id: &str) -> Self {
        self.service_id = Some(service_id.to_string());
        self
    }

    pub fn also(mut self, service_id: &str) -> Self {
        self.service_ids.push(service_id.to_string());
        self
    }

    /// Wrap with coordinates, as the geocoding step upstream would.
    pub fn at(self, lat: f64, lng: f64) -> BookingWithCoordinates<Self> {
        BookingWithCoordinates {
            booking: self,
            coordinates: Coordinates::new(lat, lng),
            location_name: String::new(),
            location_city: String::new(),
        }
    }

    pub fn at_location(self, location: &Location) -> BookingWithCoordinates<Self> {
        BookingWithCoordinates {
            booking: self,
            coordinates: location.coords(),
            location_name: location.name.to_string(),
            location_city: location.city.to_string(),
        }
    }
}

impl Booking for TestBooking {
    type Id = TestId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn service_id(&self) -> Option<&str> {
        self.service_id.as_deref()
    }

    fn service_ids(&self) -> &[String] {
        &self.service_ids
    }
}

#[derive(Clone, Debug)]
pub struct TestVehicle {
    pub id: TestId,
    pub home_location_id: Option<String>,
    pub service_types: Vec<String>,
}

impl TestVehicle {
    pub fn new(id: &str) -> Self {
        Self {
            id: TestId::new(id),
            home_location_id: None,
            service_types: Vec::new(),
        }
    }

    pub fn home(mut self, location_id: &str) -> Self {
        self.home_location_id = Some(location_id.to_string());
        self
    }

    pub fn serves(mut self, service_type: &str) -> Self {
        self.service_types.push(service_type.to_string());
        self
    }
}

impl Vehicle for TestVehicle {
    type Id = TestId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn home_location_id(&self) -> Option<&str> {
        self.home_location_id.as_deref()
    }

    fn service_types(&self) -> &[String] {
        &self.service_types
    }
}

/// Depot location map from `(location_id, lat, lng)` triples.
pub fn depot_locations(entries: &[(&str, f64, f64)]) -> HashMap<String, DepotLocation> {
    entries
        .iter()
        .map(|(id, lat, lng)| {
            (
                id.to_string(),
                DepotLocation::new(format!("Depot {}", id), "Testville", Coordinates::new(*lat, *lng)),
            )
        })
        .collect()
}

/// Depot location map keyed by the given ids.
pub fn named_depot_locations(entries: &[(&str, &Location)]) -> HashMap<String, DepotLocation> {
    entries
        .iter()
        .map(|(id, location)| {
            (
                id.to_string(),
                DepotLocation::new(location.name, location.city, location.coords()),
            )
        })
        .collect()
}

/// Ids of the bookings in one depot's cluster, in cluster order.
pub fn cluster_ids<V>(
    result: &depot_clustering::clustering::ClusteringResult<'_, TestBooking, V>,
    location_id: &str,
) -> Vec<String> {
    result
        .cluster(location_id)
        .iter()
        .map(|assignment| assignment.booking.id.0.clone())
        .collect()
}
