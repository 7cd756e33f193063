//! Depots built from vehicle home locations, plus the lookups the
//! clustering pass runs against them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::haversine::{distance_miles, Coordinates};
use crate::traits::{Booking, Vehicle};

/// Location metadata for a vehicle home, resolved by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepotLocation {
    pub name: String,
    pub city: String,
    pub coordinates: Coordinates,
}

impl DepotLocation {
    pub fn new(name: impl Into<String>, city: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            name: name.into(),
            city: city.into(),
            coordinates,
        }
    }
}

/// A vehicle home location acting as a clustering anchor.
///
/// `vehicles` is never empty: a depot only exists because some vehicle lives there.
#[derive(Debug)]
pub struct Depot<'a, V> {
    pub location_id: String,
    pub name: String,
    pub city: String,
    pub coordinates: Coordinates,
    pub vehicles: Vec<&'a V>,
}

impl<V> Depot<'_, V> {
    /// Total stops this depot can absorb for one planning run.
    pub fn capacity(&self, max_stops_per_vehicle: usize) -> usize {
        self.vehicles.len().saturating_mul(max_stops_per_vehicle)
    }
}

/// Group vehicles by home location into depots.
///
/// Depots come out in the order their location first appears in `vehicles`.
/// Vehicles without a home location, and locations without usable metadata,
/// are logged and left out.
pub fn build_depots<'a, V: Vehicle>(
    vehicles: &'a [V],
    locations: &HashMap<String, DepotLocation>,
) -> Vec<Depot<'a, V>> {
    let mut order: Vec<&'a str> = Vec::new();
    let mut grouped: HashMap<&'a str, Vec<&'a V>> = HashMap::new();

    for vehicle in vehicles {
        let Some(location_id) = vehicle.home_location_id().filter(|id| !id.is_empty()) else {
            tracing::warn!(vehicle_id = ?vehicle.id(), "vehicle has no home location, skipping");
            continue;
        };

        grouped
            .entry(location_id)
            .or_insert_with(|| {
                order.push(location_id);
                Vec::new()
            })
            .push(vehicle);
    }

    let mut depots = Vec::with_capacity(order.len());
    for location_id in order {
        let Some(vehicles) = grouped.remove(location_id) else {
            continue;
        };

        let Some(location) = locations.get(location_id) else {
            tracing::warn!(location_id, "depot location not found");
            continue;
        };

        if !location.coordinates.is_valid() {
            tracing::warn!(
                location_id,
                latitude = location.coordinates.latitude,
                longitude = location.coordinates.longitude,
                "depot location has invalid coordinates"
            );
            continue;
        }

        depots.push(Depot {
            location_id: location_id.to_string(),
            name: location.name.clone(),
            city: location.city.clone(),
            coordinates: location.coordinates,
            vehicles,
        });
    }

    depots
}

/// Closest depot to `coordinates`, with its distance in miles.
///
/// Ties go to the depot listed first.
pub fn nearest_depot<'d, 'v, V>(
    coordinates: &Coordinates,
    depots: &'d [Depot<'v, V>],
) -> Option<(&'d Depot<'v, V>, f64)> {
    let (first, rest) = depots.split_first()?;
    let mut nearest = first;
    let mut min_distance = distance_miles(coordinates, &first.coordinates);

    for depot in rest {
        let distance = distance_miles(coordinates, &depot.coordinates);
        if distance < min_distance {
            min_distance = distance;
            nearest = depot;
        }
    }

    Some((nearest, min_distance))
}

/// Up to `limit` depots ordered by ascending distance (ties keep input order).
///
/// A limit of 0 or 1 is the plain nearest-depot lookup.
pub fn rank_depots<'d, 'v, V>(
    coordinates: &Coordinates,
    depots: &'d [Depot<'v, V>],
    limit: usize,
) -> Vec<(&'d Depot<'v, V>, f64)> {
    if limit <= 1 {
        return nearest_depot(coordinates, depots).into_iter().collect();
    }

    let mut ranked: Vec<(&'d Depot<'v, V>, f64)> = depots
        .iter()
        .map(|depot| (depot, distance_miles(coordinates, &depot.coordinates)))
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked.truncate(limit);
    ranked
}

/// Check if a vehicle can perform any of the booking's services.
///
/// A vehicle with no service types is treated as able to do anything.
pub fn vehicle_can_serve<B, V>(vehicle: &V, booking: &B) -> bool
where
    B: Booking,
    V: Vehicle,
{
    let service_types = vehicle.service_types();
    if service_types.is_empty() {
        return true;
    }

    booking
        .service_id()
        .into_iter()
        .chain(booking.service_ids().iter().map(String::as_str))
        .any(|service| service_types.iter().any(|kind| kind == service))
}

/// Check if any vehicle at the depot can handle this booking.
pub fn depot_can_serve<B, V>(depot: &Depot<'_, V>, booking: &B) -> bool
where
    B: Booking,
    V: Vehicle,
{
    depot.vehicles.iter().any(|vehicle| vehicle_can_serve(*vehicle, booking))
}
