//! Depot clustering: assigns each booking to a vehicle home depot.
//!
//! Every booking ends up in exactly one place, either a depot cluster or the
//! unassigned list with a typed reason. The pass is pure and synchronous.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::depot::{depot_can_serve, rank_depots, Depot};
use crate::haversine::Coordinates;
use crate::traits::{Booking, UnassignedReason, Vehicle};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusteringConfig {
    /// Bookings farther than this from their nearest depot are out of area.
    pub max_radius_miles: f64,
    /// Stops one vehicle may take; a depot's capacity is this times its fleet.
    pub max_stops_per_vehicle: usize,
    /// How many depots, nearest first, to try per booking.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
}

fn default_max_candidates() -> usize {
    1
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            max_radius_miles: 50.0,
            max_stops_per_vehicle: 15,
            max_candidates: default_max_candidates(),
        }
    }
}

/// A booking with its location already geocoded.
#[derive(Debug, Clone)]
pub struct BookingWithCoordinates<B> {
    pub booking: B,
    pub coordinates: Coordinates,
    pub location_name: String,
    pub location_city: String,
}

#[derive(Debug)]
pub struct DepotAssignment<'a, B, V> {
    pub booking: &'a B,
    pub depot: &'a Depot<'a, V>,
    pub distance_miles: f64,
}

#[derive(Debug)]
pub struct UnassignedBooking<'a, B> {
    pub booking: &'a B,
    pub reason: UnassignedReason,
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusteringStats {
    pub total_bookings: usize,
    pub assigned_bookings: usize,
    pub unassigned_bookings: usize,
    /// Number of non-empty clusters.
    pub depot_count: usize,
}

#[derive(Debug)]
pub struct ClusteringResult<'a, B, V> {
    /// Clusters keyed by depot location id.
    pub depot_clusters: BTreeMap<&'a str, Vec<DepotAssignment<'a, B, V>>>,
    pub unassigned: Vec<UnassignedBooking<'a, B>>,
    pub stats: ClusteringStats,
}

impl<'a, B, V> ClusteringResult<'a, B, V> {
    fn new(
        total_bookings: usize,
        depot_clusters: BTreeMap<&'a str, Vec<DepotAssignment<'a, B, V>>>,
        unassigned: Vec<UnassignedBooking<'a, B>>,
    ) -> Self {
        let stats = ClusteringStats {
            total_bookings,
            assigned_bookings: depot_clusters.values().map(Vec::len).sum(),
            unassigned_bookings: unassigned.len(),
            depot_count: depot_clusters.len(),
        };

        Self {
            depot_clusters,
            unassigned,
            stats,
        }
    }

    /// Assignments for one depot, empty when it received none.
    pub fn cluster(&self, location_id: &str) -> &[DepotAssignment<'a, B, V>] {
        self.depot_clusters
            .get(location_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn unassigned_with(&self, reason: UnassignedReason) -> impl Iterator<Item = &UnassignedBooking<'a, B>> + '_ {
        self.unassigned.iter().filter(move |entry| entry.reason == reason)
    }
}

/// Assign bookings to depots by proximity, capability and capacity.
///
/// Per booking: rank the nearest depots, reject when the nearest is beyond
/// the radius, then take the first in-radius candidate with a capable
/// vehicle. Afterwards each over-capacity depot keeps its closest bookings
/// and demotes the rest.
pub fn cluster_bookings<'a, B, V>(
    bookings: &'a [BookingWithCoordinates<B>],
    depots: &'a [Depot<'a, V>],
    config: &ClusteringConfig,
) -> ClusteringResult<'a, B, V>
where
    B: Booking + Sync,
    V: Vehicle + Sync,
{
    let max_radius = config.max_radius_miles;

    tracing::info!(
        booking_count = bookings.len(),
        depot_count = depots.len(),
        max_radius_miles = max_radius,
        max_stops_per_vehicle = config.max_stops_per_vehicle,
        max_candidates = config.max_candidates,
        "starting depot-based clustering"
    );

    if depots.is_empty() {
        tracing::error!(booking_count = bookings.len(), "no depots available for clustering");
        let unassigned = bookings
            .iter()
            .map(|entry| UnassignedBooking {
                booking: &entry.booking,
                reason: UnassignedReason::NoVehicleAvailable,
                details: "No vehicles with home locations available".to_string(),
            })
            .collect();
        return ClusteringResult::new(bookings.len(), BTreeMap::new(), unassigned);
    }

    tracing::info!(
        depots = ?depots
            .iter()
            .map(|depot| (depot.name.as_str(), depot.city.as_str(), depot.vehicles.len()))
            .collect::<Vec<_>>(),
        "built depot list"
    );

    // None marks coordinates that cannot be measured against.
    let placements: Vec<Option<Vec<(&'a Depot<'a, V>, f64)>>> = bookings
        .par_iter()
        .map(|entry| {
            entry
                .coordinates
                .is_valid()
                .then(|| rank_depots(&entry.coordinates, depots, config.max_candidates))
        })
        .collect();

    let mut depot_clusters: BTreeMap<&'a str, Vec<DepotAssignment<'a, B, V>>> = BTreeMap::new();
    let mut unassigned: Vec<UnassignedBooking<'a, B>> = Vec::new();

    for (entry, placement) in bookings.iter().zip(placements) {
        let booking = &entry.booking;

        let Some(candidates) = placement else {
            tracing::warn!(
                booking_id = ?booking.id(),
                latitude = entry.coordinates.latitude,
                longitude = entry.coordinates.longitude,
                "booking has invalid coordinates"
            );
            unassigned.push(UnassignedBooking {
                booking,
                reason: UnassignedReason::NoCoordinates,
                details: format!(
                    "Booking coordinates ({}, {}) are not valid",
                    entry.coordinates.latitude, entry.coordinates.longitude
                ),
            });
            continue;
        };

        let Some((first, fallbacks)) = candidates.split_first() else {
            unassigned.push(UnassignedBooking {
                booking,
                reason: UnassignedReason::NoVehicleAvailable,
                details: "No depots available".to_string(),
            });
            continue;
        };
        let &(nearest, nearest_distance) = first;

        if nearest_distance > max_radius {
            tracing::debug!(
                booking_id = ?booking.id(),
                location_city = entry.location_city.as_str(),
                nearest_depot = nearest.name.as_str(),
                distance = nearest_distance,
                max_radius,
                "booking outside service area"
            );
            unassigned.push(UnassignedBooking {
                booking,
                reason: UnassignedReason::OutOfServiceArea,
                details: format!(
                    "Nearest depot \"{}\" is {:.1} miles away (max: {} miles)",
                    nearest.name, nearest_distance, max_radius
                ),
            });
            continue;
        }

        // The nearest depot already passed the radius gate; only fallbacks are re-checked.
        let chosen = std::iter::once(first)
            .chain(fallbacks.iter().take_while(|(_, distance)| *distance <= max_radius))
            .find(|(depot, _)| depot_can_serve(*depot, booking));

        let Some(&(depot, distance_miles)) = chosen else {
            unassigned.push(UnassignedBooking {
                booking,
                reason: UnassignedReason::NoMatchingService,
                details: format!("No vehicle at \"{}\" can service this booking", nearest.name),
            });
            continue;
        };

        tracing::debug!(
            booking_id = ?booking.id(),
            location_city = entry.location_city.as_str(),
            depot = depot.name.as_str(),
            depot_city = depot.city.as_str(),
            distance = distance_miles,
            "assigned booking to depot"
        );

        depot_clusters
            .entry(depot.location_id.as_str())
            .or_default()
            .push(DepotAssignment {
                booking,
                depot,
                distance_miles,
            });
    }

    enforce_capacity(depots, config.max_stops_per_vehicle, &mut depot_clusters, &mut unassigned);

    let result = ClusteringResult::new(bookings.len(), depot_clusters, unassigned);

    tracing::info!(
        total_bookings = result.stats.total_bookings,
        assigned_bookings = result.stats.assigned_bookings,
        unassigned_bookings = result.stats.unassigned_bookings,
        depot_count = result.stats.depot_count,
        cluster_sizes = ?result
            .depot_clusters
            .iter()
            .map(|(id, cluster)| (*id, cluster.len()))
            .collect::<Vec<_>>(),
        "clustering complete"
    );

    result
}

/// Trim each over-capacity cluster to its closest bookings.
///
/// Demoted bookings are never offered to another depot. Clusters left empty
/// are removed.
fn enforce_capacity<'a, B, V>(
    depots: &'a [Depot<'a, V>],
    max_stops_per_vehicle: usize,
    depot_clusters: &mut BTreeMap<&'a str, Vec<DepotAssignment<'a, B, V>>>,
    unassigned: &mut Vec<UnassignedBooking<'a, B>>,
) {
    for depot in depots {
        let Some(cluster) = depot_clusters.get_mut(depot.location_id.as_str()) else {
            continue;
        };

        let capacity = depot.capacity(max_stops_per_vehicle);
        if cluster.len() <= capacity {
            continue;
        }

        tracing::warn!(
            depot = depot.name.as_str(),
            bookings = cluster.len(),
            capacity,
            overflow = cluster.len() - capacity,
            "depot over capacity, moving excess to unassigned"
        );

        cluster.sort_by(|a, b| a.distance_miles.total_cmp(&b.distance_miles));
        for assignment in cluster.split_off(capacity) {
            unassigned.push(UnassignedBooking {
                booking: assignment.booking,
                reason: UnassignedReason::CapacityExceeded,
                details: format!("Depot \"{}\" at capacity ({} stops max)", depot.name, capacity),
            });
        }
    }

    depot_clusters.retain(|_, cluster| !cluster.is_empty());
}
