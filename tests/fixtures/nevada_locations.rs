//! Real Nevada / California locations for realistic test fixtures.
//!
//! Coordinates are rounded from OpenStreetMap and are only used for
//! straight-line distances.

use depot_clustering::haversine::Coordinates;

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub city: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, city: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, city, lat, lng }
    }

    pub fn coords(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

// ============================================================================
// Vehicle home yards (depots)
// ============================================================================

pub const LAS_VEGAS_YARD: Location = Location::new("Las Vegas Yard", "Las Vegas", 36.1699, -115.1398);
pub const HENDERSON_YARD: Location = Location::new("Henderson Yard", "Henderson", 36.0395, -114.9817);
pub const RENO_YARD: Location = Location::new("Reno Yard", "Reno", 39.5296, -119.8138);

// ============================================================================
// Stops closest to the Las Vegas yard
// ============================================================================

pub const LAS_VEGAS_STOPS: &[Location] = &[
    Location::new("Wynn Las Vegas", "Las Vegas", 36.1263781, -115.1658180),
    Location::new("MGM Grand", "Las Vegas", 36.1023654, -115.1688720),
    Location::new("Bellagio", "Las Vegas", 36.1126, -115.1767),
    Location::new("Caesars Palace", "Las Vegas", 36.1162, -115.1745),
    Location::new("Fremont Street", "Las Vegas", 36.1707, -115.1435),
    Location::new("Summerlin Library", "Las Vegas", 36.1802, -115.3062),
];

// ============================================================================
// Stops closest to the Henderson yard
// ============================================================================

pub const HENDERSON_STOPS: &[Location] = &[
    Location::new("Green Valley Ranch", "Henderson", 36.0111, -115.0867),
    Location::new("Lake Las Vegas", "Henderson", 36.1039, -114.9269),
    Location::new("Henderson City Hall", "Henderson", 36.0306, -114.9823),
];

// ============================================================================
// Stops closest to the Reno yard
// ============================================================================

pub const RENO_STOPS: &[Location] = &[
    Location::new("Reno Arch", "Reno", 39.5292, -119.8135),
    Location::new("Sparks Marina", "Sparks", 39.5505, -119.7327),
];

// ============================================================================
// Stops outside any reasonable service radius
// ============================================================================

pub const FAR_AWAY_STOPS: &[Location] = &[
    Location::new("Griffith Observatory", "Los Angeles", 34.1184, -118.3004),
    Location::new("Temple Square", "Salt Lake City", 40.7704, -111.8919),
    Location::new("Mizpah Hotel", "Tonopah", 38.0670, -117.2301),
];
