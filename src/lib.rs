//! depot-clustering
//!
//! Assigns service bookings to vehicle home depots ahead of route sequencing,
//! balancing proximity, service capability and per-depot capacity.

pub mod traits;
pub mod haversine;
pub mod depot;
pub mod clustering;
pub mod settings;
