//! Test fixtures for depot-clustering.
//!
//! Provides realistic test data including:
//! - Real Nevada / California depot and stop locations
//! - Test builders for bookings, vehicles and depot location maps

#![allow(dead_code)]

pub mod builders;
pub mod nevada_locations;

pub use builders::*;
pub use nevada_locations::*;
