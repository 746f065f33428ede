//! Navigation types and utilities
//!
//! - `Location`: fixed-point lat/lng/alt with flat-earth offset helpers
//! - `compute_geometry`: bearing, distance and pitch from tracker to vehicle
//! - `NavStatus`: the last pointing solution plus scan/override flags

mod geometry;
mod location;

pub use geometry::{compute_geometry, constrain, pitch_from, Geometry, NavStatus};
pub use location::{
    longitude_scale, wrap_180, wrap_360, Location, LOCATION_SCALING_FACTOR,
    LOCATION_SCALING_FACTOR_INV,
};
