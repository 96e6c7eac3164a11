//! Snipe AI for SNIPES.
//!
//! Implements the per-interval movement decision: directional persistence,
//! distance-based player attraction, and wall/occupancy avoidance.

pub mod decide;

pub use snipes_core as core;

pub use decide::{
    attraction_probability, evaluate, step_toward, SnipeContext, SnipeUpdate, DIRECTIONS,
};
