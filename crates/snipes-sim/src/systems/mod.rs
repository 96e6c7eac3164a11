//! Systems that operate on the simulation world each tick.
//!
//! Systems are free functions over `&mut World` plus the state they need.
//! They do not own state — all state lives in components or the engine.
//! The engine calls them in a fixed order so outcomes are reproducible.

pub mod bullets;
pub mod cleanup;
pub mod combat;
pub mod hive_spawner;
pub mod snapshot;
pub mod snipe_motion;
