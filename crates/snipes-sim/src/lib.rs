//! Simulation engine for SNIPES.
//!
//! Owns the hecs ECS world, runs systems at a fixed tick rate, and
//! produces `GameStateSnapshot`s for downstream consumers. Completely
//! headless (no rendering or transport dependency), enabling
//! deterministic testing.

pub mod engine;
pub mod remote;
pub mod systems;
pub mod world_setup;

pub use engine::SimulationEngine;
pub use snipes_core as core;

#[cfg(test)]
mod tests;
