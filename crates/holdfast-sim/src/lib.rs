//! Simulation engine for HOLDFAST.
//!
//! Owns the hecs ECS world, runs the lock coordinator and capture systems
//! at a fixed tick interval, and produces `TerritorySnapshot`s for
//! presentation layers.

pub mod engine;
pub mod ledger;
pub mod presence;
pub mod scenario;
pub mod systems;
pub mod world_setup;

pub use engine::SimulationEngine;
pub use holdfast_core as core;

#[cfg(test)]
mod tests;
