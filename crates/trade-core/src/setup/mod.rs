//! Simulation setup: population spawning.

pub mod agents;

pub use agents::spawn_population;
