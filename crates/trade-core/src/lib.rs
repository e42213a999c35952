//! Trade Simulation Engine Library
//!
//! A closed population of agents that produce, consume and trade resources in
//! discrete ticks. Each tick runs four population-wide phases in order:
//! produce, request, accept, consume. Trading decisions come from pluggable
//! [`TradeStrategy`] implementations.
//!
//! # Modules
//!
//! - [`components`]: resource kinds and configs, agent state, requests
//! - [`strategy`]: the strategy trait and the shipped strategies
//! - [`simulation`]: tick orchestration, topology setup, aggregate queries
//! - [`setup`]: population spawning from settings
//! - [`config`]: TOML settings
//! - [`output`]: event logs, run statistics and snapshots

pub mod components;
pub mod config;
pub mod error;
pub mod output;
pub mod setup;
pub mod simulation;
pub mod strategy;

pub use components::*;
pub use config::{default_settings_toml, ConfigError, SimulationSettings};
pub use error::{SimError, SimResult};
pub use output::{read_events, EventLog, StatsCollector};
pub use simulation::topology::Topology;
pub use simulation::Simulation;
pub use strategy::{
    IdleStrategy, NeedsStrategy, RandomStrategy, ScriptedStrategy, StrategyKind, TradeStrategy,
};
