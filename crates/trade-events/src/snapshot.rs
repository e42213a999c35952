//! Snapshot Types
//!
//! Serialization structs capturing the population at a point in time,
//! used for diagnostics and driver output.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Agent state snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub agent_id: usize,
    pub strategy: String,
    pub health: f64,
    pub happiness: f64,
    pub alive: bool,
    pub happy: bool,
    #[serde(default)]
    pub inventory: BTreeMap<String, f64>,
    #[serde(default)]
    pub production: BTreeMap<String, f64>,
    #[serde(default)]
    pub consumption: BTreeMap<String, f64>,
    #[serde(default)]
    pub neighbors: Vec<usize>,
}

/// Whole-population snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub tick: u64,
    pub living: usize,
    pub happy: usize,
    #[serde(default)]
    pub resource_totals: BTreeMap<String, f64>,
    pub agents: Vec<AgentSnapshot>,
}

impl PopulationSnapshot {
    pub fn agent(&self, agent_id: usize) -> Option<&AgentSnapshot> {
        self.agents.iter().find(|a| a.agent_id == agent_id)
    }

    /// Number of directed neighbor edges
    pub fn edge_count(&self) -> usize {
        self.agents.iter().map(|a| a.neighbors.len()).sum()
    }
}
