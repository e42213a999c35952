//! Neighbor graph setup.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::Simulation;
use crate::components::agent::AgentId;
use crate::error::{SimError, SimResult};

/// Built-in neighbor graphs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Every agent neighbors every other agent
    #[default]
    FullyConnected,
    /// No edges at all
    Isolated,
}

impl Simulation {
    /// Give every agent all other agents as neighbors
    pub fn connect_all(&mut self) {
        let ids: Vec<AgentId> = self.agents.iter().map(|a| a.id()).collect();
        for agent in &mut self.agents {
            let own = agent.id();
            agent.state_mut().neighbors = ids.iter().copied().filter(|&id| id != own).collect();
        }
    }

    /// Remove every edge
    pub fn disconnect_all(&mut self) {
        for agent in &mut self.agents {
            agent.state_mut().neighbors.clear();
        }
    }

    pub fn apply_topology(&mut self, topology: Topology) {
        match topology {
            Topology::FullyConnected => self.connect_all(),
            Topology::Isolated => self.disconnect_all(),
        }
        tracing::debug!(?topology, edges = self.edge_count(), "installed topology");
    }

    /// Add one directed edge: `from` may send requests to `to`
    pub fn connect(&mut self, from: AgentId, to: AgentId) -> SimResult<()> {
        self.check_edge(from, to)?;
        self.agents[from.index()].state_mut().neighbors.insert(to);
        Ok(())
    }

    /// Replace one agent's neighbor set
    pub fn set_neighbors(
        &mut self,
        id: AgentId,
        neighbors: impl IntoIterator<Item = AgentId>,
    ) -> SimResult<()> {
        let neighbors: BTreeSet<AgentId> = neighbors.into_iter().collect();
        for &to in &neighbors {
            self.check_edge(id, to)?;
        }
        if id.index() >= self.agents.len() {
            return Err(SimError::InvalidTopology(format!("no agent {}", id)));
        }
        self.agents[id.index()].state_mut().neighbors = neighbors;
        Ok(())
    }

    /// Number of directed edges
    pub fn edge_count(&self) -> usize {
        self.agents.iter().map(|a| a.state().neighbors.len()).sum()
    }

    pub(crate) fn check_edge(&self, from: AgentId, to: AgentId) -> SimResult<()> {
        for id in [from, to] {
            if id.index() >= self.agents.len() {
                return Err(SimError::InvalidTopology(format!("no agent {}", id)));
            }
        }
        if from == to {
            return Err(SimError::InvalidTopology(format!("self edge on {}", from)));
        }
        Ok(())
    }
}
