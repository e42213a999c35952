//! Snapshot Output
//!
//! Converts live simulation state into serializable snapshots.

use std::collections::BTreeMap;
use trade_events::{AgentSnapshot, PopulationSnapshot};

use crate::components::agent::Agent;
use crate::components::resource::ResourceKind;
use crate::simulation::Simulation;

fn string_keys(map: &BTreeMap<ResourceKind, f64>) -> BTreeMap<String, f64> {
    map.iter().map(|(k, v)| (k.0.clone(), *v)).collect()
}

/// Snapshot of a single agent
pub fn agent_snapshot(agent: &Agent) -> AgentSnapshot {
    let state = agent.state();
    AgentSnapshot {
        agent_id: agent.id().index(),
        strategy: agent.strategy_name().to_string(),
        health: state.health,
        happiness: state.happiness,
        alive: agent.is_healthy(),
        happy: agent.is_happy(),
        inventory: string_keys(&state.inventory),
        production: string_keys(agent.config().production()),
        consumption: string_keys(agent.config().consumption()),
        neighbors: state.neighbors.iter().map(|n| n.index()).collect(),
    }
}

impl Simulation {
    /// Snapshot of the whole population at the current tick
    pub fn snapshot(&self) -> PopulationSnapshot {
        PopulationSnapshot {
            tick: self.current_tick(),
            living: self.count_living_agents(),
            happy: self.count_happy_agents(),
            resource_totals: string_keys(&self.resource_totals()),
            agents: self.agents().iter().map(agent_snapshot).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::agent::AgentState;
    use crate::components::resource::ResourceConfig;
    use crate::strategy::IdleStrategy;

    #[test]
    fn test_snapshot_reflects_state() {
        let config = ResourceConfig::from_pairs(&[("A", 1.0)], &[("B", 1.0)]).unwrap();
        let mut state = AgentState::for_config(&config, 1.0, 1.0);
        state.set_quantity("A", 4.0);
        let agents = vec![
            Agent::new(Box::new(IdleStrategy), config.clone(), state),
            Agent::new(
                Box::new(IdleStrategy),
                config.clone(),
                AgentState::for_config(&config, 1.0, 1.0),
            ),
        ];
        let mut sim = Simulation::from_agents(agents).unwrap();
        sim.connect_all();

        let snapshot = sim.snapshot();

        assert_eq!(snapshot.tick, 0);
        assert_eq!(snapshot.living, 2);
        assert_eq!(snapshot.resource_totals.get("A"), Some(&4.0));
        assert_eq!(snapshot.edge_count(), 2);

        let first = snapshot.agent(0).unwrap();
        assert_eq!(first.strategy, "idle");
        assert_eq!(first.inventory.get("A"), Some(&4.0));
        assert_eq!(first.consumption.get("B"), Some(&1.0));
        assert_eq!(first.neighbors, vec![1]);

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains(r#""strategy":"idle""#));
    }
}
