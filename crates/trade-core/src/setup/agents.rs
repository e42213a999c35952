//! Agent Spawning
//!
//! Builds the initial population: one sampled resource config, one strategy
//! and one fresh state per agent, all drawn from a single seeded generator.

use rand::rngs::SmallRng;

use crate::components::agent::{Agent, AgentId, AgentState};
use crate::components::resource::ResourceConfig;
use crate::config::SimulationSettings;
use crate::error::SimResult;

/// Spawn `agent_count` agents. Neighbor sets start empty.
pub fn spawn_population(settings: &SimulationSettings, rng: &mut SmallRng) -> SimResult<Vec<Agent>> {
    let alphabet = settings.resources.kinds();
    let params = settings.resources.sample_params();
    let population = &settings.population;

    let mut agents = Vec::with_capacity(population.agent_count);
    for index in 0..population.agent_count {
        let config = ResourceConfig::sample(&alphabet, params, rng)?;
        let strategy = population.strategy.build(&config, rng);
        let state = AgentState::for_config(
            &config,
            population.initial_health,
            population.initial_happiness,
        );
        agents.push(Agent::with_id(AgentId(index), strategy, config, state));
    }

    tracing::debug!(count = agents.len(), "spawned population");
    Ok(agents)
}
