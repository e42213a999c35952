//! Simulation
//!
//! Owns the agent arena and drives ticks. Every tick runs four population-wide
//! passes in a fixed order (produce, request, accept, consume) and no agent
//! starts a pass before every agent has finished the previous one.

pub mod topology;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use trade_events::{RunSummary, TickReport, TradeEvent, TradeEventKind};

use crate::components::agent::{Agent, AgentId};
use crate::components::resource::ResourceKind;
use crate::config::SimulationSettings;
use crate::error::{SimError, SimResult};
use crate::output::stats::StatsCollector;
use crate::setup::spawn_population;

/// A closed population of trading agents
#[derive(Debug)]
pub struct Simulation {
    agents: Vec<Agent>,
    current_tick: u64,
    history_interval: u64,
}

impl Simulation {
    /// Build a population from settings and install its topology
    pub fn new(settings: &SimulationSettings) -> SimResult<Self> {
        settings.validate()?;
        let mut rng = SmallRng::seed_from_u64(settings.run.seed);
        let agents = spawn_population(settings, &mut rng)?;

        let mut sim = Self::from_agents(agents)?;
        sim.history_interval = settings.run.history_interval;
        sim.apply_topology(settings.population.topology);

        tracing::info!(
            agents = sim.len(),
            seed = settings.run.seed,
            strategy = ?settings.population.strategy,
            "simulation created"
        );
        Ok(sim)
    }

    /// Adopt a hand-built population. Agents are re-indexed by position and
    /// any neighbor sets they carry are checked against the new indices.
    pub fn from_agents(mut agents: Vec<Agent>) -> SimResult<Self> {
        for (index, agent) in agents.iter_mut().enumerate() {
            agent.set_id(AgentId(index));
        }
        let sim = Self {
            agents,
            current_tick: 0,
            history_interval: 1,
        };
        for agent in &sim.agents {
            for &to in &agent.state().neighbors {
                sim.check_edge(agent.id(), to)?;
            }
        }
        Ok(sim)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Ticks completed so far
    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> SimResult<&Agent> {
        self.agents.get(id.index()).ok_or(SimError::UnknownAgent(id))
    }

    pub fn agent_mut(&mut self, id: AgentId) -> SimResult<&mut Agent> {
        self.agents.get_mut(id.index()).ok_or(SimError::UnknownAgent(id))
    }

    pub fn set_history_interval(&mut self, interval: u64) {
        self.history_interval = interval.max(1);
    }

    pub fn count_living_agents(&self) -> usize {
        self.agents.iter().filter(|a| a.is_healthy()).count()
    }

    pub fn count_happy_agents(&self) -> usize {
        self.agents.iter().filter(|a| a.is_happy()).count()
    }

    /// Population-wide stock per resource kind
    pub fn resource_totals(&self) -> BTreeMap<ResourceKind, f64> {
        let mut totals = BTreeMap::new();
        for agent in &self.agents {
            for (kind, quantity) in &agent.state().inventory {
                *totals.entry(kind.clone()).or_insert(0.0) += quantity;
            }
        }
        totals
    }

    /// Run one tick through all four phases.
    ///
    /// A tick that returns an error is abandoned: production and any trades
    /// settled before the failing agent stay applied, every pending list is
    /// cleared and `current_tick` does not advance. Ticking again is safe.
    pub fn tick(&mut self) -> SimResult<TickReport> {
        let tick = self.current_tick + 1;
        let mut report = TickReport::new(tick);
        let living_before = self.count_living_agents();

        self.produce_phase();
        let traded = self
            .request_phase(&mut report)
            .and_then(|()| self.accept_phase(&mut report));
        if let Err(err) = traded {
            self.clear_pending();
            tracing::warn!(tick, error = %err, "tick abandoned");
            return Err(err);
        }
        self.consume_phase(&mut report);

        self.current_tick = tick;
        report.living = self.count_living_agents();
        report.happy = self.count_happy_agents();
        report.resource_totals = self
            .resource_totals()
            .into_iter()
            .map(|(k, q)| (k.0, q))
            .collect();

        tracing::debug!(
            tick,
            requests = report.requests_delivered,
            trades = report.trades_completed,
            skipped = report.trades_skipped,
            shortfalls = report.shortfalls,
            living = report.living,
            happy = report.happy,
            "tick complete"
        );
        if living_before > 0 && report.living == 0 {
            tracing::warn!(tick, "every agent is dead");
        }
        Ok(report)
    }

    /// Run exactly `iterations` ticks
    pub fn run(&mut self, iterations: u64) -> SimResult<RunSummary> {
        self.run_observed(Some(iterations), None, |_| {})
    }

    /// Run until `stop` is raised. The flag is only read between ticks.
    pub fn run_until(&mut self, stop: &AtomicBool) -> SimResult<RunSummary> {
        self.run_observed(None, Some(stop), |_| {})
    }

    /// General driver: stops after `limit` ticks (if any) or once `stop` is
    /// raised (if given), calling `on_tick` with every report.
    pub fn run_observed(
        &mut self,
        limit: Option<u64>,
        stop: Option<&AtomicBool>,
        mut on_tick: impl FnMut(&TickReport),
    ) -> SimResult<RunSummary> {
        let mut stats = StatsCollector::new(self.len()).with_history_interval(self.history_interval);
        let mut ran = 0u64;

        tracing::info!(start_tick = self.current_tick, ?limit, "run started");
        loop {
            if limit.is_some_and(|n| ran >= n) {
                break;
            }
            if stop.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                tracing::info!(tick = self.current_tick, "run interrupted");
                break;
            }
            let report = self.tick()?;
            on_tick(&report);
            stats.record(&report);
            ran += 1;
        }

        let summary = stats.finish(self);
        tracing::info!(
            ticks = summary.ticks_run,
            living = summary.final_living,
            happy = summary.final_happy,
            "run finished"
        );
        Ok(summary)
    }

    fn produce_phase(&mut self) {
        for agent in &mut self.agents {
            agent.produce();
        }
    }

    /// Every request is in its recipient's pending list before this returns.
    /// Nothing is delivered unless every agent's proposals are valid.
    fn request_phase(&mut self, report: &mut TickReport) -> SimResult<()> {
        let tick = report.tick;

        let mut deliveries = Vec::new();
        for index in 0..self.agents.len() {
            let from = AgentId(index);
            for (to, request) in self.agents[index].request_trade()? {
                // Neighbor sets are public and may have been edited directly
                self.check_edge(from, to)?;
                deliveries.push((from, to, request));
            }
        }

        for (from, to, request) in deliveries {
            report.record(
                TradeEvent::new(tick, TradeEventKind::RequestDelivered, from.index())
                    .with_counterpart(to.index())
                    .with_resource(request.resource.as_str(), request.value),
            );
            self.agents[to.index()].receive(request);
        }
        Ok(())
    }

    /// Each agent settles its own pending list; the requester is credited
    /// before the next agent runs.
    fn accept_phase(&mut self, report: &mut TickReport) -> SimResult<()> {
        let tick = report.tick;
        self.check_requesters()?;

        for index in 0..self.agents.len() {
            let outcome = self.agents[index].accept_trade()?;

            for settlement in &outcome.settlements {
                self.agents[settlement.requester.index()].settle(settlement);
                report.record(
                    TradeEvent::new(tick, TradeEventKind::TradeCompleted, index)
                        .with_counterpart(settlement.requester.index())
                        .with_resource(settlement.resource.as_str(), settlement.value),
                );
            }
            for request in &outcome.skipped {
                report.record(
                    TradeEvent::new(tick, TradeEventKind::TradeSkipped, index)
                        .with_counterpart(request.requester.index())
                        .with_resource(request.resource.as_str(), request.value),
                );
            }
        }
        debug_assert!(self.agents.iter().all(|a| a.state().pending_requests.is_empty()));
        Ok(())
    }

    /// Every pending request must come from an agent in the arena
    fn check_requesters(&self) -> SimResult<()> {
        for agent in &self.agents {
            for request in &agent.state().pending_requests {
                if request.requester.index() >= self.agents.len() {
                    return Err(SimError::InvalidTopology(format!(
                        "request pending on {} comes from missing agent {}",
                        agent.id(),
                        request.requester
                    )));
                }
            }
        }
        Ok(())
    }

    fn clear_pending(&mut self) {
        for agent in &mut self.agents {
            agent.state_mut().pending_requests.clear();
        }
    }

    fn consume_phase(&mut self, report: &mut TickReport) {
        let tick = report.tick;
        for agent in &mut self.agents {
            let was_alive = agent.is_healthy();
            let index = agent.id().index();

            for shortfall in agent.consume() {
                report.record(
                    TradeEvent::new(tick, TradeEventKind::Shortfall, index)
                        .with_resource(shortfall.resource.as_str(), shortfall.required),
                );
            }
            if was_alive && !agent.is_healthy() {
                report.record(TradeEvent::new(tick, TradeEventKind::AgentDied, index));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::agent::AgentState;
    use crate::components::request::{Request, TradeProposal};
    use crate::components::resource::ResourceConfig;
    use crate::strategy::{IdleStrategy, ScriptedStrategy, TradeStrategy};

    fn agent(
        strategy: Box<dyn TradeStrategy>,
        production: &[(&str, f64)],
        consumption: &[(&str, f64)],
    ) -> Agent {
        let config = ResourceConfig::from_pairs(production, consumption).unwrap();
        let state = AgentState::for_config(&config, 1.0, 1.0);
        Agent::new(strategy, config, state)
    }

    #[test]
    fn test_from_agents_reindexes() {
        let sim = Simulation::from_agents(vec![
            agent(Box::new(IdleStrategy), &[("A", 1.0)], &[]),
            agent(Box::new(IdleStrategy), &[("B", 1.0)], &[]),
        ])
        .unwrap();

        assert_eq!(sim.len(), 2);
        assert_eq!(sim.agents()[1].id(), AgentId(1));
        assert!(matches!(sim.agent(AgentId(2)), Err(SimError::UnknownAgent(_))));
    }

    #[test]
    fn test_from_agents_rejects_dangling_neighbors() {
        let mut lonely = agent(Box::new(IdleStrategy), &[("A", 1.0)], &[]);
        lonely.state_mut().neighbors.insert(AgentId(3));

        assert!(matches!(
            Simulation::from_agents(vec![lonely]),
            Err(SimError::InvalidTopology(_))
        ));
    }

    #[test]
    fn test_tick_counts_and_report() {
        let ask = vec![TradeProposal::new(AgentId(1), "A", 1.0)];
        let mut sim = Simulation::from_agents(vec![
            agent(Box::new(ScriptedStrategy::new(vec![ask], false)), &[], &[("A", 1.0)]),
            agent(Box::new(ScriptedStrategy::new(Vec::new(), true)), &[("A", 1.0)], &[]),
        ])
        .unwrap();
        sim.connect_all();

        let report = sim.tick().unwrap();

        assert_eq!(report.tick, 1);
        assert_eq!(sim.current_tick(), 1);
        assert_eq!(report.requests_delivered, 1);
        assert_eq!(report.trades_completed, 1);
        assert_eq!(report.shortfalls, 0);
        assert_eq!(report.living, 2);
        assert_eq!(report.happy, 2);
        assert_eq!(report.resource_totals.get("A"), Some(&0.0));
        assert_eq!(sim.agents()[0].state().happiness, 2.0);
        assert_eq!(sim.agents()[1].state().happiness, 2.0);
    }

    #[test]
    fn test_strategy_error_aborts_tick() {
        let bad = vec![TradeProposal::new(AgentId(1), "A", -1.0)];
        let mut sim = Simulation::from_agents(vec![
            agent(Box::new(ScriptedStrategy::new(vec![bad], false)), &[], &[]),
            agent(Box::new(IdleStrategy), &[], &[]),
        ])
        .unwrap();
        sim.connect_all();

        assert!(matches!(
            sim.tick(),
            Err(SimError::InvalidStrategyResponse { agent: AgentId(0), .. })
        ));
    }

    #[test]
    fn test_neighbor_outside_arena_is_topology_error() {
        let ask = vec![TradeProposal::new(AgentId(9), "A", 1.0)];
        let mut sim = Simulation::from_agents(vec![
            agent(Box::new(ScriptedStrategy::new(vec![ask], false)), &[], &[]),
            agent(Box::new(IdleStrategy), &[("A", 1.0)], &[]),
        ])
        .unwrap();
        sim.agent_mut(AgentId(0))
            .unwrap()
            .state_mut()
            .neighbors
            .insert(AgentId(9));

        assert!(matches!(sim.tick(), Err(SimError::InvalidTopology(_))));
        assert_eq!(sim.current_tick(), 0);
    }

    #[test]
    fn test_self_neighbor_is_topology_error() {
        let ask = vec![TradeProposal::new(AgentId(0), "A", 1.0)];
        let mut sim = Simulation::from_agents(vec![agent(
            Box::new(ScriptedStrategy::new(vec![ask], true)),
            &[("A", 1.0)],
            &[],
        )])
        .unwrap();
        sim.agent_mut(AgentId(0))
            .unwrap()
            .state_mut()
            .neighbors
            .insert(AgentId(0));

        assert!(matches!(sim.tick(), Err(SimError::InvalidTopology(_))));
    }

    #[test]
    fn test_request_from_missing_agent_is_topology_error() {
        let mut sim = Simulation::from_agents(vec![agent(
            Box::new(ScriptedStrategy::new(Vec::new(), true)),
            &[("A", 1.0)],
            &[],
        )])
        .unwrap();
        sim.agent_mut(AgentId(0))
            .unwrap()
            .receive(Request::new(AgentId(4), "A", 1.0));

        assert!(matches!(sim.tick(), Err(SimError::InvalidTopology(_))));
        assert!(sim.agents()[0].state().pending_requests.is_empty());
        // Nothing was paid out to the missing requester
        assert_eq!(sim.agents()[0].state().quantity(&"A".into()), 1.0);
    }

    #[test]
    fn test_failed_tick_leaves_no_stale_requests() {
        let good = vec![TradeProposal::new(AgentId(1), "A", 1.0)];
        let bad = vec![TradeProposal::new(AgentId(0), "A", -1.0)];
        let mut sim = Simulation::from_agents(vec![
            agent(Box::new(ScriptedStrategy::new(vec![good], true)), &[], &[]),
            agent(Box::new(ScriptedStrategy::new(vec![bad], true)), &[("A", 1.0)], &[]),
        ])
        .unwrap();
        sim.connect_all();

        assert!(matches!(
            sim.tick(),
            Err(SimError::InvalidStrategyResponse { agent: AgentId(1), .. })
        ));
        assert!(sim.agents().iter().all(|a| a.state().pending_requests.is_empty()));
        assert_eq!(sim.current_tick(), 0);

        // Scripts are spent, so the retry runs clean
        let report = sim.tick().unwrap();
        assert_eq!(report.tick, 1);
        assert_eq!(report.requests_delivered, 0);
        assert_eq!(report.trades_completed, 0);
    }

    #[test]
    fn test_history_interval_applies_to_runs() {
        let mut sim = Simulation::from_agents(vec![agent(Box::new(IdleStrategy), &[("A", 1.0)], &[])])
            .unwrap();
        sim.set_history_interval(4);

        let summary = sim.run(10).unwrap();
        let ticks: Vec<u64> = summary.history.iter().map(|h| h.tick).collect();
        assert_eq!(ticks, vec![4, 8]);
    }

    #[test]
    fn test_run_exact_iterations() {
        let mut sim = Simulation::from_agents(vec![agent(Box::new(IdleStrategy), &[("A", 1.0)], &[])])
            .unwrap();

        let summary = sim.run(5).unwrap();

        assert_eq!(summary.ticks_run, 5);
        assert_eq!(sim.current_tick(), 5);
        assert_eq!(sim.agents()[0].state().quantity(&"A".into()), 5.0);
    }

    #[test]
    fn test_run_until_raised_flag_runs_nothing() {
        let mut sim = Simulation::from_agents(vec![agent(Box::new(IdleStrategy), &[("A", 1.0)], &[])])
            .unwrap();
        let stop = AtomicBool::new(true);

        let summary = sim.run_until(&stop).unwrap();
        assert_eq!(summary.ticks_run, 0);
        assert_eq!(sim.current_tick(), 0);
    }

    #[test]
    fn test_run_observed_stops_between_ticks() {
        let mut sim = Simulation::from_agents(vec![agent(Box::new(IdleStrategy), &[("A", 1.0)], &[])])
            .unwrap();
        let stop = AtomicBool::new(false);

        let summary = sim
            .run_observed(None, Some(&stop), |report| {
                if report.tick == 3 {
                    stop.store(true, Ordering::Relaxed);
                }
            })
            .unwrap();

        assert_eq!(summary.ticks_run, 3);
        assert_eq!(sim.agents()[0].state().quantity(&"A".into()), 3.0);
    }

    #[test]
    fn test_new_from_settings() {
        let mut settings = SimulationSettings::default();
        settings.population.agent_count = 10;

        let sim = Simulation::new(&settings).unwrap();

        assert_eq!(sim.len(), 10);
        assert_eq!(sim.edge_count(), 90);
        assert_eq!(sim.count_living_agents(), 10);
        assert_eq!(sim.count_happy_agents(), 10);
    }
}
