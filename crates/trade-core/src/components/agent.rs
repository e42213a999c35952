//! Agent Components
//!
//! Agent identity, mutable per-agent state, and the four tick phases.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use super::request::{AcceptOutcome, Request, Settlement, Shortfall};
use super::resource::{ResourceConfig, ResourceKind};
use crate::error::{SimError, SimResult};
use crate::strategy::TradeStrategy;

/// Stable index of an agent in the simulation arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub usize);

impl AgentId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Mutable per-agent simulation state
#[derive(Debug, Clone, PartialEq)]
pub struct AgentState {
    pub health: f64,
    pub happiness: f64,
    pub inventory: BTreeMap<ResourceKind, f64>,
    pub neighbors: BTreeSet<AgentId>,
    pub pending_requests: Vec<Request>,
}

impl AgentState {
    /// Empty stock of every listed kind, no neighbors
    pub fn new(
        kinds: impl IntoIterator<Item = ResourceKind>,
        health: f64,
        happiness: f64,
    ) -> Self {
        Self {
            health,
            happiness,
            inventory: kinds.into_iter().map(|k| (k, 0.0)).collect(),
            neighbors: BTreeSet::new(),
            pending_requests: Vec::new(),
        }
    }

    /// Empty stock of every kind the config produces or consumes
    pub fn for_config(config: &ResourceConfig, health: f64, happiness: f64) -> Self {
        Self::new(config.relevant_kinds(), health, happiness)
    }

    /// Held quantity; kinds never seen count as zero
    pub fn quantity(&self, kind: &ResourceKind) -> f64 {
        self.inventory.get(kind).copied().unwrap_or(0.0)
    }

    /// Overwrite a stock level. Negative values are allowed for scarcity setups.
    pub fn set_quantity(&mut self, kind: impl Into<ResourceKind>, quantity: f64) {
        self.inventory.insert(kind.into(), quantity);
    }

    fn adjust(&mut self, kind: &ResourceKind, delta: f64) {
        *self.inventory.entry(kind.clone()).or_insert(0.0) += delta;
    }

    fn inventory_snapshot(&self) -> Vec<(ResourceKind, f64)> {
        self.inventory
            .iter()
            .map(|(k, q)| (k.clone(), *q))
            .collect()
    }
}

/// A strategy bound to a resource config and its state
pub struct Agent {
    id: AgentId,
    strategy: Box<dyn TradeStrategy>,
    config: ResourceConfig,
    state: AgentState,
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("id", &self.id)
            .field("strategy", &self.strategy.name())
            .field("config", &self.config)
            .field("state", &self.state)
            .finish()
    }
}

impl Agent {
    /// The id is assigned when the agent joins a simulation
    pub fn new(strategy: Box<dyn TradeStrategy>, config: ResourceConfig, state: AgentState) -> Self {
        Self::with_id(AgentId(0), strategy, config, state)
    }

    pub fn with_id(
        id: AgentId,
        strategy: Box<dyn TradeStrategy>,
        config: ResourceConfig,
        state: AgentState,
    ) -> Self {
        Self {
            id,
            strategy,
            config,
            state,
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub(crate) fn set_id(&mut self, id: AgentId) {
        self.id = id;
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AgentState {
        &mut self.state
    }

    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    pub fn is_healthy(&self) -> bool {
        self.state.health > 0.0
    }

    pub fn is_happy(&self) -> bool {
        self.state.happiness > 0.0
    }

    /// Phase 1: add every production rate to stock
    pub fn produce(&mut self) {
        for (kind, rate) in self.config.production() {
            self.state.adjust(kind, *rate);
        }
    }

    /// Phase 2: ask the strategy for proposals and address them to neighbors.
    ///
    /// Returns `(recipient, request)` pairs; the caller appends each request to
    /// the recipient's pending list.
    pub fn request_trade(&mut self) -> SimResult<Vec<(AgentId, Request)>> {
        if self.state.neighbors.is_empty() {
            return Ok(Vec::new());
        }

        let neighbors: Vec<AgentId> = self.state.neighbors.iter().copied().collect();
        let inventory = self.state.inventory_snapshot();
        let proposals = self.strategy.request_trade(&neighbors, &inventory);

        let mut deliveries = Vec::with_capacity(proposals.len());
        for proposal in proposals {
            if !self.state.neighbors.contains(&proposal.neighbor) {
                return Err(self.invalid_response(format!(
                    "proposal addressed to {}, which is not a neighbor",
                    proposal.neighbor
                )));
            }
            if !proposal.value.is_finite() || proposal.value < 0.0 {
                return Err(self.invalid_response(format!(
                    "proposal for {} carries invalid value {}",
                    proposal.resource, proposal.value
                )));
            }
            deliveries.push((
                proposal.neighbor,
                Request::new(self.id, proposal.resource, proposal.value),
            ));
        }
        Ok(deliveries)
    }

    /// Append a request addressed to this agent
    pub fn receive(&mut self, request: Request) {
        self.state.pending_requests.push(request);
    }

    /// Phase 3: let the strategy pick from the pending requests and honor the
    /// feasible ones in the order it returned them.
    ///
    /// The pending list is drained either way. Each honored request debits this
    /// agent and yields a settlement the caller must apply to the requester.
    pub fn accept_trade(&mut self) -> SimResult<AcceptOutcome> {
        if self.state.pending_requests.is_empty() {
            return Ok(AcceptOutcome::default());
        }

        let pending = std::mem::take(&mut self.state.pending_requests);
        let accepted = self.strategy.accept_trade(&pending);
        self.check_subset(&pending, &accepted)?;

        let mut outcome = AcceptOutcome::default();
        for request in accepted {
            if self.state.quantity(&request.resource) < request.value {
                tracing::trace!(
                    agent = %self.id,
                    requester = %request.requester,
                    resource = %request.resource,
                    value = request.value,
                    "skipping infeasible trade"
                );
                outcome.skipped.push(request);
                continue;
            }

            self.state.adjust(&request.resource, -request.value);
            self.state.happiness += 1.0;
            outcome.settlements.push(Settlement {
                payer: self.id,
                requester: request.requester,
                resource: request.resource,
                value: request.value,
            });
        }
        Ok(outcome)
    }

    /// Requester side of an honored request
    pub fn settle(&mut self, settlement: &Settlement) {
        self.state.adjust(&settlement.resource, settlement.value);
        self.state.happiness += 1.0;
    }

    /// Phase 4: pay every consumption rate from stock, or lose the full rate
    /// in health when stock does not cover it.
    pub fn consume(&mut self) -> Vec<Shortfall> {
        let mut shortfalls = Vec::new();
        for (kind, rate) in self.config.consumption() {
            let available = self.state.quantity(kind);
            if available >= *rate {
                self.state.adjust(kind, -rate);
            } else {
                self.state.health -= rate;
                shortfalls.push(Shortfall {
                    resource: kind.clone(),
                    required: *rate,
                    available,
                });
            }
        }
        shortfalls
    }

    /// Every accepted request must match a distinct pending one
    fn check_subset(&self, pending: &[Request], accepted: &[Request]) -> SimResult<()> {
        let mut used = vec![false; pending.len()];
        for request in accepted {
            let slot = (0..pending.len()).find(|&i| !used[i] && pending[i] == *request);
            match slot {
                Some(i) => used[i] = true,
                None => {
                    return Err(self.invalid_response(format!(
                        "accepted request from {} for {} x{} was never received",
                        request.requester, request.resource, request.value
                    )))
                }
            }
        }
        Ok(())
    }

    fn invalid_response(&self, reason: String) -> SimError {
        SimError::InvalidStrategyResponse {
            agent: self.id,
            reason,
        }
    }
}
