//! Demand-driven strategy.
//!
//! Knows its own consumption rates, asks for exactly what stock is short of,
//! and gives away kinds it never consumes.

use std::collections::BTreeMap;

use super::TradeStrategy;
use crate::components::agent::AgentId;
use crate::components::request::{Request, TradeProposal};
use crate::components::resource::{ResourceConfig, ResourceKind};

#[derive(Debug, Clone)]
pub struct NeedsStrategy {
    needs: BTreeMap<ResourceKind, f64>,
    /// Rotates which neighbor is asked first
    cursor: usize,
}

impl NeedsStrategy {
    pub fn new(needs: BTreeMap<ResourceKind, f64>) -> Self {
        Self { needs, cursor: 0 }
    }

    pub fn for_config(config: &ResourceConfig) -> Self {
        Self::new(config.consumption().clone())
    }
}

impl TradeStrategy for NeedsStrategy {
    fn name(&self) -> &str {
        "needs"
    }

    fn request_trade(
        &mut self,
        neighbors: &[AgentId],
        inventory: &[(ResourceKind, f64)],
    ) -> Vec<TradeProposal> {
        if neighbors.is_empty() {
            return Vec::new();
        }

        let held = |kind: &ResourceKind| {
            inventory
                .iter()
                .find(|(k, _)| k == kind)
                .map_or(0.0, |(_, q)| *q)
        };

        let mut proposals = Vec::new();
        for (offset, (kind, rate)) in self.needs.iter().enumerate() {
            let deficit = rate - held(kind);
            if deficit <= 0.0 {
                continue;
            }
            let neighbor = neighbors[(self.cursor + offset) % neighbors.len()];
            proposals.push(TradeProposal::new(neighbor, kind.clone(), deficit));
        }
        self.cursor = self.cursor.wrapping_add(1);
        proposals
    }

    fn accept_trade(&mut self, requests: &[Request]) -> Vec<Request> {
        requests
            .iter()
            .filter(|r| !self.needs.contains_key(&r.resource))
            .cloned()
            .collect()
    }
}
