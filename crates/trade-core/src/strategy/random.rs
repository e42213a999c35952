//! Random baseline strategy.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::TradeStrategy;
use crate::components::agent::AgentId;
use crate::components::request::{Request, TradeProposal};
use crate::components::resource::ResourceKind;

/// Asks a random neighbor for one unit of a random held kind, and accepts a
/// single random incoming request.
#[derive(Debug, Clone)]
pub struct RandomStrategy {
    rng: SmallRng,
}

impl RandomStrategy {
    pub fn new(rng: SmallRng) -> Self {
        Self { rng }
    }

    pub fn from_seed(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }
}

impl TradeStrategy for RandomStrategy {
    fn name(&self) -> &str {
        "random"
    }

    fn request_trade(
        &mut self,
        neighbors: &[AgentId],
        inventory: &[(ResourceKind, f64)],
    ) -> Vec<TradeProposal> {
        let Some((resource, _)) = inventory.choose(&mut self.rng) else {
            return Vec::new();
        };
        let Some(neighbor) = neighbors.choose(&mut self.rng) else {
            return Vec::new();
        };
        vec![TradeProposal::new(*neighbor, resource.clone(), 1.0)]
    }

    fn accept_trade(&mut self, requests: &[Request]) -> Vec<Request> {
        requests.choose(&mut self.rng).cloned().into_iter().collect()
    }
}
