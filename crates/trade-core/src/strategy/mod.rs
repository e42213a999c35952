//! Trade Strategies
//!
//! The pluggable decision logic behind each agent. A strategy proposes trades
//! to neighbors and picks which incoming requests to attempt; the agent
//! re-checks feasibility and performs the transfers.

pub mod needs;
pub mod random;
pub mod scripted;

use clap::ValueEnum;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::components::agent::AgentId;
use crate::components::request::{Request, TradeProposal};
use crate::components::resource::{ResourceConfig, ResourceKind};

pub use needs::NeedsStrategy;
pub use random::RandomStrategy;
pub use scripted::ScriptedStrategy;

/// Decision logic plugged into an agent
pub trait TradeStrategy: Send {
    /// Label used in snapshots and logs
    fn name(&self) -> &str {
        "custom"
    }

    /// Called once per tick with the agent's neighbors and a copy of its
    /// inventory. Every proposal must name one of the given neighbors.
    fn request_trade(
        &mut self,
        neighbors: &[AgentId],
        inventory: &[(ResourceKind, f64)],
    ) -> Vec<TradeProposal>;

    /// Pick the requests to attempt this tick, in the order to attempt them.
    /// Only requests from the input may be returned.
    fn accept_trade(&mut self, requests: &[Request]) -> Vec<Request>;
}

/// Never proposes, never accepts
#[derive(Debug, Clone, Copy, Default)]
pub struct IdleStrategy;

impl TradeStrategy for IdleStrategy {
    fn name(&self) -> &str {
        "idle"
    }

    fn request_trade(
        &mut self,
        _neighbors: &[AgentId],
        _inventory: &[(ResourceKind, f64)],
    ) -> Vec<TradeProposal> {
        Vec::new()
    }

    fn accept_trade(&mut self, _requests: &[Request]) -> Vec<Request> {
        Vec::new()
    }
}

/// Shipped strategies selectable from settings and the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// One random unit request per tick, one random acceptance
    #[default]
    Random,
    /// Request what consumption is short of, give away what is not consumed
    Needs,
    /// Take no part in trading
    Idle,
}

impl StrategyKind {
    /// Build a strategy for an agent. Randomized strategies get their own
    /// generator seeded from `rng`.
    pub fn build(self, config: &ResourceConfig, rng: &mut SmallRng) -> Box<dyn TradeStrategy> {
        match self {
            StrategyKind::Random => Box::new(RandomStrategy::new(SmallRng::seed_from_u64(rng.gen()))),
            StrategyKind::Needs => Box::new(NeedsStrategy::for_config(config)),
            StrategyKind::Idle => Box::new(IdleStrategy),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_does_nothing() {
        let mut idle = IdleStrategy;
        let requests = vec![Request::new(AgentId(1), "A", 1.0)];

        assert!(idle.request_trade(&[AgentId(1)], &[(ResourceKind::from("A"), 3.0)]).is_empty());
        assert!(idle.accept_trade(&requests).is_empty());
    }

    #[test]
    fn test_build_names() {
        let config = ResourceConfig::from_pairs(&[("A", 1.0)], &[("B", 1.0)]).unwrap();
        let mut rng = SmallRng::seed_from_u64(0);

        assert_eq!(StrategyKind::Random.build(&config, &mut rng).name(), "random");
        assert_eq!(StrategyKind::Needs.build(&config, &mut rng).name(), "needs");
        assert_eq!(StrategyKind::Idle.build(&config, &mut rng).name(), "idle");
    }

    #[test]
    fn test_kind_serialization() {
        assert_eq!(serde_json::to_string(&StrategyKind::Needs).unwrap(), r#""needs""#);
        assert_eq!(
            serde_json::from_str::<StrategyKind>(r#""random""#).unwrap(),
            StrategyKind::Random
        );
    }
}
