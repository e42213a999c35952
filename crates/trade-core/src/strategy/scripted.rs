//! Scripted strategy for reproducible scenarios.

use std::collections::VecDeque;

use super::TradeStrategy;
use crate::components::agent::AgentId;
use crate::components::request::{Request, TradeProposal};
use crate::components::resource::ResourceKind;

/// Plays back one list of proposals per tick, then goes quiet. Accepts either
/// everything it receives or nothing.
#[derive(Debug, Clone, Default)]
pub struct ScriptedStrategy {
    script: VecDeque<Vec<TradeProposal>>,
    accept_all: bool,
}

impl ScriptedStrategy {
    pub fn new(script: Vec<Vec<TradeProposal>>, accept_all: bool) -> Self {
        Self {
            script: script.into(),
            accept_all,
        }
    }

    /// Repeat the same proposals for `ticks` ticks
    pub fn repeating(proposals: Vec<TradeProposal>, ticks: usize, accept_all: bool) -> Self {
        Self::new(vec![proposals; ticks], accept_all)
    }

    pub fn remaining_ticks(&self) -> usize {
        self.script.len()
    }
}

impl TradeStrategy for ScriptedStrategy {
    fn name(&self) -> &str {
        "scripted"
    }

    fn request_trade(
        &mut self,
        _neighbors: &[AgentId],
        _inventory: &[(ResourceKind, f64)],
    ) -> Vec<TradeProposal> {
        self.script.pop_front().unwrap_or_default()
    }

    fn accept_trade(&mut self, requests: &[Request]) -> Vec<Request> {
        if self.accept_all {
            requests.to_vec()
        } else {
            Vec::new()
        }
    }
}
