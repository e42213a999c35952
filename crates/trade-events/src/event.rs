//! Trade Events
//!
//! Discrete outcomes recorded while a tick runs. Agents are referred to by
//! their arena index and resources by their identifier string.

use serde::{Deserialize, Serialize};

/// What happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradeEventKind {
    /// A request was appended to a neighbor's pending list
    RequestDelivered,
    /// An accepted request was honored and the goods moved
    TradeCompleted,
    /// An accepted request could not be covered by the payer's stock
    TradeSkipped,
    /// Consumption could not be covered and health was lost
    Shortfall,
    /// Health dropped to zero or below during this tick
    AgentDied,
}

/// A single recorded outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub tick: u64,
    pub kind: TradeEventKind,
    /// Agent the event happened to (payer for trades, consumer for shortfalls)
    pub agent: usize,
    /// Counterpart agent, when there is one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterpart: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    #[serde(default)]
    pub value: f64,
}

impl TradeEvent {
    pub fn new(tick: u64, kind: TradeEventKind, agent: usize) -> Self {
        Self {
            tick,
            kind,
            agent,
            counterpart: None,
            resource: None,
            value: 0.0,
        }
    }

    pub fn with_counterpart(mut self, counterpart: usize) -> Self {
        self.counterpart = Some(counterpart);
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>, value: f64) -> Self {
        self.resource = Some(resource.into());
        self.value = value;
        self
    }

    /// Parse an event from a JSON line
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }

    /// Serialize the event as a single JSON line
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn involves_agent(&self, agent: usize) -> bool {
        self.agent == agent || self.counterpart == Some(agent)
    }
}
