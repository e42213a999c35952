//! Trade Requests
//!
//! Values exchanged between agents during one tick. None of them outlive it.

use serde::{Deserialize, Serialize};

use super::agent::AgentId;
use super::resource::ResourceKind;

/// What a strategy asks for: `value` units of `resource` from `neighbor`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeProposal {
    pub neighbor: AgentId,
    pub resource: ResourceKind,
    pub value: f64,
}

impl TradeProposal {
    pub fn new(neighbor: AgentId, resource: impl Into<ResourceKind>, value: f64) -> Self {
        Self {
            neighbor,
            resource: resource.into(),
            value,
        }
    }
}

/// A proposal as delivered to the receiving agent's pending list.
///
/// Honoring it moves `value` units of `resource` from the receiver to the
/// requester.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub requester: AgentId,
    pub resource: ResourceKind,
    pub value: f64,
}

impl Request {
    pub fn new(requester: AgentId, resource: impl Into<ResourceKind>, value: f64) -> Self {
        Self {
            requester,
            resource: resource.into(),
            value,
        }
    }
}

/// The requester's half of an honored request, applied by the simulation
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub payer: AgentId,
    pub requester: AgentId,
    pub resource: ResourceKind,
    pub value: f64,
}

/// Result of one agent's accept phase
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcceptOutcome {
    pub settlements: Vec<Settlement>,
    /// Accepted requests the agent could not cover
    pub skipped: Vec<Request>,
}

/// Unmet consumption for one resource in one tick
#[derive(Debug, Clone, PartialEq)]
pub struct Shortfall {
    pub resource: ResourceKind,
    pub required: f64,
    pub available: f64,
}
