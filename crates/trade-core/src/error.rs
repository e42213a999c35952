//! Error types for the simulation core.
//!
//! Only structural violations are errors. Infeasible trades, shortfalls and
//! deaths are ordinary simulation outcomes and show up in tick reports.

use thiserror::Error;

use crate::components::agent::AgentId;

/// Errors raised by the simulation core
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimError {
    /// Bad rates, sample sizes or population parameters
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A strategy returned something it was not allowed to
    #[error("invalid strategy response from agent {agent}: {reason}")]
    InvalidStrategyResponse { agent: AgentId, reason: String },

    /// A neighbor assignment referenced a missing agent or a self edge
    #[error("invalid topology: {0}")]
    InvalidTopology(String),

    #[error("unknown agent {0}")]
    UnknownAgent(AgentId),
}

pub type SimResult<T> = Result<T, SimError>;
