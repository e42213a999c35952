//! Shared event, report and snapshot types for the trade simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! Everything here serializes with serde so drivers can emit it as JSON.

pub mod event;
pub mod report;
pub mod snapshot;

// Re-export event types
pub use event::{TradeEvent, TradeEventKind};

// Re-export report types
pub use report::{RunSummary, TickReport, TickSummary};

// Re-export snapshot types
pub use snapshot::{AgentSnapshot, PopulationSnapshot};
