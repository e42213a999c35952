//! Output: event logs, run statistics and population snapshots.

pub mod events;
pub mod snapshot;
pub mod stats;

pub use events::{read_events, EventLog};
pub use stats::StatsCollector;
