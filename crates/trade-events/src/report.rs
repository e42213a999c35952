//! Report Types
//!
//! Per-tick reports and whole-run summaries.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::event::{TradeEvent, TradeEventKind};

/// Everything one tick produced
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: u64,
    pub requests_delivered: usize,
    pub trades_completed: usize,
    pub trades_skipped: usize,
    pub shortfalls: usize,
    pub deaths: usize,
    /// Agents with positive health after the tick
    pub living: usize,
    /// Agents with positive happiness after the tick
    pub happy: usize,
    /// Population-wide inventory per resource after the tick
    #[serde(default)]
    pub resource_totals: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<TradeEvent>,
}

impl TickReport {
    pub fn new(tick: u64) -> Self {
        Self {
            tick,
            ..Self::default()
        }
    }

    /// Record an event and bump the matching counter
    pub fn record(&mut self, event: TradeEvent) {
        match event.kind {
            TradeEventKind::RequestDelivered => self.requests_delivered += 1,
            TradeEventKind::TradeCompleted => self.trades_completed += 1,
            TradeEventKind::TradeSkipped => self.trades_skipped += 1,
            TradeEventKind::Shortfall => self.shortfalls += 1,
            TradeEventKind::AgentDied => self.deaths += 1,
        }
        self.events.push(event);
    }

    pub fn events_of(&self, kind: TradeEventKind) -> impl Iterator<Item = &TradeEvent> {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    /// Condensed form kept in run history
    pub fn summary(&self) -> TickSummary {
        TickSummary {
            tick: self.tick,
            trades_completed: self.trades_completed,
            shortfalls: self.shortfalls,
            living: self.living,
            happy: self.happy,
        }
    }
}

/// Summary of a tick for history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickSummary {
    pub tick: u64,
    pub trades_completed: usize,
    pub shortfalls: usize,
    pub living: usize,
    pub happy: usize,
}

/// Overall statistics for a run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub ticks_run: u64,
    pub population: usize,
    pub requests_delivered: usize,
    pub trades_completed: usize,
    pub trades_skipped: usize,
    pub shortfalls: usize,
    pub deaths: usize,
    /// First tick after which nobody was alive
    #[serde(default)]
    pub extinction_tick: Option<u64>,
    pub final_living: usize,
    pub final_happy: usize,
    #[serde(default)]
    pub final_resource_totals: BTreeMap<String, f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<TickSummary>,
}

impl RunSummary {
    /// Completed trades per tick, zero for an empty run
    pub fn trades_per_tick(&self) -> f64 {
        if self.ticks_run == 0 {
            0.0
        } else {
            self.trades_completed as f64 / self.ticks_run as f64
        }
    }

    pub fn survival_rate(&self) -> f64 {
        if self.population == 0 {
            0.0
        } else {
            self.final_living as f64 / self.population as f64
        }
    }
}
