//! Statistics Output
//!
//! Folds tick reports into a run summary.

use trade_events::{RunSummary, TickReport, TickSummary};

use crate::simulation::Simulation;

/// Accumulates statistics during a run
#[derive(Debug, Clone)]
pub struct StatsCollector {
    population: usize,
    ticks_run: u64,
    requests_delivered: usize,
    trades_completed: usize,
    trades_skipped: usize,
    shortfalls: usize,
    deaths: usize,
    extinction_tick: Option<u64>,
    history_interval: u64,
    history: Vec<TickSummary>,
}

impl StatsCollector {
    pub fn new(population: usize) -> Self {
        Self {
            population,
            ticks_run: 0,
            requests_delivered: 0,
            trades_completed: 0,
            trades_skipped: 0,
            shortfalls: 0,
            deaths: 0,
            extinction_tick: None,
            history_interval: 1,
            history: Vec::new(),
        }
    }

    /// Keep one history entry every `interval` ticks
    pub fn with_history_interval(mut self, interval: u64) -> Self {
        self.history_interval = interval.max(1);
        self
    }

    /// Record the outcome of a tick
    pub fn record(&mut self, report: &TickReport) {
        self.ticks_run += 1;
        self.requests_delivered += report.requests_delivered;
        self.trades_completed += report.trades_completed;
        self.trades_skipped += report.trades_skipped;
        self.shortfalls += report.shortfalls;
        self.deaths += report.deaths;

        if self.extinction_tick.is_none() && self.population > 0 && report.living == 0 {
            self.extinction_tick = Some(report.tick);
        }
        if report.tick % self.history_interval == 0 {
            self.history.push(report.summary());
        }
    }

    /// Produce the summary, reading final counts from the simulation
    pub fn finish(self, sim: &Simulation) -> RunSummary {
        RunSummary {
            ticks_run: self.ticks_run,
            population: self.population,
            requests_delivered: self.requests_delivered,
            trades_completed: self.trades_completed,
            trades_skipped: self.trades_skipped,
            shortfalls: self.shortfalls,
            deaths: self.deaths,
            extinction_tick: self.extinction_tick,
            final_living: sim.count_living_agents(),
            final_happy: sim.count_happy_agents(),
            final_resource_totals: sim
                .resource_totals()
                .into_iter()
                .map(|(k, q)| (k.0, q))
                .collect(),
            history: self.history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(tick: u64, living: usize, trades: usize) -> TickReport {
        TickReport {
            tick,
            living,
            trades_completed: trades,
            ..TickReport::default()
        }
    }

    #[test]
    fn test_totals_and_extinction() {
        let mut stats = StatsCollector::new(3);
        stats.record(&report(1, 3, 2));
        stats.record(&report(2, 0, 1));
        stats.record(&report(3, 0, 0));

        let sim = Simulation::from_agents(Vec::new()).unwrap();
        let summary = stats.finish(&sim);

        assert_eq!(summary.ticks_run, 3);
        assert_eq!(summary.trades_completed, 3);
        assert_eq!(summary.extinction_tick, Some(2));
        assert_eq!(summary.history.len(), 3);
    }

    #[test]
    fn test_history_interval_samples() {
        let mut stats = StatsCollector::new(1).with_history_interval(5);
        for tick in 1..=12 {
            stats.record(&report(tick, 1, 0));
        }

        let summary = stats.finish(&Simulation::from_agents(Vec::new()).unwrap());
        let ticks: Vec<u64> = summary.history.iter().map(|h| h.tick).collect();
        assert_eq!(ticks, vec![5, 10]);
        assert_eq!(summary.extinction_tick, None);
    }
}
