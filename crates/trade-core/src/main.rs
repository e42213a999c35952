//! Trade Simulation Driver
//!
//! Builds a population from settings, runs it for a fixed number of ticks (or
//! until Ctrl-C in unbounded mode) and reports how many agents are alive and
//! happy.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use trade_core::{
    default_settings_toml, EventLog, Simulation, SimulationSettings, StrategyKind, Topology,
};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "trade_sim")]
#[command(about = "A closed-population trade and survival simulation")]
struct Args {
    /// TOML settings file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Number of ticks to simulate
    #[arg(long)]
    ticks: Option<u64>,

    /// Population size
    #[arg(long)]
    agents: Option<usize>,

    /// Strategy given to every agent
    #[arg(long, value_enum)]
    strategy: Option<StrategyKind>,

    /// Neighbor graph
    #[arg(long, value_enum)]
    topology: Option<Topology>,

    /// Ignore the tick count and run until Ctrl-C
    #[arg(long)]
    unbounded: bool,

    /// Keep one history entry in the summary every this many ticks
    #[arg(long)]
    history_interval: Option<u64>,

    /// Write every tick event to this JSONL file
    #[arg(long)]
    events: Option<PathBuf>,

    /// Log every event involving this agent and print its final state
    #[arg(long)]
    follow: Option<usize>,

    /// Log a progress line every this many ticks (0 disables)
    #[arg(long, default_value_t = 100)]
    report_interval: u64,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,

    /// Print the default settings file and exit
    #[arg(long)]
    print_config: bool,
}

fn load_settings(args: &Args) -> Result<SimulationSettings, Box<dyn std::error::Error>> {
    let mut settings = match &args.config {
        Some(path) => SimulationSettings::from_file(path)?,
        None => SimulationSettings::default(),
    };

    if let Some(seed) = args.seed {
        settings.run.seed = seed;
    }
    if let Some(ticks) = args.ticks {
        settings.run.ticks = ticks;
    }
    if let Some(agents) = args.agents {
        settings.population.agent_count = agents;
    }
    if let Some(strategy) = args.strategy {
        settings.population.strategy = strategy;
    }
    if let Some(topology) = args.topology {
        settings.population.topology = topology;
    }
    if let Some(interval) = args.history_interval {
        settings.run.history_interval = interval;
    }
    settings.validate()?;
    Ok(settings)
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let settings = load_settings(&args)?;
    let mut sim = Simulation::new(&settings)?;

    let stop = Arc::new(AtomicBool::new(false));
    let limit = if args.unbounded {
        let flag = Arc::clone(&stop);
        ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))?;
        tracing::info!("running until interrupted (Ctrl-C)");
        None
    } else {
        Some(settings.run.ticks)
    };

    let mut log = match &args.events {
        Some(path) => EventLog::new(path)?,
        None => EventLog::null(),
    };
    let mut log_error: Option<std::io::Error> = None;

    let interval = args.report_interval;
    let summary = sim.run_observed(limit, Some(&*stop), |report| {
        if log_error.is_none() {
            log_error = log.log_report(report).err();
        }
        if let Some(followed) = args.follow {
            for event in report.events.iter().filter(|e| e.involves_agent(followed)) {
                tracing::info!(
                    tick = event.tick,
                    kind = ?event.kind,
                    agent = event.agent,
                    counterpart = ?event.counterpart,
                    resource = ?event.resource,
                    value = event.value,
                    "followed agent event"
                );
            }
        }
        if interval > 0 && report.tick % interval == 0 {
            tracing::info!(
                tick = report.tick,
                living = report.living,
                happy = report.happy,
                trades = report.trades_completed,
                "progress"
            );
        }
    })?;

    if let Some(e) = log_error {
        return Err(e.into());
    }
    log.flush()?;
    if let Some(path) = &args.events {
        tracing::info!(events = log.event_count(), path = %path.display(), "event log written");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Trade Simulation");
        println!("================");
        println!("Seed: {}", settings.run.seed);
        println!("Agents: {}", summary.population);
        println!("Ticks run: {}", summary.ticks_run);
        println!("Trades completed: {}", summary.trades_completed);
        println!("Trades skipped: {}", summary.trades_skipped);
        println!("Trades per tick: {:.2}", summary.trades_per_tick());
        println!("Living agents: {}", summary.final_living);
        println!("Survival rate: {:.1}%", summary.survival_rate() * 100.0);
        println!("Happy agents: {}", summary.final_happy);
        if let Some(tick) = summary.extinction_tick {
            println!("Population died out at tick {}", tick);
        }
    }

    if let Some(followed) = args.follow {
        let snapshot = sim.snapshot();
        match snapshot.agent(followed) {
            Some(agent) => println!("{}", serde_json::to_string_pretty(agent)?),
            None => tracing::warn!(agent = followed, "followed agent does not exist"),
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.print_config {
        print!("{}", default_settings_toml());
        return ExitCode::SUCCESS;
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
