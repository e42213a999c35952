//! Configuration System
//!
//! Simulation settings loaded from a TOML file. Every field has a default, so
//! a partial file only overrides what it names.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use thiserror::Error;

use crate::components::resource::{default_alphabet, ResourceKind, SampleParams};
use crate::error::{SimError, SimResult};
use crate::simulation::topology::Topology;
use crate::strategy::StrategyKind;

/// Complete simulation settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimulationSettings {
    /// Seed, length and reporting
    #[serde(default)]
    pub run: RunSettings,
    /// Population size, baselines, strategy and topology
    #[serde(default)]
    pub population: PopulationSettings,
    /// Resource alphabet and per-agent sampling
    #[serde(default)]
    pub resources: ResourceSettings,
}

impl SimulationSettings {
    /// Loads settings from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses and validates settings from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Returns the settings as a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Checks every constraint the simulation relies on.
    pub fn validate(&self) -> SimResult<()> {
        let population = &self.population;
        let resources = &self.resources;

        if population.agent_count == 0 {
            return Err(invalid("agent_count must be at least 1"));
        }
        if !population.initial_health.is_finite() || population.initial_health <= 0.0 {
            return Err(invalid(format!(
                "initial_health must be positive, got {}",
                population.initial_health
            )));
        }
        if !population.initial_happiness.is_finite() {
            return Err(invalid("initial_happiness must be a finite number"));
        }
        if self.run.history_interval == 0 {
            return Err(invalid("history_interval must be at least 1"));
        }

        if resources.alphabet.is_empty() {
            return Err(invalid("resource alphabet is empty"));
        }
        let distinct: BTreeSet<&str> = resources.alphabet.iter().map(String::as_str).collect();
        if distinct.len() != resources.alphabet.len() {
            return Err(invalid("resource alphabet contains duplicates"));
        }
        for (label, count) in [
            ("produce_count", resources.produce_count),
            ("consume_count", resources.consume_count),
        ] {
            if count > resources.alphabet.len() {
                return Err(invalid(format!(
                    "{} {} exceeds alphabet size {}",
                    label,
                    count,
                    resources.alphabet.len()
                )));
            }
        }
        for (label, rate) in [
            ("production_rate", resources.production_rate),
            ("consumption_rate", resources.consumption_rate),
        ] {
            if !rate.is_finite() || rate < 0.0 {
                return Err(invalid(format!("{} must be non-negative, got {}", label, rate)));
            }
        }
        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> SimError {
    SimError::InvalidConfig(message.into())
}

/// Seed, length and reporting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Seed for every random draw in the run
    pub seed: u64,
    /// Ticks to run in bounded mode
    pub ticks: u64,
    /// Keep one history entry every this many ticks
    pub history_interval: u64,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            seed: 42,
            ticks: 1000,
            history_interval: 1,
        }
    }
}

/// Population parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopulationSettings {
    pub agent_count: usize,
    pub initial_health: f64,
    pub initial_happiness: f64,
    pub strategy: StrategyKind,
    pub topology: Topology,
}

impl Default for PopulationSettings {
    fn default() -> Self {
        Self {
            agent_count: 100,
            initial_health: 1.0,
            initial_happiness: 1.0,
            strategy: StrategyKind::Random,
            topology: Topology::FullyConnected,
        }
    }
}

/// Resource alphabet and per-agent sampling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceSettings {
    pub alphabet: Vec<String>,
    pub produce_count: usize,
    pub consume_count: usize,
    pub production_rate: f64,
    pub consumption_rate: f64,
}

impl Default for ResourceSettings {
    fn default() -> Self {
        let params = SampleParams::default();
        Self {
            alphabet: default_alphabet().into_iter().map(|k| k.0).collect(),
            produce_count: params.produce_count,
            consume_count: params.consume_count,
            production_rate: params.production_rate,
            consumption_rate: params.consumption_rate,
        }
    }
}

impl ResourceSettings {
    pub fn kinds(&self) -> Vec<ResourceKind> {
        self.alphabet.iter().map(ResourceKind::new).collect()
    }

    pub fn sample_params(&self) -> SampleParams {
        SampleParams {
            produce_count: self.produce_count,
            consume_count: self.consume_count,
            production_rate: self.production_rate,
            consumption_rate: self.consumption_rate,
        }
    }
}

/// Errors that can occur during settings loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Invalid(#[from] SimError),
}

/// Generates a default settings file content.
pub fn default_settings_toml() -> String {
    r#"# Trade simulation settings

[run]
seed = 42
ticks = 1000
history_interval = 1

[population]
agent_count = 100
initial_health = 1.0
initial_happiness = 1.0
strategy = "random"        # random | needs | idle
topology = "fully_connected" # fully_connected | isolated

[resources]
alphabet = ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J", "K", "L", "M",
            "N", "O", "P", "Q", "R", "S", "T", "U", "V", "W", "X", "Y", "Z"]
produce_count = 2
consume_count = 2
production_rate = 1.0
consumption_rate = 1.0
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_settings() {
        let settings = SimulationSettings::default();

        assert_eq!(settings.run.seed, 42);
        assert_eq!(settings.run.ticks, 1000);
        assert_eq!(settings.population.agent_count, 100);
        assert_eq!(settings.population.initial_health, 1.0);
        assert_eq!(settings.resources.alphabet.len(), 26);
        assert_eq!(settings.resources.alphabet[0], "A");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_default_settings_toml_matches_defaults() {
        let parsed = SimulationSettings::from_str(&default_settings_toml()).unwrap();
        assert_eq!(parsed, SimulationSettings::default());
    }

    #[test]
    fn test_partial_settings_use_defaults() {
        let toml = r#"
            [population]
            agent_count = 2
            strategy = "needs"

            [resources]
            alphabet = ["A", "B"]
        "#;

        let settings = SimulationSettings::from_str(toml).unwrap();

        assert_eq!(settings.population.agent_count, 2);
        assert_eq!(settings.population.strategy, StrategyKind::Needs);
        assert_eq!(settings.population.topology, Topology::FullyConnected);
        assert_eq!(settings.resources.produce_count, 2);
        assert_eq!(settings.run.ticks, 1000);
    }

    #[test]
    fn test_oversized_sample_rejected() {
        let toml = r#"
            [resources]
            alphabet = ["A"]
        "#;

        let err = SimulationSettings::from_str(toml).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(SimError::InvalidConfig(_))));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let toml = r#"
            [resources]
            consumption_rate = -1.0
        "#;

        assert!(matches!(
            SimulationSettings::from_str(toml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_bad_population_rejected() {
        let mut settings = SimulationSettings::default();
        settings.population.agent_count = 0;
        assert!(settings.validate().is_err());

        let mut settings = SimulationSettings::default();
        settings.population.initial_health = 0.0;
        assert!(settings.validate().is_err());

        let mut settings = SimulationSettings::default();
        settings.resources.alphabet = vec!["A".into(), "A".into(), "B".into()];
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            SimulationSettings::from_str("[population\nagent_count = 1"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let mut settings = SimulationSettings::default();
        settings.run.seed = 7;
        settings.population.topology = Topology::Isolated;

        let toml = settings.to_toml().unwrap();
        assert!(toml.contains("[run]"));
        assert!(toml.contains("[population]"));
        assert_eq!(SimulationSettings::from_str(&toml).unwrap(), settings);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[run]\nseed = 9\nticks = 5").unwrap();

        let settings = SimulationSettings::from_file(file.path()).unwrap();
        assert_eq!(settings.run.seed, 9);
        assert_eq!(settings.run.ticks, 5);

        let missing = SimulationSettings::from_file(Path::new("/nonexistent/trade.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }
}
