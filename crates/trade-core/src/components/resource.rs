//! Resource Components
//!
//! Resource identifiers and the fixed per-agent production/consumption rates.

use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::error::{SimError, SimResult};

/// Identifier of a fungible good. Ordering only makes iteration stable.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceKind(pub String);

impl ResourceKind {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceKind {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<char> for ResourceKind {
    fn from(id: char) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The 26 uppercase letters
pub fn default_alphabet() -> Vec<ResourceKind> {
    ('A'..='Z').map(ResourceKind::from).collect()
}

/// How many kinds an agent produces and consumes, and at what rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleParams {
    pub produce_count: usize,
    pub consume_count: usize,
    pub production_rate: f64,
    pub consumption_rate: f64,
}

impl Default for SampleParams {
    fn default() -> Self {
        Self {
            produce_count: 2,
            consume_count: 2,
            production_rate: 1.0,
            consumption_rate: 1.0,
        }
    }
}

/// Fixed production and consumption rates, assigned once at agent creation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceConfig {
    production: BTreeMap<ResourceKind, f64>,
    consumption: BTreeMap<ResourceKind, f64>,
}

impl ResourceConfig {
    /// Build a config from explicit rates. Negative or non-finite rates are rejected.
    pub fn new(
        production: impl IntoIterator<Item = (ResourceKind, f64)>,
        consumption: impl IntoIterator<Item = (ResourceKind, f64)>,
    ) -> SimResult<Self> {
        let production = collect_rates("production", production)?;
        let consumption = collect_rates("consumption", consumption)?;
        Ok(Self {
            production,
            consumption,
        })
    }

    /// Shorthand for building a config from string identifiers
    pub fn from_pairs(production: &[(&str, f64)], consumption: &[(&str, f64)]) -> SimResult<Self> {
        Self::new(
            production.iter().map(|&(k, r)| (ResourceKind::from(k), r)),
            consumption.iter().map(|&(k, r)| (ResourceKind::from(k), r)),
        )
    }

    /// Draw distinct produced kinds and, independently, distinct consumed kinds
    /// from the alphabet.
    pub fn sample<R: Rng + ?Sized>(
        alphabet: &[ResourceKind],
        params: SampleParams,
        rng: &mut R,
    ) -> SimResult<Self> {
        if alphabet.is_empty() {
            return Err(SimError::InvalidConfig("resource alphabet is empty".into()));
        }
        for (label, count) in [
            ("produce_count", params.produce_count),
            ("consume_count", params.consume_count),
        ] {
            if count > alphabet.len() {
                return Err(SimError::InvalidConfig(format!(
                    "{} {} exceeds alphabet size {}",
                    label,
                    count,
                    alphabet.len()
                )));
            }
        }

        let produced: Vec<_> = index::sample(rng, alphabet.len(), params.produce_count)
            .iter()
            .map(|i| (alphabet[i].clone(), params.production_rate))
            .collect();
        let consumed: Vec<_> = index::sample(rng, alphabet.len(), params.consume_count)
            .iter()
            .map(|i| (alphabet[i].clone(), params.consumption_rate))
            .collect();

        Self::new(produced, consumed)
    }

    pub fn production(&self) -> &BTreeMap<ResourceKind, f64> {
        &self.production
    }

    pub fn consumption(&self) -> &BTreeMap<ResourceKind, f64> {
        &self.consumption
    }

    pub fn production_rate(&self, kind: &ResourceKind) -> Option<f64> {
        self.production.get(kind).copied()
    }

    pub fn consumption_rate(&self, kind: &ResourceKind) -> Option<f64> {
        self.consumption.get(kind).copied()
    }

    /// Union of produced and consumed kinds
    pub fn relevant_kinds(&self) -> BTreeSet<ResourceKind> {
        self.production
            .keys()
            .chain(self.consumption.keys())
            .cloned()
            .collect()
    }
}

fn collect_rates(
    label: &str,
    rates: impl IntoIterator<Item = (ResourceKind, f64)>,
) -> SimResult<BTreeMap<ResourceKind, f64>> {
    let mut out = BTreeMap::new();
    for (kind, rate) in rates {
        if !rate.is_finite() || rate < 0.0 {
            return Err(SimError::InvalidConfig(format!(
                "{} rate for {} must be a non-negative number, got {}",
                label, kind, rate
            )));
        }
        out.insert(kind, rate);
    }
    Ok(out)
}
