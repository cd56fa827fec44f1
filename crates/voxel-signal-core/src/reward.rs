//! Reward signals, multi-dimensional reward accumulation and shaping hooks

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Reward accumulated per dimension (reward channel)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultidimensionalReward {
    values: BTreeMap<i32, f64>,
}

impl MultidimensionalReward {
    /// Create an empty accumulator
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value to a dimension
    pub fn add(&mut self, dimension: i32, value: f64) {
        *self.values.entry(dimension).or_insert(0.0) += value;
    }

    /// Value accumulated on a dimension (0 if never touched)
    #[must_use]
    pub fn get(&self, dimension: i32) -> f64 {
        self.values.get(&dimension).copied().unwrap_or(0.0)
    }

    /// Sum over all dimensions
    #[must_use]
    pub fn total(&self) -> f64 {
        self.values.values().sum()
    }

    /// Add every dimension of another accumulator into this one
    pub fn merge(&mut self, other: &MultidimensionalReward) {
        for (dimension, value) in &other.values {
            self.add(*dimension, *value);
        }
    }

    /// Whether no dimension has been touched
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Forget all accumulated values
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Iterate `(dimension, value)` pairs in dimension order
    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.values.iter().map(|(d, v)| (*d, *v))
    }
}

/// Parsed reward distribution such as `"alice:1 bob:3"`.
///
/// An empty or unusable distribution keeps the whole reward for every agent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewardDistribution {
    weights: Vec<(String, f64)>,
    total: f64,
}

impl RewardDistribution {
    /// Parse whitespace-separated `name:weight` tokens.
    ///
    /// Malformed tokens or a non-positive total weight are logged and give
    /// the uniform distribution.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut weights = Vec::new();
        for token in text.split_whitespace() {
            let parsed = token
                .split_once(':')
                .and_then(|(name, weight)| weight.parse::<f64>().ok().map(|w| (name, w)));
            let Some((name, weight)) = parsed else {
                warn!(
                    distribution = text,
                    token,
                    "malformed reward distribution; keeping full reward"
                );
                return Self::default();
            };
            weights.push((name.to_string(), weight));
        }

        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        if !weights.is_empty() && total <= 0.0 {
            warn!(
                distribution = text,
                "reward distribution has no positive weight; keeping full reward"
            );
            return Self::default();
        }
        Self { weights, total }
    }

    /// Whether every agent keeps the whole reward
    #[must_use]
    pub fn is_uniform(&self) -> bool {
        self.weights.is_empty()
    }

    /// Fraction of a reward the named agent keeps
    #[must_use]
    pub fn share(&self, agent_name: &str) -> f64 {
        if self.is_uniform() {
            return 1.0;
        }
        let mine: f64 = self
            .weights
            .iter()
            .filter(|(name, _)| name == agent_name)
            .map(|(_, w)| w)
            .sum();
        mine / self.total
    }
}

/// Hook that adjusts a raw reward before it is scaled by proximity.
///
/// `distribution` belongs to the matcher that produced the reward.
pub trait RewardShaper: Send + Sync {
    /// Adjust a raw reward
    fn shape(&self, raw: f64, dimension: i32, distribution: &RewardDistribution) -> f64;
}

impl<F> RewardShaper for F
where
    F: Fn(f64, i32, &RewardDistribution) -> f64 + Send + Sync,
{
    fn shape(&self, raw: f64, dimension: i32, distribution: &RewardDistribution) -> f64 {
        self(raw, dimension, distribution)
    }
}

/// Shaper that passes rewards through unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityShaper;

impl RewardShaper for IdentityShaper {
    fn shape(&self, raw: f64, _dimension: i32, _distribution: &RewardDistribution) -> f64 {
        raw
    }
}

/// Shaper that scales rewards and keeps this agent's share of the
/// matcher's distribution
#[derive(Debug, Clone)]
pub struct DistributionShaper {
    /// Name of the agent the reward is being computed for
    pub agent_name: String,
    /// Multiplier applied to every reward
    pub scale: f64,
}

impl DistributionShaper {
    /// Create a shaper for the named agent
    pub fn new(agent_name: impl Into<String>, scale: f64) -> Self {
        Self {
            agent_name: agent_name.into(),
            scale,
        }
    }
}

impl RewardShaper for DistributionShaper {
    fn shape(&self, raw: f64, _dimension: i32, distribution: &RewardDistribution) -> f64 {
        raw * self.scale * distribution.share(&self.agent_name)
    }
}
