//! Reward for standing near blocks of given types
//!
//! Each matcher entry carries its own reward, cooldown and
//! single-vs-cumulative mode. On every evaluation the cube of side
//! `2 * radius + 1` around the agent is scanned; every matching cell
//! contributes its matcher's (shaped) reward scaled linearly by proximity,
//! reaching 0 at `radius` blocks and the full reward at the agent's exact
//! position. Per-matcher tallies are then combined by max or sum.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use voxel_signal_core::{
    CategoryRegistry, EventBus, EventKind, MatchSpec, MissionEvent, MissionHandler,
    MultidimensionalReward, Result, RewardDistribution, RewardProducer, RewardShaper, SignalError,
    SpecMatcher, Subscription, WorldQuery,
};

/// Scan radius used when the parameters do not set one
pub const DEFAULT_RADIUS: u32 = 10;

fn default_radius() -> u32 {
    DEFAULT_RADIUS
}

/// How several matching cells of the same matcher are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WithinMatcher {
    /// Keep the single strongest contribution
    MaxSingle,
    /// Add every contribution
    SumAll,
}

/// How per-matcher tallies are combined into the engine's output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcrossMatchers {
    /// Largest tally, starting from 0
    Max,
    /// Sum of all tallies
    Sum,
}

impl AcrossMatchers {
    /// Combine per-matcher tallies.
    ///
    /// `Max` folds from 0, so a configuration whose tallies are all
    /// negative reports 0.
    pub fn combine(self, tallies: impl IntoIterator<Item = f64>) -> f64 {
        match self {
            Self::Max => tallies
                .into_iter()
                .fold(0.0, |best, t| if t > best { t } else { best }),
            Self::Sum => tallies.into_iter().sum(),
        }
    }
}

/// Linear proximity falloff: 1 at distance 0, 0 at `radius` and beyond
#[must_use]
pub fn distance_factor(distance: f64, radius: f64) -> f64 {
    ((radius - distance) / radius).max(0.0)
}

/// One rewarded block specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockSpecWithReward {
    /// Types, colours and variants to match
    #[serde(flatten)]
    pub spec: MatchSpec,
    /// Reward at distance 0
    pub reward: f64,
    /// Non-firing evaluations required before the matcher fires again
    #[serde(default)]
    pub cooldown_in_ticks: u32,
    /// Keep only the strongest cell instead of summing all cells
    #[serde(default)]
    pub single_block: bool,
    /// Distribution string handed to the reward shaper
    #[serde(default)]
    pub distribution: String,
}

impl BlockSpecWithReward {
    /// Entry rewarding `spec` with `reward`, no cooldown, summing cells
    #[must_use]
    pub fn new(spec: MatchSpec, reward: f64) -> Self {
        Self {
            spec,
            reward,
            cooldown_in_ticks: 0,
            single_block: false,
            distribution: String::new(),
        }
    }

    /// Set the cooldown
    #[must_use]
    pub fn cooldown(mut self, ticks: u32) -> Self {
        self.cooldown_in_ticks = ticks;
        self
    }

    /// Keep only the strongest matching cell
    #[must_use]
    pub fn single_block(mut self) -> Self {
        self.single_block = true;
        self
    }
}

/// Parameters of a nearby-block reward handler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyBlockRewardParams {
    /// Reward channel the output is added to
    #[serde(default)]
    pub dimension: i32,
    /// Take the best matcher instead of summing matchers
    #[serde(default)]
    pub max: bool,
    /// Scan radius in blocks
    #[serde(default = "default_radius")]
    pub radius: u32,
    /// Also evaluate whenever the reward is pulled
    #[serde(default)]
    pub evaluate_on_pull: bool,
    /// Rewarded block specifications, in priority order
    pub block: Vec<BlockSpecWithReward>,
}

impl NearbyBlockRewardParams {
    /// Parameters with default radius on dimension 0
    #[must_use]
    pub fn new(block: Vec<BlockSpecWithReward>) -> Self {
        Self {
            dimension: 0,
            max: false,
            radius: DEFAULT_RADIUS,
            evaluate_on_pull: false,
            block,
        }
    }

    /// Bind parameters from a loosely typed record
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

#[derive(Debug)]
struct BlockRewardEntry {
    matcher: SpecMatcher,
    reward: f64,
    cooldown: u32,
    within: WithinMatcher,
    distribution: RewardDistribution,
}

/// Distance-weighted reward for nearby blocks
pub struct ProximityRewardEngine {
    entries: Vec<BlockRewardEntry>,
    /// Indexed like `entries`
    ticks_since_fire: Vec<u32>,
    across: AcrossMatchers,
    dimension: i32,
    radius: i64,
    evaluate_on_pull: bool,
    shaper: Arc<dyn RewardShaper>,
    cached: MultidimensionalReward,
    subscription: Option<Subscription>,
}

impl ProximityRewardEngine {
    /// Build the engine, resolving every block type up front
    pub fn new(
        params: &NearbyBlockRewardParams,
        registry: &CategoryRegistry,
        shaper: Arc<dyn RewardShaper>,
    ) -> Result<Self> {
        if params.radius == 0 {
            return Err(SignalError::InvalidParameters(
                "nearby block radius must be at least 1".to_string(),
            ));
        }

        let entries = params
            .block
            .iter()
            .map(|spec| {
                Ok(BlockRewardEntry {
                    matcher: SpecMatcher::new(&spec.spec, registry)?,
                    reward: spec.reward,
                    cooldown: spec.cooldown_in_ticks,
                    within: if spec.single_block {
                        WithinMatcher::MaxSingle
                    } else {
                        WithinMatcher::SumAll
                    },
                    distribution: RewardDistribution::parse(&spec.distribution),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            matchers = entries.len(),
            radius = params.radius,
            dimension = params.dimension,
            max = params.max,
            "nearby block reward configured"
        );

        Ok(Self {
            ticks_since_fire: vec![0; entries.len()],
            entries,
            across: if params.max {
                AcrossMatchers::Max
            } else {
                AcrossMatchers::Sum
            },
            dimension: params.dimension,
            radius: i64::from(params.radius),
            evaluate_on_pull: params.evaluate_on_pull,
            shaper,
            cached: MultidimensionalReward::new(),
            subscription: None,
        })
    }

    /// Reward channel
    #[must_use]
    pub fn dimension(&self) -> i32 {
        self.dimension
    }

    /// Evaluations since matcher `index` last fired
    #[must_use]
    pub fn cooldown_counter(&self, index: usize) -> Option<u32> {
        self.ticks_since_fire.get(index).copied()
    }

    /// Run one scan and return the combined reward.
    ///
    /// Advances cooldowns: matchers that fired restart at 0, the others
    /// count one more idle evaluation.
    #[allow(clippy::cast_precision_loss)]
    pub fn evaluate(&mut self, world: &dyn WorldQuery) -> f64 {
        // Eligibility is decided once per pass.
        let eligible: Vec<bool> = self
            .entries
            .iter()
            .zip(&self.ticks_since_fire)
            .map(|(entry, ticks)| *ticks >= entry.cooldown)
            .collect();
        let adjusted: Vec<f64> = self
            .entries
            .iter()
            .map(|entry| {
                self.shaper
                    .shape(entry.reward, self.dimension, &entry.distribution)
            })
            .collect();
        let mut tallies: Vec<Option<f64>> = vec![None; self.entries.len()];

        if eligible.iter().any(|e| *e) {
            let agent = world.agent_position();
            let centre = world.agent_cell();
            let r = self.radius;
            let radius = r as f64;

            for dx in -r..=r {
                for dy in -r..=r {
                    for dz in -r..=r {
                        let cell = centre.offset(dx, dy, dz);
                        let Some(block) = world.block_at(cell) else {
                            continue;
                        };
                        let mut distance = None;

                        for (i, entry) in self.entries.iter().enumerate() {
                            if !eligible[i] || !entry.matcher.matches(&block) {
                                continue;
                            }
                            // Corners beyond the radius still fire, contributing 0.
                            let d = *distance
                                .get_or_insert_with(|| agent.distance(&cell.centre()));
                            let contribution = adjusted[i] * distance_factor(d, radius);
                            tallies[i] = Some(match (entry.within, tallies[i]) {
                                (_, None) => contribution,
                                (WithinMatcher::MaxSingle, Some(t)) => t.max(contribution),
                                (WithinMatcher::SumAll, Some(t)) => t + contribution,
                            });
                            self.ticks_since_fire[i] = 0;
                        }
                    }
                }
            }
        }

        for (ticks, tally) in self.ticks_since_fire.iter_mut().zip(&tallies) {
            if tally.is_none() {
                *ticks = ticks.saturating_add(1);
            }
        }

        let total = self
            .across
            .combine(tallies.iter().map(|t| t.unwrap_or(0.0)));
        trace!(
            dimension = self.dimension,
            fired = tallies.iter().filter(|t| t.is_some()).count(),
            total,
            "nearby block pass"
        );
        total
    }

    /// Evaluate and hold the result until the next reward pull
    pub fn on_discrete_move(&mut self, world: &dyn WorldQuery) {
        let value = self.evaluate(world);
        self.cached.add(self.dimension, value);
    }
}

impl MissionHandler for ProximityRewardEngine {
    fn name(&self) -> &'static str {
        "nearby_block_reward"
    }

    fn prepare(&mut self, bus: &EventBus) -> Result<()> {
        self.ticks_since_fire.fill(0);
        self.cached.clear();
        self.subscription = Some(bus.subscribe(&[EventKind::DiscreteMove]));
        Ok(())
    }

    fn pump(&mut self, world: &dyn WorldQuery) {
        let events = match self.subscription.as_mut() {
            Some(subscription) => subscription.drain(),
            None => return,
        };
        for event in events {
            if event == MissionEvent::DiscreteMove {
                self.on_discrete_move(world);
            }
        }
    }

    fn cleanup(&mut self) {
        self.subscription = None;
    }
}

impl RewardProducer for ProximityRewardEngine {
    fn get_reward(&mut self, world: &dyn WorldQuery, reward: &mut MultidimensionalReward) {
        if self.evaluate_on_pull {
            self.on_discrete_move(world);
        }
        reward.merge(&self.cached);
        self.cached.clear();
    }
}
