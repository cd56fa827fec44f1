//! Quit once enough items of a kind have been smelted
//!
//! Smelting notifications arrive several times per physical event, so
//! only every `sampling_stride`-th call is processed. Processed stacks are
//! counted under a key that is colour/variant-qualified whenever some
//! matcher filters on colour or variant for that item type.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, trace};
use voxel_signal_core::{
    CategoryRegistry, CountKey, EventBus, EventKind, ItemStack, MatchSpec, MissionEvent,
    MissionHandler, QuitProducer, Result, SignalError, SpecMatcher, Subscription, WorldQuery,
};

/// Number of smelting notifications per processed one, by default
pub const DEFAULT_SAMPLING_STRIDE: u32 = 4;

fn default_sampling_stride() -> u32 {
    DEFAULT_SAMPLING_STRIDE
}

/// One item specification with its threshold and outcome code
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemSpecWithDescription {
    /// Types, colours and variants to match
    #[serde(flatten)]
    pub spec: MatchSpec,
    /// Cumulative count that triggers quit
    pub amount: u64,
    /// Outcome code reported when this entry triggers
    #[serde(default)]
    pub description: String,
}

impl ItemSpecWithDescription {
    /// Create an entry
    pub fn new(spec: MatchSpec, amount: u64, description: impl Into<String>) -> Self {
        Self {
            spec,
            amount,
            description: description.into(),
        }
    }
}

/// Parameters of a smelting quit handler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmeltingQuitParams {
    /// Item specifications, in list order
    pub item: Vec<ItemSpecWithDescription>,
    /// Process one notification out of this many
    #[serde(default = "default_sampling_stride")]
    pub sampling_stride: u32,
}

impl SmeltingQuitParams {
    /// Parameters with the default sampling stride
    #[must_use]
    pub fn new(item: Vec<ItemSpecWithDescription>) -> Self {
        Self {
            item,
            sampling_stride: DEFAULT_SAMPLING_STRIDE,
        }
    }

    /// Bind parameters from a loosely typed record
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

/// Terminal decision to end the episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuitDecision {
    /// Description of the entry that triggered
    pub outcome: String,
    /// When the decision was taken
    pub requested_at: DateTime<Utc>,
}

#[derive(Debug)]
struct ItemQuitEntry {
    matcher: SpecMatcher,
    amount: u64,
    description: String,
}

/// Counts smelted items and requests quit on threshold crossings
#[derive(Debug)]
pub struct CountingQuitEngine {
    entries: Vec<ItemQuitEntry>,
    counts: HashMap<CountKey, u64>,
    calls: u64,
    stride: u32,
    decision: Option<QuitDecision>,
    subscription: Option<Subscription>,
}

impl CountingQuitEngine {
    /// Build the engine, resolving every item type up front
    pub fn new(params: &SmeltingQuitParams, registry: &CategoryRegistry) -> Result<Self> {
        if params.sampling_stride == 0 {
            return Err(SignalError::InvalidParameters(
                "smelting sampling stride must be at least 1".to_string(),
            ));
        }

        let entries = params
            .item
            .iter()
            .map(|item| {
                Ok(ItemQuitEntry {
                    matcher: SpecMatcher::new(&item.spec, registry)?,
                    amount: item.amount,
                    description: item.description.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            entries,
            counts: HashMap::new(),
            calls: 0,
            stride: params.sampling_stride,
            decision: None,
            subscription: None,
        })
    }

    /// Handle one smelting notification. Returns whether it was processed
    /// or skipped by the sampling stride.
    pub fn on_item_smelted(&mut self, stack: &ItemStack) -> bool {
        self.calls = self.calls.wrapping_add(1);
        if self.calls % u64::from(self.stride) != 0 {
            trace!(call = self.calls, "smelting notification skipped");
            return false;
        }
        self.check_for_match(stack);
        true
    }

    /// Key under which `stack` is counted
    #[must_use]
    pub fn count_key(&self, stack: &ItemStack) -> CountKey {
        let fine = self.entries.iter().any(|entry| {
            entry.matcher.allows_category(stack.category) && entry.matcher.has_attribute_filter()
        });
        stack.count_key(fine)
    }

    /// Running count for the key `stack` maps to
    #[must_use]
    pub fn count_for(&self, stack: &ItemStack) -> u64 {
        self.counts
            .get(&self.count_key(stack))
            .copied()
            .unwrap_or(0)
    }

    /// Notifications received so far, processed or not
    #[must_use]
    pub fn calls(&self) -> u64 {
        self.calls
    }

    /// The quit decision, once taken
    #[must_use]
    pub fn quit_decision(&self) -> Option<&QuitDecision> {
        self.decision.as_ref()
    }

    fn check_for_match(&mut self, stack: &ItemStack) {
        let key = self.count_key(stack);
        let prior = self.counts.get(&key).copied().unwrap_or(0);
        let total = prior.saturating_add(u64::from(stack.count));

        if self.decision.is_none() {
            // The last crossing entry in list order supplies the outcome.
            let outcome = self
                .entries
                .iter()
                .rev()
                .find(|entry| entry.matcher.matches(stack) && total >= entry.amount)
                .map(|entry| entry.description.clone());

            if let Some(outcome) = outcome {
                info!(
                    %outcome,
                    prior,
                    count = stack.count,
                    "smelting threshold reached; requesting quit"
                );
                self.decision = Some(QuitDecision {
                    outcome,
                    requested_at: Utc::now(),
                });
            }
        }

        self.counts.insert(key, total);
    }
}

impl MissionHandler for CountingQuitEngine {
    fn name(&self) -> &'static str {
        "smelting_quit"
    }

    fn prepare(&mut self, bus: &EventBus) -> Result<()> {
        self.counts.clear();
        self.calls = 0;
        self.decision = None;
        self.subscription = Some(bus.subscribe(&[EventKind::ItemSmelted]));
        Ok(())
    }

    fn pump(&mut self, _world: &dyn WorldQuery) {
        let events = match self.subscription.as_mut() {
            Some(subscription) => subscription.drain(),
            None => return,
        };
        for event in events {
            if let MissionEvent::ItemSmelted(stack) = event {
                self.on_item_smelted(&stack);
            }
        }
    }

    fn cleanup(&mut self) {
        self.subscription = None;
    }
}

impl QuitProducer for CountingQuitEngine {
    fn wants_to_quit(&self) -> bool {
        self.decision.is_some()
    }

    fn outcome(&self) -> &str {
        self.decision.as_ref().map_or("", |d| d.outcome.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voxel_signal_core::Colour;

    fn engine(item: Vec<ItemSpecWithDescription>) -> CountingQuitEngine {
        let mut params = SmeltingQuitParams::new(item);
        params.sampling_stride = 1;
        CountingQuitEngine::new(&params, CategoryRegistry::vanilla()).unwrap()
    }

    #[test]
    fn test_count_key_follows_filters() {
        let registry = CategoryRegistry::vanilla();
        let dye = registry.resolve("dye").unwrap();
        let coal = registry.resolve("coal").unwrap();
        let engine = engine(vec![
            ItemSpecWithDescription::new(
                MatchSpec::of_types(["dye"]).with_colours([Colour::Green]),
                2,
                "green",
            ),
            ItemSpecWithDescription::new(MatchSpec::of_types(["coal"]), 2, "coal"),
        ]);

        let green = ItemStack::new(dye, 1).with_colour(Colour::Green);
        assert!(matches!(engine.count_key(&green), CountKey::Fine { .. }));
        assert_eq!(engine.count_key(&ItemStack::new(coal, 1)), CountKey::Coarse(coal));
    }

    #[test]
    fn test_zero_stride_rejected() {
        let mut params = SmeltingQuitParams::new(Vec::new());
        params.sampling_stride = 0;

        let result = CountingQuitEngine::new(&params, CategoryRegistry::vanilla());
        assert!(matches!(result, Err(SignalError::InvalidParameters(_))));
    }

    #[test]
    fn test_params_default_stride() {
        let params = SmeltingQuitParams::from_value(serde_json::json!({
            "item": [{ "type": ["iron_ingot"], "amount": 4, "description": "smelted-iron" }]
        }))
        .unwrap();

        assert_eq!(params.sampling_stride, DEFAULT_SAMPLING_STRIDE);
        assert_eq!(params.item[0].amount, 4);
    }

    #[test]
    fn test_outcome_empty_until_quit() {
        let engine = engine(vec![ItemSpecWithDescription::new(
            MatchSpec::of_types(["iron_ingot"]),
            4,
            "smelted-iron",
        )]);

        assert!(!engine.wants_to_quit());
        assert_eq!(engine.outcome(), "");
        assert!(engine.quit_decision().is_none());
    }
}
