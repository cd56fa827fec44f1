//! Group of handlers driven through one mission

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;
use voxel_signal_core::{
    CategoryRegistry, EventBus, MultidimensionalReward, QuitProducer, Result, RewardProducer,
    RewardShaper, WorldQuery,
};

use crate::config::MissionConfig;
use crate::nearby_block::{NearbyBlockRewardParams, ProximityRewardEngine};
use crate::smelting_quit::{CountingQuitEngine, SmeltingQuitParams};

/// What one tick produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    /// Reward earned since the previous tick
    pub reward: MultidimensionalReward,
    /// Outcome code, if a handler wants the episode to end
    pub quit: Option<String>,
}

/// Reward and quit handlers of a mission
///
/// Dropping the group stops it, so subscriptions are released even when
/// the mission unwinds early.
pub struct MissionHandlers {
    id: Uuid,
    reward_handlers: Vec<Box<dyn RewardProducer>>,
    quit_handlers: Vec<Box<dyn QuitProducer>>,
    running: bool,
}

impl Default for MissionHandlers {
    fn default() -> Self {
        Self::new()
    }
}

impl MissionHandlers {
    /// Create an empty group
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            reward_handlers: Vec::new(),
            quit_handlers: Vec::new(),
            running: false,
        }
    }

    /// Build every handler a configuration lists
    pub fn from_config(config: &MissionConfig, registry: &CategoryRegistry) -> Result<Self> {
        let shaper = config.shaper();
        let mut handlers = Self::new();
        for params in &config.reward_for_nearby_block_type {
            handlers.add_nearby_block_reward(params, registry, Arc::clone(&shaper))?;
        }
        for params in &config.agent_quit_from_smelting_item {
            handlers.add_smelting_quit(params, registry)?;
        }
        Ok(handlers)
    }

    /// Mission id
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Whether `start` succeeded and `stop` has not run since
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Register a reward handler
    pub fn add_reward_handler(&mut self, handler: Box<dyn RewardProducer>) {
        self.reward_handlers.push(handler);
    }

    /// Register a quit handler
    pub fn add_quit_handler(&mut self, handler: Box<dyn QuitProducer>) {
        self.quit_handlers.push(handler);
    }

    /// Build and register a nearby-block reward handler
    pub fn add_nearby_block_reward(
        &mut self,
        params: &NearbyBlockRewardParams,
        registry: &CategoryRegistry,
        shaper: Arc<dyn RewardShaper>,
    ) -> Result<()> {
        let engine = ProximityRewardEngine::new(params, registry, shaper)?;
        self.add_reward_handler(Box::new(engine));
        Ok(())
    }

    /// Build and register a smelting quit handler
    pub fn add_smelting_quit(
        &mut self,
        params: &SmeltingQuitParams,
        registry: &CategoryRegistry,
    ) -> Result<()> {
        let engine = CountingQuitEngine::new(params, registry)?;
        self.add_quit_handler(Box::new(engine));
        Ok(())
    }

    /// Prepare every handler against `bus`.
    ///
    /// If any handler fails, the ones already prepared are cleaned up
    /// before the error is returned.
    pub fn start(&mut self, bus: &EventBus) -> Result<()> {
        if self.running {
            self.stop();
        }

        let prepared = self
            .reward_handlers
            .iter_mut()
            .map(|h| h.prepare(bus))
            .chain(self.quit_handlers.iter_mut().map(|h| h.prepare(bus)))
            .collect::<Result<Vec<()>>>();
        if let Err(e) = prepared {
            warn!(mission = %self.id, error = %e, "mission handlers failed to start");
            self.cleanup_all();
            return Err(e);
        }

        self.running = true;
        info!(
            mission = %self.id,
            reward_handlers = self.reward_handlers.len(),
            quit_handlers = self.quit_handlers.len(),
            "mission handlers started"
        );
        Ok(())
    }

    /// Process pending events, collect reward and check for quit
    pub fn tick(&mut self, world: &dyn WorldQuery) -> TickOutcome {
        for handler in &mut self.reward_handlers {
            handler.pump(world);
        }
        for handler in &mut self.quit_handlers {
            handler.pump(world);
        }

        let mut reward = MultidimensionalReward::new();
        for handler in &mut self.reward_handlers {
            handler.get_reward(world, &mut reward);
        }

        let quit = self
            .quit_handlers
            .iter()
            .find(|h| h.wants_to_quit())
            .map(|h| h.outcome().to_string());

        TickOutcome { reward, quit }
    }

    /// Clean up every handler
    pub fn stop(&mut self) {
        self.cleanup_all();
        if std::mem::take(&mut self.running) {
            info!(mission = %self.id, "mission handlers stopped");
        }
    }

    fn cleanup_all(&mut self) {
        for handler in &mut self.reward_handlers {
            handler.cleanup();
        }
        for handler in &mut self.quit_handlers {
            handler.cleanup();
        }
    }
}

impl Drop for MissionHandlers {
    fn drop(&mut self) {
        self.stop();
    }
}
