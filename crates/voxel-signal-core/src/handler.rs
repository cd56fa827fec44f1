//! Mission handler traits

use crate::{EventBus, MultidimensionalReward, Result, WorldQuery};

/// Lifecycle shared by every mission handler
pub trait MissionHandler {
    /// Handler name used in logs
    fn name(&self) -> &'static str;

    /// Reset per-episode state and subscribe to the events the handler
    /// needs. Calling it again replaces the previous subscription.
    fn prepare(&mut self, bus: &EventBus) -> Result<()>;

    /// Process every event delivered since the last call
    fn pump(&mut self, world: &dyn WorldQuery);

    /// Release the subscription. Safe to call more than once.
    fn cleanup(&mut self);
}

/// Handler that contributes to the per-step reward
pub trait RewardProducer: MissionHandler {
    /// Move any reward earned since the last call into `reward`
    fn get_reward(&mut self, world: &dyn WorldQuery, reward: &mut MultidimensionalReward);
}

/// Handler that can end the episode
pub trait QuitProducer: MissionHandler {
    /// Whether the episode should end
    fn wants_to_quit(&self) -> bool;

    /// Outcome code describing why; empty until quit is requested
    fn outcome(&self) -> &str;
}
