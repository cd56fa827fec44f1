//! Mission handlers producing reward and quit signals for voxel worlds
//!
//! This crate provides:
//! - A nearby-block reward handler with per-matcher cooldowns and
//!   distance-weighted aggregation
//! - A smelting quit handler that counts converted items against thresholds
//! - Configuration documents and a lifecycle group that drives handlers
//!   through a mission

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod mission;
pub mod nearby_block;
pub mod smelting_quit;

pub use config::MissionConfig;
pub use mission::{MissionHandlers, TickOutcome};
pub use nearby_block::{
    distance_factor, AcrossMatchers, BlockSpecWithReward, NearbyBlockRewardParams,
    ProximityRewardEngine, WithinMatcher, DEFAULT_RADIUS,
};
pub use smelting_quit::{
    CountingQuitEngine, ItemSpecWithDescription, QuitDecision, SmeltingQuitParams,
    DEFAULT_SAMPLING_STRIDE,
};

// Re-export core types
pub use voxel_signal_core::{
    BlockObservation, CategoryRegistry, CellPos, Colour, EventBus, ItemStack, MatchSpec,
    MissionEvent, MissionHandler, MultidimensionalReward, Position, QuitProducer,
    RewardDistribution, RewardProducer, RewardShaper, SignalError, VoxelWorld, WorldQuery,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        BlockSpecWithReward, CountingQuitEngine, ItemSpecWithDescription, MissionConfig,
        MissionHandlers, NearbyBlockRewardParams, ProximityRewardEngine, SmeltingQuitParams,
    };
    pub use voxel_signal_core::prelude::*;
}
