//! Core matching types and traits for voxel-world reward and quit signals
//!
//! This crate provides the building blocks shared by every mission
//! handler: the category catalog, block and item observations, the
//! read-only world query, specification matchers, reward accumulation and
//! shaping, and the event bus handlers subscribe to.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod category;
pub mod error;
pub mod event;
pub mod handler;
pub mod matcher;
pub mod observation;
pub mod reward;
pub mod world;

// Re-export core traits and types
pub use category::{CategoryId, CategoryRegistry, Colour, VariantId};
pub use error::{Result, SignalError};
pub use event::{EventBus, EventKind, MissionEvent, Subscription};
pub use handler::{MissionHandler, QuitProducer, RewardProducer};
pub use matcher::{MatchSpec, SpecMatcher};
pub use observation::{BlockObservation, CountKey, ItemStack, Matchable};
pub use reward::{
    DistributionShaper, IdentityShaper, MultidimensionalReward, RewardDistribution, RewardShaper,
};
pub use world::{CellPos, Position, VoxelWorld, WorldQuery};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        BlockObservation, CategoryRegistry, EventBus, ItemStack, MatchSpec, MissionEvent,
        MissionHandler, MultidimensionalReward, QuitProducer, Result, RewardProducer,
        SpecMatcher, WorldQuery,
    };
}
