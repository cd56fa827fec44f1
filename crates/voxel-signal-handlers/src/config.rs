//! Mission configuration documents
//!
//! A configuration lists the handler parameter blocks of one mission and
//! how rewards are shaped for the local agent. Documents are read from
//! `.json` or `.toml` files.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use voxel_signal_core::{DistributionShaper, Result, RewardShaper, SignalError};

use crate::nearby_block::NearbyBlockRewardParams;
use crate::smelting_quit::SmeltingQuitParams;

fn default_agent_name() -> String {
    "agent".to_string()
}

fn default_reward_scale() -> f64 {
    1.0
}

/// Handler configuration for one mission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionConfig {
    /// Name of the local agent in reward distribution strings
    #[serde(default = "default_agent_name")]
    pub agent_name: String,
    /// Multiplier applied to every shaped reward
    #[serde(default = "default_reward_scale")]
    pub reward_scale: f64,
    /// Nearby-block reward handlers
    #[serde(default)]
    pub reward_for_nearby_block_type: Vec<NearbyBlockRewardParams>,
    /// Smelting quit handlers
    #[serde(default)]
    pub agent_quit_from_smelting_item: Vec<SmeltingQuitParams>,
}

impl Default for MissionConfig {
    fn default() -> Self {
        Self {
            agent_name: default_agent_name(),
            reward_scale: default_reward_scale(),
            reward_for_nearby_block_type: Vec::new(),
            agent_quit_from_smelting_item: Vec::new(),
        }
    }
}

impl MissionConfig {
    /// Load a configuration, choosing the format by file extension
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            _ => Err(SignalError::Config(format!(
                "unsupported config format: {}",
                path.display()
            ))),
        }
    }

    /// Parse a JSON document
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| SignalError::Config(e.to_string()))
    }

    /// Reward shaper for the configured agent
    #[must_use]
    pub fn shaper(&self) -> Arc<dyn RewardShaper> {
        Arc::new(DistributionShaper::new(
            self.agent_name.clone(),
            self.reward_scale,
        ))
    }
}
