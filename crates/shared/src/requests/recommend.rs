use serde::{Deserialize, Serialize};

use super::default_true;

/// Prompt used when the caller does not ask for anything specific.
pub const DEFAULT_ASK: &str = "Advance one tick.";

fn default_ask() -> String {
    DEFAULT_ASK.to_string()
}

fn default_recent_events() -> usize {
    10
}

fn default_max_new_events() -> usize {
    3
}

/// Advisory tick request for one world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendRequest {
    pub world_id: String,
    #[serde(default)]
    pub include: IncludeOptions,
    #[serde(default = "default_ask")]
    pub ask: String,
    #[serde(default)]
    pub constraints: RecommendConstraints,
    /// Explicit seed. The engine substitutes the default seed when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

impl RecommendRequest {
    pub fn new(world_id: impl Into<String>) -> Self {
        Self {
            world_id: world_id.into(),
            include: IncludeOptions::default(),
            ask: default_ask(),
            constraints: RecommendConstraints::default(),
            seed: None,
        }
    }

    pub fn with_seed(mut self, seed: i64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Snapshot sections to load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeOptions {
    /// How many of the most recent events to load.
    #[serde(default = "default_recent_events")]
    pub recent_events: usize,
    #[serde(default = "default_true")]
    pub party: bool,
    #[serde(default = "default_true")]
    pub arcs: bool,
    #[serde(default = "default_true")]
    pub factions: bool,
}

impl Default for IncludeOptions {
    fn default() -> Self {
        Self {
            recent_events: default_recent_events(),
            party: true,
            arcs: true,
            factions: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendConstraints {
    #[serde(default = "default_max_new_events")]
    pub max_new_events: usize,
    #[serde(default = "default_true")]
    pub allow_updates: bool,
    /// Suppresses every non-deterministic augmentation path.
    #[serde(default = "default_true")]
    pub deterministic_only: bool,
}

impl Default for RecommendConstraints {
    fn default() -> Self {
        Self {
            max_new_events: default_max_new_events(),
            allow_updates: true,
            deterministic_only: true,
        }
    }
}
