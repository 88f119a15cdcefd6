//! JSON world seeds for the in-memory store.

use std::path::Path;

use serde::{Deserialize, Serialize};
use taleforge_domain::{Entity, Event, Faction, StoryArc, World};
use tokio::fs;

use crate::infrastructure::ports::RepoError;

/// Rows to preload, one array per table. Missing arrays are empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldSeed {
    #[serde(default)]
    pub worlds: Vec<World>,
    #[serde(default)]
    pub arcs: Vec<StoryArc>,
    #[serde(default)]
    pub factions: Vec<Faction>,
    #[serde(default)]
    pub entities: Vec<Entity>,
    /// Stored verbatim: ids, timestamps and thread links are not reassigned.
    #[serde(default)]
    pub events: Vec<Event>,
}

impl WorldSeed {
    pub fn from_json(json: &str) -> Result<Self, RepoError> {
        serde_json::from_str(json).map_err(RepoError::serialization)
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, RepoError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| RepoError::serialization(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }
}
