//! Read-only world snapshot handed to the procedural planner.

use serde::{Deserialize, Serialize};

use crate::entities::{Entity, Event, Faction, StoryArc, World};

/// Locations used when the world has none recorded.
pub const DEFAULT_LOCATIONS: [&str; 3] = ["wilderness", "settlement", "crossroads"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub world: World,
    #[serde(default)]
    pub recent_events: Vec<Event>,
    #[serde(default)]
    pub party: Vec<Entity>,
    #[serde(default)]
    pub arcs: Vec<StoryArc>,
    #[serde(default)]
    pub factions: Vec<Faction>,
}

impl WorldSnapshot {
    pub fn new(world: World) -> Self {
        Self {
            world,
            recent_events: Vec::new(),
            party: Vec::new(),
            arcs: Vec::new(),
            factions: Vec::new(),
        }
    }

    /// Level of the first party member, never below 1.
    pub fn party_level(&self) -> i32 {
        self.party.first().map(Entity::level).unwrap_or(1).max(1)
    }

    pub fn locations(&self) -> Vec<String> {
        match &self.world.locations {
            Some(locations) => locations.clone(),
            None => DEFAULT_LOCATIONS.iter().map(|l| l.to_string()).collect(),
        }
    }
}
