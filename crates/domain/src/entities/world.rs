//! World state: the world row, story arcs, factions and party entities.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value_objects::clamp_unit;
use crate::{ArcId, EntityId, FactionId, WorldId};

fn half() -> f64 {
    0.5
}

/// A campaign world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    pub id: WorldId,
    #[serde(default)]
    pub name: Option<String>,
    /// Global tension in `[0, 1]`.
    #[serde(default = "half")]
    pub tension: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
    /// Known location slugs. `None` lets generators use their defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history_log: Vec<String>,
}

impl World {
    pub fn new(id: WorldId) -> Self {
        Self {
            id,
            name: None,
            tension: half(),
            time: None,
            weather: None,
            locations: None,
            history_log: Vec::new(),
        }
    }

    pub fn with_tension(mut self, tension: f64) -> Self {
        self.tension = clamp_unit(tension);
        self
    }
}

/// Dramatic stage of a story arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArcStage {
    Setup,
    Active,
    Climax,
    Resolution,
    Completed,
}

impl ArcStage {
    pub fn as_str(self) -> &'static str {
        match self {
            ArcStage::Setup => "setup",
            ArcStage::Active => "active",
            ArcStage::Climax => "climax",
            ArcStage::Resolution => "resolution",
            ArcStage::Completed => "completed",
        }
    }
}

/// A storyline with progress in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryArc {
    pub id: ArcId,
    pub world_id: WorldId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub stage: Option<ArcStage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<String>,
    #[serde(default)]
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub triggers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub beats: Vec<String>,
}

impl StoryArc {
    pub fn new(id: ArcId, world_id: WorldId, title: impl Into<String>) -> Self {
        Self {
            id,
            world_id,
            title: Some(title.into()),
            stage: Some(ArcStage::Setup),
            goal: None,
            progress: 0.0,
            triggers: Vec::new(),
            beats: Vec::new(),
        }
    }

    /// Title for display, falling back to the id.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(self.id.as_str())
    }
}

/// An organisation whose pressure in `[0, 1]` drives world politics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Faction {
    pub id: FactionId,
    pub world_id: WorldId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "half")]
    pub pressure: f64,
    #[serde(default = "half")]
    pub stability: f64,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub resources: serde_json::Value,
    /// Standing towards other factions.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub relations: BTreeMap<FactionId, i32>,
}

impl Faction {
    pub fn new(id: FactionId, world_id: WorldId, name: impl Into<String>) -> Self {
        Self {
            id,
            world_id,
            name: Some(name.into()),
            pressure: half(),
            stability: half(),
            resources: serde_json::Value::Null,
            relations: BTreeMap::new(),
        }
    }

    pub fn with_pressure(mut self, pressure: f64) -> Self {
        self.pressure = clamp_unit(pressure);
        self
    }

    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => self.id.as_str(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Pc,
    #[default]
    Npc,
}

/// Rules block of an entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SrdBlock {
    #[serde(default)]
    pub level: Option<f64>,
    #[serde(default)]
    pub skills: BTreeMap<String, i32>,
    #[serde(default)]
    pub mods: BTreeMap<String, i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityStatus {
    #[serde(default)]
    pub level: Option<f64>,
}

/// A character the engine can roll for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub world_id: WorldId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub kind: EntityKind,
    #[serde(default)]
    pub srd: SrdBlock,
    #[serde(default)]
    pub status: EntityStatus,
}

impl Entity {
    pub fn new(id: EntityId, world_id: WorldId, name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            id,
            world_id,
            name: Some(name.into()),
            kind,
            srd: SrdBlock::default(),
            status: EntityStatus::default(),
        }
    }

    pub fn with_level(mut self, level: f64) -> Self {
        self.srd.level = Some(level);
        self
    }

    pub fn with_skill(mut self, skill: impl Into<String>, bonus: i32) -> Self {
        self.srd.skills.insert(skill.into(), bonus);
        self
    }

    pub fn with_mod(mut self, ability: impl Into<String>, bonus: i32) -> Self {
        self.srd.mods.insert(ability.into(), bonus);
        self
    }

    pub fn is_pc(&self) -> bool {
        self.kind == EntityKind::Pc
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(self.id.as_str())
    }

    /// Level from the rules block, then status, defaulting to 1.
    pub fn level(&self) -> i32 {
        let raw = self.srd.level.or(self.status.level).unwrap_or(1.0);
        if raw.is_finite() {
            raw.floor() as i32
        } else {
            1
        }
    }

    /// Modifier used for investigation checks.
    ///
    /// Investigation skill, then perception, then the wisdom modifier, else 0.
    pub fn investigation_modifier(&self) -> i32 {
        self.srd
            .skills
            .get("investigation")
            .or_else(|| self.srd.skills.get("perception"))
            .or_else(|| self.srd.mods.get("wis"))
            .copied()
            .unwrap_or(0)
    }
}
