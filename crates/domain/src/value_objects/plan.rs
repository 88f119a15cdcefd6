//! Action plans: the unit of change a planner hands to the engine.
//!
//! Every state change in a plan is a delta, so plans can be applied
//! piecemeal and re-applied on top of concurrent edits.

use serde::{Deserialize, Serialize};

use crate::entities::EventDraft;
use crate::{ArcId, DomainError, EventId, FactionId};

/// Clamp a value into `[0, 1]`. NaN collapses to 0.
pub fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tension_delta: Option<f64>,
    /// Free-form in-world time advance, e.g. "1 hour".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_advance: Option<String>,
}

impl WorldDelta {
    pub fn tension(delta: f64) -> Self {
        Self {
            tension_delta: Some(delta),
            time_advance: None,
        }
    }

    /// Tension change, treating an absent delta as zero.
    pub fn tension_change(&self) -> f64 {
        self.tension_delta.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcDelta {
    pub id: ArcId,
    pub progress_delta: f64,
    /// Advisory stage hint. Not applied automatically.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage_to: Option<String>,
}

impl ArcDelta {
    pub fn new(id: impl Into<ArcId>, progress_delta: f64) -> Self {
        Self {
            id: id.into(),
            progress_delta,
            stage_to: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactionDelta {
    pub id: FactionId,
    pub pressure_delta: f64,
}

impl FactionDelta {
    pub fn new(id: impl Into<FactionId>, pressure_delta: f64) -> Self {
        Self {
            id: id.into(),
            pressure_delta,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanUpdates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world: Option<WorldDelta>,
    #[serde(default)]
    pub arcs: Vec<ArcDelta>,
    #[serde(default)]
    pub factions: Vec<FactionDelta>,
}

impl PlanUpdates {
    pub fn is_empty(&self) -> bool {
        self.world
            .as_ref()
            .map(|w| w.tension_delta.is_none() && w.time_advance.is_none())
            .unwrap_or(true)
            && self.arcs.is_empty()
            && self.factions.is_empty()
    }

    /// Reject non-finite deltas before anything is written.
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(delta) = self.world.as_ref().and_then(|w| w.tension_delta) {
            if !delta.is_finite() {
                return Err(DomainError::validation("world tension_delta must be finite"));
            }
        }
        for arc in &self.arcs {
            if !arc.progress_delta.is_finite() {
                return Err(DomainError::validation(format!(
                    "progress_delta for arc {} must be finite",
                    arc.id
                )));
            }
        }
        for faction in &self.factions {
            if !faction.pressure_delta.is_finite() {
                return Err(DomainError::validation(format!(
                    "pressure_delta for faction {} must be finite",
                    faction.id
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncounterDifficulty {
    Low,
    Moderate,
    Severe,
}

/// A suggested encounter, described but not generated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterSuggestion {
    pub seed: String,
    pub kind: String,
    pub difficulty: EncounterDifficulty,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enemy_level: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_reference: Option<String>,
}

/// Tags to merge onto the event that triggered a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagMutation {
    pub source_event_id: EventId,
    #[serde(default)]
    pub add_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub remove_tags: Vec<String>,
}

impl TagMutation {
    pub fn add(source_event_id: EventId, tags: &[&str]) -> Self {
        Self {
            source_event_id,
            add_tags: tags.iter().map(|t| t.to_string()).collect(),
            remove_tags: Vec::new(),
        }
    }
}

/// Proposed set of new events, deltas, an optional encounter and tag edits.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionPlan {
    #[serde(default)]
    pub new_events: Vec<EventDraft>,
    #[serde(default)]
    pub updates: PlanUpdates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encounter: Option<EncounterSuggestion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutate: Option<TagMutation>,
}

impl ActionPlan {
    pub fn validate(&self) -> Result<(), DomainError> {
        self.updates.validate()
    }

    pub fn is_noop(&self) -> bool {
        self.new_events.is_empty()
            && self.updates.is_empty()
            && self.encounter.is_none()
            && self.mutate.is_none()
    }
}

/// Plan plus GM-facing commentary, as produced by the advisor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub summary: String,
    #[serde(flatten)]
    pub plan: ActionPlan,
    #[serde(default)]
    pub notes: Vec<String>,
}
