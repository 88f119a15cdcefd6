//! Response bodies returned by the engine's HTTP surface.

use serde::{Deserialize, Serialize};
use taleforge_domain::{
    CheckRoll, EncounterSuggestion, EventDraft, PlanUpdates, Recommendation,
};

/// Advisory plan for one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendResponse {
    pub summary: String,
    pub new_events: Vec<EventDraft>,
    /// Absent when the caller disallowed updates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updates: Option<PlanUpdates>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encounter: Option<EncounterSuggestion>,
    pub notes: Vec<String>,
}

impl RecommendResponse {
    pub fn from_recommendation(recommendation: Recommendation, allow_updates: bool) -> Self {
        Self {
            summary: recommendation.summary,
            new_events: recommendation.plan.new_events,
            updates: allow_updates.then_some(recommendation.plan.updates),
            encounter: recommendation.plan.encounter,
            notes: recommendation.notes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaPath {
    /// Applied by the store's atomic procedure.
    Procedure,
    /// Applied by read-modify-write.
    Fallback,
}

/// Which path each delta section took. Absent sections had nothing to apply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedDeltas {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub world: Option<DeltaPath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arcs: Option<DeltaPath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub factions: Option<DeltaPath>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyPlanResponse {
    pub posted_event_ids: Vec<String>,
    pub applied: AppliedDeltas,
}

/// Outcome of an interactive investigate or pressure action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionResponse {
    #[serde(flatten)]
    pub roll: CheckRoll,
    pub thread_id: String,
    pub result_event_id: String,
    pub posted_event_ids: Vec<String>,
    pub applied: AppliedDeltas,
    /// Tags on the source event after the merge.
    pub source_tags: Vec<String>,
    /// Set when tagging the source failed. The rest of the action stands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickResponse {
    pub world_id: String,
    pub hours: u32,
    pub time: String,
    pub tension: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rumor_event_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
