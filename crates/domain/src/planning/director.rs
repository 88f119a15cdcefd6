//! Narrative planner: turns a resolved check against an event into a plan.
//!
//! Recipes are keyed by the source event's payload variant. Each recipe has
//! one branch per degree of success and returns a complete plan; deltas are
//! kept small so the world drifts rather than swings.

use crate::entities::{
    ComplicationPayload, DiscoveryPayload, Event, EventDraft, EventPayload, FactionMovePayload,
    FactionNoticePayload, LeadPayload,
};
use crate::game_systems::Degree;
use crate::value_objects::{
    ActionPlan, ArcDelta, EncounterDifficulty, EncounterSuggestion, FactionDelta, PlanUpdates,
    TagMutation, WorldDelta,
};
use crate::{ArcId, FactionId};

/// Tags that never name a location.
pub const LOCATION_STOPLIST: [&str; 3] = ["rumor", "investigation", "skill"];

/// Location used when nothing better can be derived.
pub const DEFAULT_LOCATION: &str = "wilderness";

/// Arc advanced by rumor investigations.
pub const BANDIT_ARC: &str = "arc_bandit_threat";

/// Faction that escalates when investigations go badly.
pub const BANDIT_FACTION: &str = "f_bandits";

/// Plan the consequences of resolving `source` with `degree`.
pub fn plan_from_outcome(source: &Event, degree: Degree) -> ActionPlan {
    match &source.payload {
        EventPayload::Rumor(_) => rumor_outcome(source, degree),
        EventPayload::FactionMove(_) => faction_move_outcome(source, degree),
        EventPayload::SkillResult(_)
        | EventPayload::FactionPressureResult(_)
        | EventPayload::Discovery(_)
        | EventPayload::Lead(_)
        | EventPayload::Complication(_)
        | EventPayload::Report(_)
        | EventPayload::Warning(_)
        | EventPayload::ArcDevelopment(_)
        | EventPayload::Unknown { .. } => fallback_outcome(source, degree),
    }
}

/// Location named by the payload, else the first tag outside the stoplist.
pub fn derive_location(source: &Event) -> String {
    if let Some(location) = source.payload.location() {
        return location.to_string();
    }
    source
        .tags
        .iter()
        .find(|tag| !LOCATION_STOPLIST.contains(&tag.as_str()))
        .cloned()
        .unwrap_or_else(|| DEFAULT_LOCATION.to_string())
}

/// `old_mill` -> `Old Mill`.
pub fn pretty(slug: &str) -> String {
    let mut out = String::with_capacity(slug.len());
    let mut at_word_start = true;
    for c in slug.chars() {
        let c = if c == '_' { ' ' } else { c };
        let is_word = c.is_ascii_alphanumeric();
        if is_word && at_word_start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        at_word_start = !is_word;
    }
    out
}

fn world_tension(delta: f64) -> Option<WorldDelta> {
    Some(WorldDelta::tension(delta))
}

fn fallback_outcome(source: &Event, degree: Degree) -> ActionPlan {
    let nudge = if degree.is_success() { -0.01 } else { 0.01 };
    ActionPlan {
        new_events: Vec::new(),
        updates: PlanUpdates {
            world: world_tension(nudge),
            ..PlanUpdates::default()
        },
        encounter: None,
        mutate: Some(TagMutation::add(source.id.clone(), &["resolved"])),
    }
}

fn rumor_outcome(source: &Event, degree: Degree) -> ActionPlan {
    let loc = derive_location(source);
    let arc = ArcId::from(BANDIT_ARC);

    match degree {
        Degree::CriticalSuccess => ActionPlan {
            new_events: vec![
                EventDraft::new(
                    EventPayload::Discovery(DiscoveryPayload {
                        location: Some(loc.clone()),
                        note: Some("Marked stones reveal a stash.".into()),
                        ..DiscoveryPayload::default()
                    }),
                    format!("Hidden Cache at {}", pretty(&loc)),
                    2,
                )
                .with_tags(["discovery", loc.as_str(), "major"]),
                EventDraft::new(
                    EventPayload::Lead(LeadPayload {
                        location: Some(loc.clone()),
                        clue: Some("Symbols point toward the old ruins.".into()),
                        ..LeadPayload::default()
                    }),
                    "Trail of Symbols",
                    1,
                )
                .with_tags(["lead", "exploration", loc.as_str()]),
            ],
            updates: PlanUpdates {
                world: world_tension(-0.05),
                arcs: vec![ArcDelta {
                    id: arc,
                    progress_delta: 0.15,
                    stage_to: Some("breakthrough".into()),
                }],
                factions: Vec::new(),
            },
            encounter: Some(EncounterSuggestion {
                seed: format!("{}|scouts", loc),
                kind: "ambush".into(),
                difficulty: EncounterDifficulty::Low,
                enemy_level: None,
                flavor: None,
                rule_reference: None,
            }),
            mutate: Some(TagMutation::add(source.id.clone(), &["resolved"])),
        },
        Degree::Success => ActionPlan {
            new_events: vec![EventDraft::new(
                EventPayload::Lead(LeadPayload {
                    location: Some(loc.clone()),
                    clue: Some("Blue lights = decoy bonfires near the shrine.".into()),
                    ..LeadPayload::default()
                }),
                "Local Whispers Clarified",
                1,
            )
            .with_tags(["lead", "investigation", loc.as_str()])],
            updates: PlanUpdates {
                world: world_tension(-0.03),
                arcs: vec![ArcDelta {
                    id: arc,
                    progress_delta: 0.08,
                    stage_to: Some("clues".into()),
                }],
                factions: Vec::new(),
            },
            encounter: None,
            mutate: Some(TagMutation::add(source.id.clone(), &["resolved"])),
        },
        Degree::Failure => ActionPlan {
            new_events: vec![EventDraft::new(
                EventPayload::Complication(ComplicationPayload {
                    location: Some(loc.clone()),
                    cost: Some("time".into()),
                    note: Some("Tracks double back into brambles.".into()),
                    ..ComplicationPayload::default()
                }),
                "False Trail Consumes Time",
                1,
            )
            .with_tags(["complication", loc.as_str()])],
            updates: PlanUpdates {
                world: world_tension(0.03),
                arcs: vec![ArcDelta::new(arc, 0.0)],
                factions: Vec::new(),
            },
            encounter: None,
            // Stale, not resolved: a failed investigation can be retried.
            mutate: Some(TagMutation::add(source.id.clone(), &["stale"])),
        },
        Degree::CriticalFailure => ActionPlan {
            new_events: vec![EventDraft::new(
                EventPayload::FactionMove(FactionMovePayload {
                    faction_id: Some(FactionId::from(BANDIT_FACTION)),
                    location: Some(loc.clone()),
                    note: Some("You were observed while searching.".into()),
                    ..FactionMovePayload::default()
                }),
                "Bandit Scouts Spotted",
                2,
            )
            .with_tags(["faction", "escalation", loc.as_str()])],
            updates: PlanUpdates {
                world: world_tension(0.06),
                arcs: vec![ArcDelta {
                    id: arc,
                    progress_delta: -0.03,
                    stage_to: Some("setbacks".into()),
                }],
                factions: vec![FactionDelta::new(BANDIT_FACTION, 0.04)],
            },
            encounter: None,
            mutate: Some(TagMutation::add(source.id.clone(), &["complication"])),
        },
    }
}

fn faction_move_outcome(source: &Event, degree: Degree) -> ActionPlan {
    let faction = source
        .payload
        .faction_id()
        .unwrap_or_else(|| FactionId::from(BANDIT_FACTION));
    let notice = FactionNoticePayload {
        faction_id: Some(faction.clone()),
        ..FactionNoticePayload::default()
    };

    if degree.is_success() {
        let eased = if degree.is_critical() { -0.06 } else { -0.03 };
        ActionPlan {
            new_events: vec![
                EventDraft::new(EventPayload::Report(notice), "Pressure Eased", 1)
                    .with_tags(["faction"]),
            ],
            updates: PlanUpdates {
                world: world_tension(-0.02),
                arcs: Vec::new(),
                factions: vec![FactionDelta::new(faction, eased)],
            },
            encounter: None,
            mutate: Some(TagMutation::add(source.id.clone(), &["blunted"])),
        }
    } else {
        let raised = if degree.is_critical() { 0.04 } else { 0.02 };
        ActionPlan {
            new_events: vec![
                EventDraft::new(EventPayload::Warning(notice), "Retaliation Brewing", 1)
                    .with_tags(["faction", "escalation"]),
            ],
            updates: PlanUpdates {
                world: world_tension(0.02),
                arcs: Vec::new(),
                factions: vec![FactionDelta::new(faction, raised)],
            },
            encounter: None,
            mutate: Some(TagMutation::add(source.id.clone(), &["escalated"])),
        }
    }
}
