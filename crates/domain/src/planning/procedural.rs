//! Procedural snapshot planner: advances the world without a triggering event.
//!
//! Every draw comes from the [`PlanRng`] passed in. The draw order below is
//! part of the contract: changing it changes every seeded plan.

use crate::entities::{
    ArcDevelopmentPayload, CheckHook, DiscoveryPayload, EventDraft, EventPayload,
    FactionMovePayload, RollExample, RumorPayload,
};
use crate::game_systems::{degree_of_success, level_dc};
use crate::value_objects::{
    ActionPlan, ArcDelta, EncounterDifficulty, EncounterSuggestion, FactionDelta, PlanUpdates,
    Recommendation, WorldDelta, WorldSnapshot,
};

use super::director::DEFAULT_LOCATION;
use super::rng::{LcgRng, PlanRng};

/// Recent-event count below which a rumor is always generated.
const QUIET_FEED_THRESHOLD: usize = 3;
const FACTION_TENSION_THRESHOLD: f64 = 0.55;
const ENCOUNTER_TENSION_THRESHOLD: f64 = 0.65;
const DISCOVERY_TENSION_THRESHOLD: f64 = 0.4;
const ARC_NUDGE_CHANCE: f64 = 0.3;
const DISCOVERY_CHANCE: f64 = 0.25;
/// Arcs at or past this progress are left alone.
const ARC_NUDGE_CEILING: f64 = 0.9;
/// Arc nudges above this also post a development event.
const ARC_EVENT_THRESHOLD: f64 = 0.05;

const TIME_ADVANCES: [&str; 3] = ["10m", "1h", "8h"];

struct RumorTemplate {
    content: &'static str,
    skill: &'static str,
    conditions: &'static [&'static str],
}

static RUMORS: [RumorTemplate; 4] = [
    RumorTemplate {
        content: "Strange lights flicker in the distance",
        skill: "Perception",
        conditions: &[],
    },
    RumorTemplate {
        content: "Locals speak of missing travelers",
        skill: "Diplomacy",
        conditions: &["frightened"],
    },
    RumorTemplate {
        content: "Ancient symbols appear carved into trees",
        skill: "Occultism",
        conditions: &[],
    },
    RumorTemplate {
        content: "Wildlife avoids certain areas entirely",
        skill: "Survival",
        conditions: &[],
    },
];

struct MoveTemplate {
    action: &'static str,
    skill: &'static str,
    description: &'static str,
}

static FACTION_MOVES: [MoveTemplate; 3] = [
    MoveTemplate {
        action: "increased patrol activity",
        skill: "Stealth",
        description: "Avoid detection by faction scouts",
    },
    MoveTemplate {
        action: "diplomatic negotiations",
        skill: "Diplomacy",
        description: "Influence or gather information from faction envoys",
    },
    MoveTemplate {
        action: "resource gathering",
        skill: "Society",
        description: "Learn about faction supply lines and activities",
    },
];

const DISCOVERIES: [(&str, &str); 3] = [
    ("ancient inscription", "minor"),
    ("hidden cache", "moderate"),
    ("forgotten shrine", "major"),
];

const ENCOUNTER_KINDS: [&str; 4] = ["ambush", "social", "exploration", "combat"];

const ENCOUNTER_FLAVORS: [&str; 3] = [
    "Hostile forces gather in the shadows...",
    "The situation grows more dangerous...",
    "An opportunity for confrontation arises...",
];

const ARC_DEVELOPMENT: &str = "Circumstances shift, bringing new clarity to the situation";

/// Limits the caller places on a generated plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanConstraints {
    pub max_new_events: usize,
}

impl Default for PlanConstraints {
    fn default() -> Self {
        Self { max_new_events: 3 }
    }
}

/// Plan one advisory tick from `snapshot` with the seeded LCG.
pub fn plan_for_seed(
    snapshot: &WorldSnapshot,
    constraints: PlanConstraints,
    seed: i64,
) -> Recommendation {
    let mut rng = LcgRng::new(seed);
    baseline_plan(snapshot, constraints, &mut rng)
}

/// Plan one advisory tick from `snapshot`, drawing from `rng`.
pub fn baseline_plan<R: PlanRng>(
    snapshot: &WorldSnapshot,
    constraints: PlanConstraints,
    rng: &mut R,
) -> Recommendation {
    let tension = snapshot.world.tension;
    let locations = snapshot.locations();
    let party_level = snapshot.party_level();
    let dc = level_dc(party_level);

    let mut updates = PlanUpdates {
        world: Some(WorldDelta {
            tension_delta: Some(((rng.next_f64() - 0.45) * 0.05).clamp(-0.02, 0.04)),
            time_advance: Some(rng.pick(&TIME_ADVANCES).copied().unwrap_or("1h").to_string()),
        }),
        arcs: Vec::new(),
        factions: Vec::new(),
    };
    let mut new_events = Vec::new();
    let mut rule_references = Vec::new();

    let rumor_chance = (0.2 + tension * 0.6).clamp(0.15, 0.8);
    let rumor_fires = rng.next_f64() < rumor_chance;
    if rumor_fires || snapshot.recent_events.len() < QUIET_FEED_THRESHOLD {
        let loc = pick_location(rng, &locations);
        let template = rng.pick(&RUMORS).unwrap_or(&RUMORS[0]);
        let rule_reference = format!(
            "DC {} {} (Level {}, GM Core p.503)",
            dc, template.skill, party_level
        );
        let example_total = dc + 5;

        new_events.push(
            EventDraft::new(
                EventPayload::Rumor(RumorPayload {
                    location: Some(loc.clone()),
                    content: Some(template.content.to_string()),
                    investigation: Some(CheckHook {
                        skill: template.skill.to_string(),
                        dc,
                        description: None,
                        rule_reference: rule_reference.clone(),
                        on_roll_example: Some(RollExample {
                            total: example_total,
                            degree: degree_of_success(example_total, dc),
                        }),
                    }),
                    potential_conditions: template
                        .conditions
                        .iter()
                        .map(|c| c.to_string())
                        .collect(),
                    ..RumorPayload::default()
                }),
                "Local Whispers",
                2,
            )
            .with_tags([
                "rumor".to_string(),
                loc,
                "investigation".to_string(),
                template.skill.to_lowercase(),
            ]),
        );
        rule_references.push(rule_reference);
    }

    if tension > FACTION_TENSION_THRESHOLD {
        if let Some(faction) = rng.pick(&snapshot.factions) {
            let pressure_delta = (rng.next_f64() * 0.06 - 0.01).clamp(-0.02, 0.05);
            updates
                .factions
                .push(FactionDelta::new(faction.id.clone(), pressure_delta));

            let template = rng.pick(&FACTION_MOVES).unwrap_or(&FACTION_MOVES[0]);
            let rule_reference = format!(
                "DC {} {} to {} (Level {}, Core Rulebook)",
                dc,
                template.skill,
                template.description.to_lowercase(),
                party_level
            );

            new_events.push(
                EventDraft::new(
                    EventPayload::FactionMove(FactionMovePayload {
                        faction_id: Some(faction.id.clone()),
                        faction_name: Some(faction.display_name().to_string()),
                        action: Some(template.action.to_string()),
                        challenge: Some(CheckHook {
                            skill: template.skill.to_string(),
                            dc,
                            description: Some(template.description.to_string()),
                            rule_reference: rule_reference.clone(),
                            on_roll_example: None,
                        }),
                        ..FactionMovePayload::default()
                    }),
                    "Faction Activity",
                    2,
                )
                .with_tags([
                    "faction".to_string(),
                    "challenge".to_string(),
                    template.skill.to_lowercase(),
                ]),
            );
            rule_references.push(rule_reference);
        }
    }

    if !snapshot.arcs.is_empty() && rng.next_f64() < ARC_NUDGE_CHANCE {
        if let Some(arc) = rng.pick(&snapshot.arcs) {
            if arc.progress < ARC_NUDGE_CEILING {
                let progress_delta = (rng.next_f64() * 0.15 - 0.05).clamp(-0.02, 0.1);
                updates
                    .arcs
                    .push(ArcDelta::new(arc.id.clone(), progress_delta));

                if progress_delta > ARC_EVENT_THRESHOLD {
                    let stage = arc.stage.map(|s| s.as_str()).unwrap_or("unknown");
                    new_events.push(
                        EventDraft::new(
                            EventPayload::ArcDevelopment(ArcDevelopmentPayload {
                                arc_id: Some(arc.id.clone()),
                                arc_title: Some(arc.display_title().to_string()),
                                development: Some(ARC_DEVELOPMENT.to_string()),
                                ..ArcDevelopmentPayload::default()
                            }),
                            "Story Development",
                            2,
                        )
                        .with_tags(["story", "arc", stage]),
                    );
                }
            }
        }
    }

    if tension < DISCOVERY_TENSION_THRESHOLD && rng.next_f64() < DISCOVERY_CHANCE {
        let loc = pick_location(rng, &locations);
        let (item, significance) = rng.pick(&DISCOVERIES).copied().unwrap_or(DISCOVERIES[0]);
        let priority = match significance {
            "major" => 3,
            "moderate" => 2,
            _ => 1,
        };
        new_events.push(
            EventDraft::new(
                EventPayload::Discovery(DiscoveryPayload {
                    location: Some(loc.clone()),
                    item: Some(item.to_string()),
                    significance: Some(significance.to_string()),
                    ..DiscoveryPayload::default()
                }),
                "Unexpected Find",
                priority,
            )
            .with_tags(["discovery".to_string(), loc, significance.to_string()]),
        );
    }

    let encounter = if tension > ENCOUNTER_TENSION_THRESHOLD {
        let encounter = suggest_encounter(rng, tension, party_level, &locations);
        if let Some(reference) = &encounter.rule_reference {
            rule_references.push(reference.clone());
        }
        Some(encounter)
    } else {
        None
    };

    new_events.truncate(constraints.max_new_events);
    let summary = summarize(&updates, new_events.len(), encounter.as_ref());
    let notes = vec![
        "Generated using PF2e rules from Archives of Nethys SRD".to_string(),
        format!("Party Level: {}, World Tension: {}", party_level, two_places(tension)),
        "All DCs based on official level-based difficulty tables".to_string(),
        format!(
            "Rule references: {}",
            if rule_references.is_empty() {
                "None".to_string()
            } else {
                rule_references.join("; ")
            }
        ),
        "Safe to apply piecemeal - all changes are deltas".to_string(),
    ];

    Recommendation {
        summary,
        plan: ActionPlan {
            new_events,
            updates,
            encounter,
            mutate: None,
        },
        notes,
    }
}

/// Fold an augmentation into a baseline recommendation.
///
/// Events are appended, tension deltas summed, arc and faction deltas
/// appended, the encounter replaced when one is offered, notes appended.
/// The merged event list is truncated to `max_new_events` again.
pub fn merge_augmentation(
    mut base: Recommendation,
    augmentation: Recommendation,
    constraints: PlanConstraints,
) -> Recommendation {
    let extra = augmentation.plan;

    base.plan.new_events.extend(extra.new_events);
    base.plan.new_events.truncate(constraints.max_new_events);

    if let Some(world) = extra.updates.world {
        let merged = base.plan.updates.world.get_or_insert_with(WorldDelta::default);
        if let Some(delta) = world.tension_delta.filter(|d| *d != 0.0) {
            merged.tension_delta = Some(merged.tension_change() + delta);
        }
        if world.time_advance.is_some() {
            merged.time_advance = world.time_advance;
        }
    }
    base.plan.updates.arcs.extend(extra.updates.arcs);
    base.plan.updates.factions.extend(extra.updates.factions);

    if extra.encounter.is_some() {
        base.plan.encounter = extra.encounter;
    }
    base.notes.extend(augmentation.notes);
    base
}

fn pick_location<R: PlanRng>(rng: &mut R, locations: &[String]) -> String {
    rng.pick(locations)
        .cloned()
        .unwrap_or_else(|| DEFAULT_LOCATION.to_string())
}

fn suggest_encounter<R: PlanRng>(
    rng: &mut R,
    tension: f64,
    party_level: i32,
    locations: &[String],
) -> EncounterSuggestion {
    let (difficulty, level_offset) = if tension > 0.8 {
        (EncounterDifficulty::Severe, 2)
    } else if tension > 0.7 {
        (EncounterDifficulty::Moderate, 0)
    } else {
        (EncounterDifficulty::Low, -1)
    };
    let enemy_level = party_level + level_offset;

    let loc = pick_location(rng, locations);
    let kind = rng.pick(&ENCOUNTER_KINDS).copied().unwrap_or("combat");
    let flavor = rng
        .pick(&ENCOUNTER_FLAVORS)
        .copied()
        .unwrap_or("Danger approaches...");

    EncounterSuggestion {
        seed: format!("level:{}|tension:{}|{}", party_level, two_places(tension), loc),
        kind: kind.to_string(),
        difficulty,
        enemy_level: Some(enemy_level),
        flavor: Some(flavor.to_string()),
        rule_reference: Some(format!(
            "Level {} party vs Level {} threat (GM Core p.498-500)",
            party_level, enemy_level
        )),
    }
}

/// Two decimal places with ties rounded away from zero (0.125 is "0.13").
fn two_places(value: f64) -> String {
    format!("{:.2}", (value * 100.0).round() / 100.0)
}

fn summarize(
    updates: &PlanUpdates,
    event_count: usize,
    encounter: Option<&EncounterSuggestion>,
) -> String {
    let mut parts = Vec::new();

    let tension_delta = updates.world.as_ref().map(WorldDelta::tension_change).unwrap_or(0.0);
    if tension_delta != 0.0 {
        let change = if tension_delta > 0.0 { "rises" } else { "falls" };
        parts.push(format!("Tension {} slightly", change));
    }
    if event_count > 0 {
        parts.push(format!("{} event(s) surface", event_count));
    }
    if !updates.factions.is_empty() {
        parts.push("faction movement detected".to_string());
    }
    if let Some(encounter) = encounter {
        parts.push(format!("{} encounter prepared", encounter.kind));
    }

    if parts.is_empty() {
        "World state remains stable.".to_string()
    } else {
        format!("{}.", parts.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        event_types, ArcStage, Entity, EntityKind, Event, Faction, StoryArc, World,
    };
    use crate::planning::rng::ScriptedRng;
    use crate::{ArcId, EntityId, EventId, FactionId, WorldId};
    use chrono::{TimeZone, Utc};

    fn world_id() -> WorldId {
        WorldId::from("w1")
    }

    fn snapshot(tension: f64) -> WorldSnapshot {
        let mut snapshot = WorldSnapshot::new(World::new(world_id()).with_tension(tension));
        snapshot.party.push(
            Entity::new(EntityId::from("pc_mira"), world_id(), "Mira", EntityKind::Pc)
                .with_level(3.0),
        );
        let mut arc = StoryArc::new(ArcId::from("arc_bandit_threat"), world_id(), "Bandit Threat");
        arc.stage = Some(ArcStage::Active);
        arc.progress = 0.4;
        snapshot.arcs.push(arc);
        snapshot.factions.push(
            Faction::new(FactionId::from("f_bandits"), world_id(), "Red Hand Bandits")
                .with_pressure(0.6),
        );
        snapshot
    }

    fn busy_feed(snapshot: &mut WorldSnapshot) {
        for i in 0..5 {
            snapshot.recent_events.push(Event {
                id: EventId::from(format!("ev{}", i)),
                world_id: world_id(),
                payload: EventPayload::unknown("note"),
                title: None,
                priority: 1,
                tags: Vec::new(),
                parent_event_id: None,
                thread_id: None,
                created_at: Utc
                    .with_ymd_and_hms(2026, 3, 1, 12, i, 0)
                    .single()
                    .expect("valid timestamp"),
            });
        }
    }

    fn kinds(rec: &Recommendation) -> Vec<&str> {
        rec.plan.new_events.iter().map(EventDraft::event_type).collect()
    }

    #[test]
    fn same_seed_and_snapshot_is_byte_identical() {
        for tension in [0.1, 0.5, 0.75, 0.95] {
            let snap = snapshot(tension);
            for seed in [0, 42, 7_777, -13, i64::MAX] {
                let a = plan_for_seed(&snap, PlanConstraints::default(), seed);
                let b = plan_for_seed(&snap, PlanConstraints::default(), seed);
                let a = serde_json::to_string(&a).expect("encode");
                let b = serde_json::to_string(&b).expect("encode");
                assert_eq!(a, b, "seed {} tension {}", seed, tension);
            }
        }
    }

    #[test]
    fn quiet_feed_always_gets_a_rumor() {
        // Rumor roll misses, but the feed is empty.
        let mut rng = ScriptedRng::new(&[0.5, 0.0, 0.99, 0.0, 0.0, 0.99]);
        let rec = baseline_plan(&snapshot(0.45), PlanConstraints::default(), &mut rng);

        assert_eq!(kinds(&rec), vec![event_types::RUMOR]);
        let draft = &rec.plan.new_events[0];
        assert_eq!(draft.title.as_deref(), Some("Local Whispers"));
        assert_eq!(draft.priority, 2);
        assert_eq!(draft.tags, vec!["rumor", "wilderness", "investigation", "perception"]);

        let EventPayload::Rumor(payload) = &draft.payload else {
            panic!("expected rumor payload");
        };
        let hook = payload.investigation.as_ref().expect("investigation hook");
        assert_eq!(hook.dc, 18);
        assert_eq!(hook.rule_reference, "DC 18 Perception (Level 3, GM Core p.503)");
        let example = hook.on_roll_example.as_ref().expect("example roll");
        assert_eq!(example.total, 23);
    }

    #[test]
    fn busy_feed_without_rumor_roll_stays_quiet() {
        let mut snap = snapshot(0.45);
        busy_feed(&mut snap);
        // tension, time pick, rumor roll (miss), arc roll (miss), discovery skipped
        let mut rng = ScriptedRng::new(&[0.45, 0.0, 0.99, 0.99]);
        let rec = baseline_plan(&snap, PlanConstraints::default(), &mut rng);

        assert!(rec.plan.new_events.is_empty());
        assert!(rec.plan.updates.arcs.is_empty());
        assert_eq!(rec.summary, "World state remains stable.");
        assert_eq!(rng.consumed(), 4);
    }

    #[test]
    fn tension_delta_is_clamped() {
        let mut snap = snapshot(0.45);
        busy_feed(&mut snap);

        let mut rng = ScriptedRng::new(&[0.0, 0.0, 0.99]);
        let rec = baseline_plan(&snap, PlanConstraints::default(), &mut rng);
        let delta = rec.plan.updates.world.as_ref().and_then(|w| w.tension_delta);
        assert_eq!(delta, Some(-0.02));

        for seed in 0..500 {
            let rec = plan_for_seed(&snap, PlanConstraints::default(), seed);
            let delta = rec
                .plan
                .updates
                .world
                .as_ref()
                .map(WorldDelta::tension_change)
                .unwrap_or(0.0);
            assert!((-0.02..=0.04).contains(&delta), "seed {} gave {}", seed, delta);
        }
    }

    #[test]
    fn faction_move_requires_tension_above_threshold() {
        let mut snap = snapshot(0.6);
        busy_feed(&mut snap);
        // tension, time, rumor miss, faction pick, pressure, move pick, arc miss
        let mut rng = ScriptedRng::new(&[0.5, 0.0, 0.99, 0.0, 0.5, 0.4, 0.99]);
        let rec = baseline_plan(&snap, PlanConstraints::default(), &mut rng);

        assert_eq!(kinds(&rec), vec![event_types::FACTION_MOVE]);
        assert_eq!(rec.plan.updates.factions.len(), 1);
        assert_eq!(rec.plan.updates.factions[0].id, FactionId::from("f_bandits"));
        assert!((rec.plan.updates.factions[0].pressure_delta - 0.02).abs() < 1e-12);

        let EventPayload::FactionMove(payload) = &rec.plan.new_events[0].payload else {
            panic!("expected faction move payload");
        };
        assert_eq!(payload.faction_name.as_deref(), Some("Red Hand Bandits"));
        assert_eq!(payload.action.as_deref(), Some("diplomatic negotiations"));
        let challenge = payload.challenge.as_ref().expect("challenge");
        assert_eq!(
            challenge.rule_reference,
            "DC 18 Diplomacy to influence or gather information from faction envoys (Level 3, Core Rulebook)"
        );
        assert!(rec.summary.contains("faction movement detected"));

        let mut calm = snapshot(0.5);
        busy_feed(&mut calm);
        for seed in 0..200 {
            let rec = plan_for_seed(&calm, PlanConstraints::default(), seed);
            assert!(rec.plan.updates.factions.is_empty());
        }
    }

    #[test]
    fn small_arc_nudge_has_no_event_large_one_does() {
        let mut snap = snapshot(0.45);
        busy_feed(&mut snap);

        // progress delta = 0.2 * 0.15 - 0.05 = -0.02
        let mut rng = ScriptedRng::new(&[0.5, 0.0, 0.99, 0.1, 0.0, 0.2]);
        let rec = baseline_plan(&snap, PlanConstraints::default(), &mut rng);
        assert_eq!(rec.plan.updates.arcs.len(), 1);
        assert!(rec.plan.new_events.is_empty());

        // progress delta = 0.9 * 0.15 - 0.05 = 0.085
        let mut rng = ScriptedRng::new(&[0.5, 0.0, 0.99, 0.1, 0.0, 0.9]);
        let rec = baseline_plan(&snap, PlanConstraints::default(), &mut rng);
        assert_eq!(kinds(&rec), vec![event_types::ARC_DEVELOPMENT]);
        assert_eq!(rec.plan.new_events[0].tags, vec!["story", "arc", "active"]);
    }

    #[test]
    fn nearly_complete_arcs_are_left_alone() {
        let mut snap = snapshot(0.45);
        busy_feed(&mut snap);
        snap.arcs[0].progress = 0.95;

        let mut rng = ScriptedRng::new(&[0.5, 0.0, 0.99, 0.1, 0.0, 0.9]);
        let rec = baseline_plan(&snap, PlanConstraints::default(), &mut rng);
        assert!(rec.plan.updates.arcs.is_empty());
    }

    #[test]
    fn low_tension_can_surface_a_discovery() {
        let mut snap = snapshot(0.2);
        busy_feed(&mut snap);
        snap.arcs.clear();
        snap.world.locations = Some(vec!["old_mill".into()]);

        // tension, time, rumor miss, discovery roll, location, template (major)
        let mut rng = ScriptedRng::new(&[0.5, 0.0, 0.99, 0.1, 0.0, 0.9]);
        let rec = baseline_plan(&snap, PlanConstraints::default(), &mut rng);

        assert_eq!(kinds(&rec), vec![event_types::DISCOVERY]);
        let draft = &rec.plan.new_events[0];
        assert_eq!(draft.priority, 3);
        assert_eq!(draft.tags, vec!["discovery", "old_mill", "major"]);
    }

    #[test]
    fn encounter_bands_follow_tension() {
        let cases = [
            (0.66, EncounterDifficulty::Low, 2),
            (0.75, EncounterDifficulty::Moderate, 3),
            (0.85, EncounterDifficulty::Severe, 5),
        ];
        for (tension, difficulty, enemy_level) in cases {
            let mut snap = snapshot(tension);
            busy_feed(&mut snap);
            snap.arcs.clear();
            snap.factions.clear();
            let rec = plan_for_seed(&snap, PlanConstraints::default(), 42);
            let encounter = rec.plan.encounter.as_ref().expect("encounter above 0.65");
            assert_eq!(encounter.difficulty, difficulty);
            assert_eq!(encounter.enemy_level, Some(enemy_level));
            assert!(encounter.seed.starts_with(&format!("level:3|tension:{:.2}|", tension)));
            assert!(rec.notes[3].contains("GM Core p.498-500"));
        }

        let rec = plan_for_seed(&snapshot(0.6), PlanConstraints::default(), 42);
        assert!(rec.plan.encounter.is_none());
    }

    #[test]
    fn events_are_truncated_to_max() {
        let snap = snapshot(0.9);
        let constraints = PlanConstraints { max_new_events: 1 };
        for seed in 0..50 {
            let rec = plan_for_seed(&snap, constraints, seed);
            assert!(rec.plan.new_events.len() <= 1);
        }
        let none = plan_for_seed(&snap, PlanConstraints { max_new_events: 0 }, 42);
        assert!(none.plan.new_events.is_empty());
    }

    #[test]
    fn notes_carry_level_and_tension() {
        let rec = plan_for_seed(&snapshot(0.5), PlanConstraints::default(), 42);
        assert_eq!(rec.notes.len(), 5);
        assert_eq!(rec.notes[1], "Party Level: 3, World Tension: 0.50");
        assert!(rec.notes[3].starts_with("Rule references: DC 18"));
    }

    #[test]
    fn tension_ties_round_up_in_notes() {
        assert_eq!(two_places(0.125), "0.13");
        assert_eq!(two_places(0.375), "0.38");
        assert_eq!(two_places(0.0), "0.00");

        let rec = plan_for_seed(&snapshot(0.125), PlanConstraints::default(), 42);
        assert_eq!(rec.notes[0], "Generated using PF2e rules from Archives of Nethys SRD");
        assert_eq!(rec.notes[1], "Party Level: 3, World Tension: 0.13");
    }

    #[test]
    fn empty_location_list_falls_back_to_wilderness() {
        let mut snap = snapshot(0.45);
        snap.world.locations = Some(Vec::new());
        let rec = plan_for_seed(&snap, PlanConstraints::default(), 42);
        let rumor = rec
            .plan
            .new_events
            .iter()
            .find(|e| e.event_type() == event_types::RUMOR)
            .expect("quiet feed rumor");
        assert_eq!(rumor.payload.location(), Some("wilderness"));
    }

    #[test]
    fn augmentation_merge_rules() {
        let base = plan_for_seed(&snapshot(0.7), PlanConstraints::default(), 42);
        let base_tension = base.plan.updates.world.as_ref().map(WorldDelta::tension_change);
        let base_events = base.plan.new_events.len();

        let augmentation = Recommendation {
            summary: String::new(),
            plan: ActionPlan {
                new_events: vec![EventDraft::new(EventPayload::unknown("omen"), "Omen", 1)],
                updates: PlanUpdates {
                    world: Some(WorldDelta::tension(0.01)),
                    arcs: vec![ArcDelta::new("arc_other", 0.02)],
                    factions: Vec::new(),
                },
                encounter: None,
                mutate: None,
            },
            notes: vec!["augmented".into()],
        };

        let merged = merge_augmentation(
            base.clone(),
            augmentation,
            PlanConstraints { max_new_events: 10 },
        );
        assert_eq!(merged.plan.new_events.len(), base_events + 1);
        let merged_tension = merged.plan.updates.world.as_ref().map(WorldDelta::tension_change);
        let expected = base_tension.unwrap_or(0.0) + 0.01;
        assert!((merged_tension.unwrap_or(0.0) - expected).abs() < 1e-12);
        assert_eq!(merged.plan.updates.arcs.last().map(|a| a.progress_delta), Some(0.02));
        assert_eq!(merged.plan.encounter, base.plan.encounter);
        assert_eq!(merged.notes.last().map(String::as_str), Some("augmented"));
    }
}
