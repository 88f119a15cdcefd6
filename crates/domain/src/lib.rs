//! Taleforge domain: the narrative event model and its pure rules.
//!
//! Nothing in this crate performs I/O, reads the clock or draws ambient
//! randomness. Store access lives in `taleforge-engine`.

pub mod entities;
pub mod error;
pub mod game_systems;
pub mod ids;
pub mod planning;
pub mod value_objects;

pub use entities::{
    dedupe_tags, derive_thread_from_parent, ensure_thread_for, event_types, merge_tags,
    ArcDevelopmentPayload, ArcStage, CheckHook, CheckResultPayload, ComplicationPayload,
    DiscoveryPayload, Entity, EntityKind, EntityStatus, Event, EventDraft, EventPayload, Faction,
    FactionMovePayload, FactionNoticePayload, LeadPayload, NewEvent, PayloadMap, RollExample,
    RumorPayload, SrdBlock, StoryArc, World, DEFAULT_PRIORITY,
};
pub use error::DomainError;
pub use game_systems::{degree_of_success, level_dc, Degree, MAX_TABLE_LEVEL};
pub use ids::{ArcId, EntityId, EventId, FactionId, WorldId};
pub use planning::{
    baseline_plan, derive_location, merge_augmentation, plan_for_seed, plan_from_outcome,
    pretty, LcgRng, PlanConstraints, PlanRng, DEFAULT_SEED,
};
pub use value_objects::{
    clamp_unit, ActionPlan, ArcDelta, CheckRoll, EncounterDifficulty, EncounterSuggestion,
    FactionDelta, PlanUpdates, Recommendation, TagMutation, WorldDelta, WorldSnapshot, D20_FACES,
    DEFAULT_LOCATIONS,
};
