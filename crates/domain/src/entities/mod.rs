//! Domain entities - Core business objects with identity

mod event;
mod payload;
mod world;

pub use event::{
    dedupe_tags, derive_thread_from_parent, ensure_thread_for, merge_tags, Event, EventDraft,
    NewEvent, DEFAULT_PRIORITY,
};
pub use payload::{
    event_types, ArcDevelopmentPayload, CheckHook, CheckResultPayload, ComplicationPayload,
    DiscoveryPayload, EventPayload, FactionMovePayload, FactionNoticePayload, LeadPayload,
    PayloadMap, RollExample, RumorPayload,
};
pub use world::{
    ArcStage, Entity, EntityKind, EntityStatus, Faction, SrdBlock, StoryArc, World,
};
