//! Value objects - Immutable objects defined by their attributes

mod check;
mod plan;
mod snapshot;

pub use check::{CheckRoll, D20_FACES};
pub use plan::{
    clamp_unit, ActionPlan, ArcDelta, EncounterDifficulty, EncounterSuggestion, FactionDelta,
    PlanUpdates, Recommendation, TagMutation, WorldDelta,
};
pub use snapshot::{WorldSnapshot, DEFAULT_LOCATIONS};
