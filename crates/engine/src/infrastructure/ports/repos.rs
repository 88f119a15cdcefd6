//! Store ports: events, world state and the atomic delta procedures.

use async_trait::async_trait;
use taleforge_domain::{
    ArcDelta, ArcId, Entity, EntityId, Event, EventId, Faction, FactionDelta, FactionId,
    NewEvent, Recommendation, StoryArc, World, WorldId, WorldSnapshot,
};

use super::error::{AugmentError, RepoError};
use super::types::{
    ArcPatch, ChangeScope, ChangeSubscription, EventFilter, EventPatch, FactionPatch, WorldPatch,
};

// =============================================================================
// Event Store
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepo: Send + Sync {
    /// Insert a new event. The store assigns `id` and `created_at`.
    async fn insert(&self, event: NewEvent) -> Result<Event, RepoError>;

    async fn get(&self, id: &EventId) -> Result<Option<Event>, RepoError>;

    /// Apply a patch. Fails with `NotFound` for unknown ids and with
    /// `ConstraintViolation` when the patch would change an assigned thread.
    async fn update(&self, id: &EventId, patch: EventPatch) -> Result<Event, RepoError>;

    async fn query(&self, world_id: &WorldId, filter: EventFilter)
        -> Result<Vec<Event>, RepoError>;
}

// =============================================================================
// World / Arc / Faction State
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorldStateRepo: Send + Sync {
    async fn get_world(&self, id: &WorldId) -> Result<Option<World>, RepoError>;
    async fn update_world(&self, id: &WorldId, patch: WorldPatch) -> Result<World, RepoError>;

    async fn get_arc(&self, id: &ArcId) -> Result<Option<StoryArc>, RepoError>;
    async fn update_arc(&self, id: &ArcId, patch: ArcPatch) -> Result<StoryArc, RepoError>;
    async fn list_arcs(&self, world_id: &WorldId) -> Result<Vec<StoryArc>, RepoError>;

    async fn get_faction(&self, id: &FactionId) -> Result<Option<Faction>, RepoError>;
    async fn update_faction(&self, id: &FactionId, patch: FactionPatch)
        -> Result<Faction, RepoError>;
    async fn list_factions(&self, world_id: &WorldId) -> Result<Vec<Faction>, RepoError>;

    async fn get_entity(&self, id: &EntityId) -> Result<Option<Entity>, RepoError>;
    /// Player characters of a world, in a stable order.
    async fn list_party(&self, world_id: &WorldId) -> Result<Vec<Entity>, RepoError>;
}

/// Server-side arithmetic updates. Each call adds and clamps atomically.
///
/// Rows are scoped to `world_id`: an id owned by another world is reported
/// as not found and nothing is written. Stores without these procedures
/// return [`RepoError::Unavailable`].
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DeltaProcedures: Send + Sync {
    async fn apply_world_deltas(&self, world_id: &WorldId, tension_delta: f64)
        -> Result<(), RepoError>;

    async fn apply_arc_progress_deltas(
        &self,
        world_id: &WorldId,
        updates: Vec<ArcDelta>,
    ) -> Result<(), RepoError>;

    async fn apply_faction_pressure_deltas(
        &self,
        world_id: &WorldId,
        updates: Vec<FactionDelta>,
    ) -> Result<(), RepoError>;
}

// =============================================================================
// Realtime Change Feed
// =============================================================================

pub trait ChangeFeedPort: Send + Sync {
    fn subscribe(&self, scope: ChangeScope) -> ChangeSubscription;
}

// =============================================================================
// Plan Augmentation
// =============================================================================

/// Optional non-deterministic plan source (e.g. a language model).
///
/// Never consulted when the caller asks for deterministic output.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlanAugmenter: Send + Sync {
    async fn augment(
        &self,
        snapshot: &WorldSnapshot,
        baseline: &Recommendation,
        ask: &str,
    ) -> Result<Option<Recommendation>, AugmentError>;
}
