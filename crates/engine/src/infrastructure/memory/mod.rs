//! In-memory store adapter.
//!
//! Implements every store port over `tokio::sync::RwLock`ed maps. The delta
//! procedures run their arithmetic under one write lock, so they are atomic
//! with respect to each other. The read-modify-write path the Delta
//! Applicator falls back to is not: it takes the lock once to read and once
//! to write, and concurrent fallback appliers can lose updates.

mod seed;

pub use seed::WorldSeed;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use taleforge_domain::{
    clamp_unit, dedupe_tags, ArcDelta, ArcId, Entity, EntityId, Event, EventId, Faction,
    FactionDelta, FactionId, NewEvent, StoryArc, World, WorldId,
};

use crate::infrastructure::ports::{
    ArcPatch, ChangeFeedPort, ChangeKind, ChangeNotice, ChangeScope, ChangeSubscription,
    ChangeTable, ClockPort, DeltaProcedures, EventFilter, EventPatch, EventRepo, FactionPatch,
    RepoError, WorldPatch, WorldStateRepo,
};

/// Buffered notices per subscriber before it starts lagging.
const CHANGE_FEED_CAPACITY: usize = 256;

struct StoredEvent {
    /// Insertion order; breaks `created_at` ties.
    seq: u64,
    event: Event,
}

#[derive(Default)]
struct StoreState {
    events: HashMap<EventId, StoredEvent>,
    next_seq: u64,
    worlds: HashMap<WorldId, World>,
    arcs: HashMap<ArcId, StoryArc>,
    factions: HashMap<FactionId, Faction>,
    entities: HashMap<EntityId, Entity>,
}

impl StoreState {
    fn push_event(&mut self, event: Event) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.insert(event.id.clone(), StoredEvent { seq, event });
    }
}

pub struct InMemoryStore {
    state: RwLock<StoreState>,
    clock: Arc<dyn ClockPort>,
    procedures_enabled: AtomicBool,
    changes: broadcast::Sender<ChangeNotice>,
}

impl InMemoryStore {
    pub fn new(clock: Arc<dyn ClockPort>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_FEED_CAPACITY);
        Self {
            state: RwLock::new(StoreState::default()),
            clock,
            procedures_enabled: AtomicBool::new(true),
            changes,
        }
    }

    pub fn with_procedures(self, enabled: bool) -> Self {
        self.set_procedures_enabled(enabled);
        self
    }

    /// Toggle the atomic delta procedures. Disabled procedures report
    /// [`RepoError::Unavailable`].
    pub fn set_procedures_enabled(&self, enabled: bool) {
        self.procedures_enabled.store(enabled, AtomicOrdering::SeqCst);
    }

    fn procedures_enabled(&self) -> bool {
        self.procedures_enabled.load(AtomicOrdering::SeqCst)
    }

    pub async fn put_world(&self, world: World) {
        let mut state = self.state.write().await;
        state.worlds.insert(world.id.clone(), world);
    }

    pub async fn put_arc(&self, arc: StoryArc) {
        let mut state = self.state.write().await;
        state.arcs.insert(arc.id.clone(), arc);
    }

    pub async fn put_faction(&self, faction: Faction) {
        let mut state = self.state.write().await;
        state.factions.insert(faction.id.clone(), faction);
    }

    pub async fn put_entity(&self, entity: Entity) {
        let mut state = self.state.write().await;
        state.entities.insert(entity.id.clone(), entity);
    }

    /// Store an event with its id and timestamp as given.
    pub async fn put_event(&self, event: Event) {
        let mut state = self.state.write().await;
        state.push_event(event);
    }

    /// Load every row of a seed, in file order.
    pub async fn load_seed(&self, seed: WorldSeed) {
        let mut state = self.state.write().await;
        let counts = (
            seed.worlds.len(),
            seed.arcs.len(),
            seed.factions.len(),
            seed.entities.len(),
            seed.events.len(),
        );
        for world in seed.worlds {
            state.worlds.insert(world.id.clone(), world);
        }
        for arc in seed.arcs {
            state.arcs.insert(arc.id.clone(), arc);
        }
        for faction in seed.factions {
            state.factions.insert(faction.id.clone(), faction);
        }
        for entity in seed.entities {
            state.entities.insert(entity.id.clone(), entity);
        }
        for event in seed.events {
            state.push_event(event);
        }
        tracing::info!(
            worlds = counts.0,
            arcs = counts.1,
            factions = counts.2,
            entities = counts.3,
            events = counts.4,
            "Loaded world seed"
        );
    }

    fn publish(&self, table: ChangeTable, world_id: &WorldId, row_id: &str, kind: ChangeKind) {
        // No subscribers is not an error.
        let _ = self.changes.send(ChangeNotice {
            table,
            world_id: world_id.clone(),
            row_id: row_id.to_string(),
            kind,
        });
    }
}

fn feed_order(a: &StoredEvent, b: &StoredEvent) -> Ordering {
    a.event
        .created_at
        .cmp(&b.event.created_at)
        .then(a.seq.cmp(&b.seq))
}

// =============================================================================
// Event Store
// =============================================================================

#[async_trait]
impl EventRepo for InMemoryStore {
    async fn insert(&self, new_event: NewEvent) -> Result<Event, RepoError> {
        let mut state = self.state.write().await;

        if !state.worlds.contains_key(&new_event.world_id) {
            return Err(RepoError::not_found("World", &new_event.world_id));
        }

        if let Some(parent_id) = &new_event.parent_event_id {
            let parent = state
                .events
                .get(parent_id)
                .map(|stored| &stored.event)
                .ok_or_else(|| RepoError::not_found("Event", parent_id))?;
            if parent.world_id != new_event.world_id {
                return Err(RepoError::constraint(format!(
                    "parent {} belongs to world {}, not {}",
                    parent_id, parent.world_id, new_event.world_id
                )));
            }
            let expected = parent.root_thread_id();
            if let Some(thread_id) = &new_event.thread_id {
                if *thread_id != expected {
                    return Err(RepoError::constraint(format!(
                        "child of {} must join thread {}, not {}",
                        parent_id, expected, thread_id
                    )));
                }
            }
        }

        let event = Event {
            id: EventId::new(),
            world_id: new_event.world_id,
            payload: new_event.payload,
            title: new_event.title,
            priority: new_event.priority,
            tags: dedupe_tags(new_event.tags),
            parent_event_id: new_event.parent_event_id,
            thread_id: new_event.thread_id,
            created_at: self.clock.now(),
        };
        state.push_event(event.clone());
        self.publish(
            ChangeTable::Events,
            &event.world_id,
            event.id.as_str(),
            ChangeKind::Insert,
        );
        Ok(event)
    }

    async fn get(&self, id: &EventId) -> Result<Option<Event>, RepoError> {
        let state = self.state.read().await;
        Ok(state.events.get(id).map(|stored| stored.event.clone()))
    }

    async fn update(&self, id: &EventId, patch: EventPatch) -> Result<Event, RepoError> {
        let mut state = self.state.write().await;
        let stored = state
            .events
            .get_mut(id)
            .ok_or_else(|| RepoError::not_found("Event", id))?;

        if let Some(thread_id) = patch.thread_id {
            match &stored.event.thread_id {
                Some(existing) if *existing != thread_id => {
                    return Err(RepoError::constraint(format!(
                        "event {} already belongs to thread {}",
                        id, existing
                    )));
                }
                _ => stored.event.thread_id = Some(thread_id),
            }
        }
        if let Some(tags) = patch.tags {
            stored.event.tags = dedupe_tags(tags);
        }

        let event = stored.event.clone();
        self.publish(
            ChangeTable::Events,
            &event.world_id,
            event.id.as_str(),
            ChangeKind::Update,
        );
        Ok(event)
    }

    async fn query(&self, world_id: &WorldId, filter: EventFilter) -> Result<Vec<Event>, RepoError> {
        let state = self.state.read().await;
        let mut matched: Vec<&StoredEvent> = state
            .events
            .values()
            .filter(|stored| {
                let event = &stored.event;
                event.world_id == *world_id
                    && filter
                        .thread_id
                        .as_ref()
                        .map_or(true, |t| event.thread_id.as_ref() == Some(t))
                    && filter
                        .parent_event_id
                        .as_ref()
                        .map_or(true, |p| event.parent_event_id.as_ref() == Some(p))
                    && filter.tag.as_deref().map_or(true, |tag| event.has_tag(tag))
                    && filter
                        .event_type
                        .as_deref()
                        .map_or(true, |kind| event.event_type() == kind)
            })
            .collect();

        matched.sort_by(|a, b| feed_order(a, b));
        if filter.newest_first {
            matched.reverse();
        }
        if let Some(limit) = filter.limit {
            matched.truncate(limit);
        }
        Ok(matched.into_iter().map(|stored| stored.event.clone()).collect())
    }
}

// =============================================================================
// World State
// =============================================================================

#[async_trait]
impl WorldStateRepo for InMemoryStore {
    async fn get_world(&self, id: &WorldId) -> Result<Option<World>, RepoError> {
        Ok(self.state.read().await.worlds.get(id).cloned())
    }

    async fn update_world(&self, id: &WorldId, patch: WorldPatch) -> Result<World, RepoError> {
        let mut state = self.state.write().await;
        let world = state
            .worlds
            .get_mut(id)
            .ok_or_else(|| RepoError::not_found("World", id))?;
        if let Some(tension) = patch.tension {
            world.tension = tension;
        }
        if let Some(time) = patch.time {
            world.time = Some(time);
        }
        let world = world.clone();
        self.publish(ChangeTable::Worlds, id, id.as_str(), ChangeKind::Update);
        Ok(world)
    }

    async fn get_arc(&self, id: &ArcId) -> Result<Option<StoryArc>, RepoError> {
        Ok(self.state.read().await.arcs.get(id).cloned())
    }

    async fn update_arc(&self, id: &ArcId, patch: ArcPatch) -> Result<StoryArc, RepoError> {
        let mut state = self.state.write().await;
        let arc = state
            .arcs
            .get_mut(id)
            .ok_or_else(|| RepoError::not_found("Arc", id))?;
        if let Some(progress) = patch.progress {
            arc.progress = progress;
        }
        let arc = arc.clone();
        self.publish(ChangeTable::Arcs, &arc.world_id, id.as_str(), ChangeKind::Update);
        Ok(arc)
    }

    async fn list_arcs(&self, world_id: &WorldId) -> Result<Vec<StoryArc>, RepoError> {
        let state = self.state.read().await;
        let mut arcs: Vec<StoryArc> = state
            .arcs
            .values()
            .filter(|arc| arc.world_id == *world_id)
            .cloned()
            .collect();
        arcs.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(arcs)
    }

    async fn get_faction(&self, id: &FactionId) -> Result<Option<Faction>, RepoError> {
        Ok(self.state.read().await.factions.get(id).cloned())
    }

    async fn update_faction(
        &self,
        id: &FactionId,
        patch: FactionPatch,
    ) -> Result<Faction, RepoError> {
        let mut state = self.state.write().await;
        let faction = state
            .factions
            .get_mut(id)
            .ok_or_else(|| RepoError::not_found("Faction", id))?;
        if let Some(pressure) = patch.pressure {
            faction.pressure = pressure;
        }
        let faction = faction.clone();
        self.publish(
            ChangeTable::Factions,
            &faction.world_id,
            id.as_str(),
            ChangeKind::Update,
        );
        Ok(faction)
    }

    async fn list_factions(&self, world_id: &WorldId) -> Result<Vec<Faction>, RepoError> {
        let state = self.state.read().await;
        let mut factions: Vec<Faction> = state
            .factions
            .values()
            .filter(|faction| faction.world_id == *world_id)
            .cloned()
            .collect();
        factions.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(factions)
    }

    async fn get_entity(&self, id: &EntityId) -> Result<Option<Entity>, RepoError> {
        Ok(self.state.read().await.entities.get(id).cloned())
    }

    async fn list_party(&self, world_id: &WorldId) -> Result<Vec<Entity>, RepoError> {
        let state = self.state.read().await;
        let mut party: Vec<Entity> = state
            .entities
            .values()
            .filter(|entity| entity.world_id == *world_id && entity.is_pc())
            .cloned()
            .collect();
        party.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(party)
    }
}

// =============================================================================
// Atomic Delta Procedures
// =============================================================================

#[async_trait]
impl DeltaProcedures for InMemoryStore {
    async fn apply_world_deltas(
        &self,
        world_id: &WorldId,
        tension_delta: f64,
    ) -> Result<(), RepoError> {
        if !self.procedures_enabled() {
            return Err(RepoError::unavailable("apply_world_deltas"));
        }
        let mut state = self.state.write().await;
        let world = state
            .worlds
            .get_mut(world_id)
            .ok_or_else(|| RepoError::not_found("World", world_id))?;
        world.tension = clamp_unit(world.tension + tension_delta);
        self.publish(
            ChangeTable::Worlds,
            world_id,
            world_id.as_str(),
            ChangeKind::Update,
        );
        Ok(())
    }

    async fn apply_arc_progress_deltas(
        &self,
        world_id: &WorldId,
        updates: Vec<ArcDelta>,
    ) -> Result<(), RepoError> {
        if !self.procedures_enabled() {
            return Err(RepoError::unavailable("apply_arc_progress_deltas"));
        }
        let mut state = self.state.write().await;
        // All rows must exist in this world before any is touched.
        if let Some(missing) = updates
            .iter()
            .find(|u| !matches!(state.arcs.get(&u.id), Some(arc) if arc.world_id == *world_id))
        {
            return Err(RepoError::not_found("Arc", &missing.id));
        }
        for update in &updates {
            if let Some(arc) = state.arcs.get_mut(&update.id) {
                arc.progress = clamp_unit(arc.progress + update.progress_delta);
                self.publish(
                    ChangeTable::Arcs,
                    &arc.world_id,
                    arc.id.as_str(),
                    ChangeKind::Update,
                );
            }
        }
        Ok(())
    }

    async fn apply_faction_pressure_deltas(
        &self,
        world_id: &WorldId,
        updates: Vec<FactionDelta>,
    ) -> Result<(), RepoError> {
        if !self.procedures_enabled() {
            return Err(RepoError::unavailable("apply_faction_pressure_deltas"));
        }
        let mut state = self.state.write().await;
        if let Some(missing) = updates.iter().find(
            |u| !matches!(state.factions.get(&u.id), Some(f) if f.world_id == *world_id),
        ) {
            return Err(RepoError::not_found("Faction", &missing.id));
        }
        for update in &updates {
            if let Some(faction) = state.factions.get_mut(&update.id) {
                faction.pressure = clamp_unit(faction.pressure + update.pressure_delta);
                self.publish(
                    ChangeTable::Factions,
                    &faction.world_id,
                    faction.id.as_str(),
                    ChangeKind::Update,
                );
            }
        }
        Ok(())
    }
}

// =============================================================================
// Change Feed
// =============================================================================

impl ChangeFeedPort for InMemoryStore {
    fn subscribe(&self, scope: ChangeScope) -> ChangeSubscription {
        ChangeSubscription::new(scope, self.changes.subscribe())
    }
}
