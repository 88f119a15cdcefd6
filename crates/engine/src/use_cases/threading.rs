//! Causality threading.
//!
//! Every event belongs to the thread of its root. Roots are threaded lazily:
//! the first caller that needs a thread id writes the event's own id into
//! `thread_id`. Concurrent first touches all write the same value, so the
//! race converges without a lock.

use std::sync::Arc;

use taleforge_domain::{Event, EventDraft, EventId, NewEvent, WorldId};

use crate::infrastructure::ports::{EventPatch, EventRepo, RepoError};

#[derive(Debug, thiserror::Error)]
pub enum ThreadError {
    #[error("Event not found: {0}")]
    EventNotFound(EventId),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl ThreadError {
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::EventNotFound(_) => true,
            Self::Repo(e) => e.is_not_found(),
        }
    }
}

pub struct CausalityThreader {
    events: Arc<dyn EventRepo>,
}

impl CausalityThreader {
    pub fn new(events: Arc<dyn EventRepo>) -> Self {
        Self { events }
    }

    async fn load(&self, event_id: &EventId) -> Result<Event, ThreadError> {
        self.events
            .get(event_id)
            .await?
            .ok_or_else(|| ThreadError::EventNotFound(event_id.clone()))
    }

    /// Thread id of `event_id`, self-rooting the event when it has none.
    pub async fn ensure_thread_for(&self, event_id: &EventId) -> Result<EventId, ThreadError> {
        let event = self.load(event_id).await?;
        self.ensure_thread(&event).await
    }

    /// Same as [`Self::ensure_thread_for`] for an event already in hand.
    pub async fn ensure_thread(&self, event: &Event) -> Result<EventId, ThreadError> {
        if let Some(thread_id) = &event.thread_id {
            return Ok(thread_id.clone());
        }

        let thread_id = taleforge_domain::ensure_thread_for(event);
        let rooted = self
            .events
            .update(&event.id, EventPatch::thread(thread_id.clone()))
            .await?;
        tracing::debug!(event_id = %event.id, thread_id = %thread_id, "Rooted event thread");
        Ok(rooted.thread_id.unwrap_or(thread_id))
    }

    /// Thread a child of `parent_id` must join. Does not write.
    pub async fn derive_thread_from_parent(
        &self,
        parent_id: &EventId,
    ) -> Result<EventId, ThreadError> {
        let parent = self.load(parent_id).await?;
        Ok(taleforge_domain::derive_thread_from_parent(&parent))
    }

    /// Insert `draft` beneath `parent`, in the parent's thread.
    pub async fn post_child(&self, parent: &Event, draft: EventDraft) -> Result<Event, ThreadError> {
        let thread_id = taleforge_domain::derive_thread_from_parent(parent);
        let child = self
            .events
            .insert(draft.into_child(parent.world_id.clone(), parent.id.clone(), thread_id))
            .await?;
        tracing::debug!(
            event_id = %child.id,
            parent_event_id = %parent.id,
            event_type = child.event_type(),
            "Posted child event"
        );
        Ok(child)
    }

    /// Insert `new_event` as the root of a fresh thread.
    pub async fn post_root(&self, new_event: NewEvent) -> Result<Event, ThreadError> {
        let mut event = self.events.insert(new_event).await?;
        let thread_id = self.ensure_thread(&event).await?;
        event.thread_id = Some(thread_id);
        tracing::debug!(event_id = %event.id, event_type = event.event_type(), "Posted root event");
        Ok(event)
    }

    /// Insert a plan draft for `world_id` as a thread root.
    pub async fn post_draft_root(
        &self,
        world_id: &WorldId,
        draft: EventDraft,
    ) -> Result<Event, ThreadError> {
        self.post_root(NewEvent::from_draft(world_id.clone(), draft))
            .await
    }
}
