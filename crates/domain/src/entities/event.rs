//! World events and their causal threads.
//!
//! Events form a forest: `parent_event_id` points at the direct cause, and
//! `thread_id` names the root of the tree the event belongs to. A root
//! event's thread id is its own id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::payload::EventPayload;
use crate::{EventId, WorldId};

/// Priority assigned when a draft does not name one.
pub const DEFAULT_PRIORITY: i32 = 1;

fn default_priority() -> i32 {
    DEFAULT_PRIORITY
}

/// A persisted world event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub world_id: WorldId,
    #[serde(flatten)]
    pub payload: EventPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub parent_event_id: Option<EventId>,
    #[serde(default)]
    pub thread_id: Option<EventId>,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn event_type(&self) -> &str {
        self.payload.kind()
    }

    pub fn is_root(&self) -> bool {
        self.parent_event_id.is_none()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Thread this event roots or belongs to.
    ///
    /// Falls back to the event's own id when no thread is assigned yet,
    /// which is what [`ensure_thread_for`] would write.
    pub fn root_thread_id(&self) -> EventId {
        self.thread_id.clone().unwrap_or_else(|| self.id.clone())
    }
}

/// An event to insert. Id and timestamp are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    pub world_id: WorldId,
    #[serde(flatten)]
    pub payload: EventPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub parent_event_id: Option<EventId>,
    #[serde(default)]
    pub thread_id: Option<EventId>,
}

impl NewEvent {
    pub fn new(world_id: WorldId, payload: EventPayload) -> Self {
        Self {
            world_id,
            payload,
            title: None,
            priority: DEFAULT_PRIORITY,
            tags: Vec::new(),
            parent_event_id: None,
            thread_id: None,
        }
    }

    /// Materialise a plan draft for `world_id` as a root event.
    pub fn from_draft(world_id: WorldId, draft: EventDraft) -> Self {
        Self {
            world_id,
            payload: draft.payload,
            title: draft.title,
            priority: draft.priority,
            tags: dedupe_tags(draft.tags),
            parent_event_id: None,
            thread_id: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = dedupe_tags(tags.into_iter().map(Into::into).collect());
        self
    }

    /// Link this event beneath `parent` in `thread`.
    pub fn child_of(mut self, parent: EventId, thread: EventId) -> Self {
        self.parent_event_id = Some(parent);
        self.thread_id = Some(thread);
        self
    }
}

/// An event proposed by a plan, before it is bound to a world or thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    #[serde(flatten)]
    pub payload: EventPayload,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: i32,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl EventDraft {
    pub fn new(payload: EventPayload, title: impl Into<String>, priority: i32) -> Self {
        Self {
            payload,
            title: Some(title.into()),
            priority,
            tags: Vec::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = dedupe_tags(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn event_type(&self) -> &str {
        self.payload.kind()
    }

    /// Bind the draft to a world and a parent event.
    pub fn into_child(self, world_id: WorldId, parent: EventId, thread: EventId) -> NewEvent {
        NewEvent::from_draft(world_id, self).child_of(parent, thread)
    }
}

/// Drop repeated tags, keeping first occurrences in order.
pub fn dedupe_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

/// Set-union `add` into `existing`, then drop anything in `remove`.
///
/// Existing tags keep their order; new tags are appended in the order given.
pub fn merge_tags(existing: &[String], add: &[String], remove: &[String]) -> Vec<String> {
    let merged = existing.iter().chain(add.iter()).cloned().collect();
    dedupe_tags(merged)
        .into_iter()
        .filter(|tag| !remove.contains(tag))
        .collect()
}

/// Thread id a root event should carry: its existing one, or its own id.
pub fn ensure_thread_for(event: &Event) -> EventId {
    event.root_thread_id()
}

/// Thread id a child of `parent` should inherit.
pub fn derive_thread_from_parent(parent: &Event) -> EventId {
    parent.root_thread_id()
}
