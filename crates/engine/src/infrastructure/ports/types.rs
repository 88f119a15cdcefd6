//! Helper types for port operations.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use taleforge_domain::{EventId, WorldId};

// =============================================================================
// Event Store Types
// =============================================================================

/// Partial update of an event. Only tags and the thread id are mutable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPatch {
    pub tags: Option<Vec<String>>,
    /// Rejected by the store when it would change an assigned thread id.
    pub thread_id: Option<EventId>,
}

impl EventPatch {
    pub fn tags(tags: Vec<String>) -> Self {
        Self {
            tags: Some(tags),
            thread_id: None,
        }
    }

    pub fn thread(thread_id: EventId) -> Self {
        Self {
            tags: None,
            thread_id: Some(thread_id),
        }
    }
}

/// Filters for [`super::EventRepo::query`]. Empty filters match everything.
///
/// Results are ordered by `created_at`, then by insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilter {
    pub thread_id: Option<EventId>,
    pub parent_event_id: Option<EventId>,
    pub tag: Option<String>,
    pub event_type: Option<String>,
    pub limit: Option<usize>,
    /// Reverse the order (both keys).
    pub newest_first: bool,
}

impl EventFilter {
    pub fn thread(thread_id: EventId) -> Self {
        Self {
            thread_id: Some(thread_id),
            ..Self::default()
        }
    }

    pub fn children_of(parent: EventId) -> Self {
        Self {
            parent_event_id: Some(parent),
            ..Self::default()
        }
    }

    /// The `limit` most recent events.
    pub fn recent(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            newest_first: true,
            ..Self::default()
        }
    }
}

// =============================================================================
// World State Types
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorldPatch {
    pub tension: Option<f64>,
    pub time: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArcPatch {
    pub progress: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FactionPatch {
    pub pressure: Option<f64>,
}

// =============================================================================
// Change Feed Types
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeTable {
    Events,
    Worlds,
    Arcs,
    Factions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
}

/// One committed write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeNotice {
    pub table: ChangeTable,
    pub world_id: WorldId,
    pub row_id: String,
    pub kind: ChangeKind,
}

/// Which writes a subscriber wants to hear about.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeScope {
    pub table: ChangeTable,
    pub world_id: Option<WorldId>,
}

impl ChangeScope {
    pub fn table(table: ChangeTable) -> Self {
        Self {
            table,
            world_id: None,
        }
    }

    pub fn in_world(mut self, world_id: WorldId) -> Self {
        self.world_id = Some(world_id);
        self
    }

    pub fn matches(&self, notice: &ChangeNotice) -> bool {
        notice.table == self.table
            && self
                .world_id
                .as_ref()
                .map_or(true, |world_id| *world_id == notice.world_id)
    }
}

/// Scoped receiver over a change broadcast.
pub struct ChangeSubscription {
    scope: ChangeScope,
    receiver: broadcast::Receiver<ChangeNotice>,
}

impl ChangeSubscription {
    pub fn new(scope: ChangeScope, receiver: broadcast::Receiver<ChangeNotice>) -> Self {
        Self { scope, receiver }
    }

    pub fn scope(&self) -> &ChangeScope {
        &self.scope
    }

    /// Next notice in scope, or `None` once the feed is closed.
    ///
    /// A lagging subscriber skips what it missed.
    pub async fn recv(&mut self) -> Option<ChangeNotice> {
        loop {
            match self.receiver.recv().await {
                Ok(notice) if self.scope.matches(&notice) => return Some(notice),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, table = ?self.scope.table, "Change subscriber lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next notice in scope that is already queued, without waiting.
    pub fn try_recv(&mut self) -> Option<ChangeNotice> {
        loop {
            match self.receiver.try_recv() {
                Ok(notice) if self.scope.matches(&notice) => return Some(notice),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}
