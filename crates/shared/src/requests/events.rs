use serde::{Deserialize, Serialize};

/// Query string for listing a world's event feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventQuery {
    #[serde(default)]
    pub thread_id: Option<String>,
    #[serde(default)]
    pub parent_event_id: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default, rename = "type")]
    pub event_type: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
    /// Feed order. Threads read oldest first, the feed newest first.
    #[serde(default)]
    pub newest_first: Option<bool>,
}
