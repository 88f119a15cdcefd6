use serde::{Deserialize, Serialize};

fn default_hours() -> u32 {
    1
}

/// Advance a world's clock and let tension drift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickRequest {
    #[serde(default = "default_hours")]
    pub hours: u32,
    /// Drift seed. Derived from the server clock when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
}

impl Default for TickRequest {
    fn default() -> Self {
        Self {
            hours: default_hours(),
            seed: None,
        }
    }
}
