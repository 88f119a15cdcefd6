use serde::{Deserialize, Serialize};

/// Modifier used for pressure checks when the caller gives none.
pub const DEFAULT_PRESSURE_MODIFIER: i32 = 6;

/// DC used for pressure checks when the caller gives none.
pub const DEFAULT_PRESSURE_DC: i32 = 18;

/// An actor investigates a rumor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvestigateRequest {
    pub actor_id: String,
    /// Natural d20 result for physical dice. Rolled by the server when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll: Option<i32>,
}

/// The party pushes back against a faction move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PressureRequest {
    pub faction_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dc: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll: Option<i32>,
}

impl PressureRequest {
    pub fn modifier(&self) -> i32 {
        self.modifier.unwrap_or(DEFAULT_PRESSURE_MODIFIER)
    }

    pub fn dc(&self) -> i32 {
        self.dc.unwrap_or(DEFAULT_PRESSURE_DC)
    }
}
