//! A resolved d20 check.

use serde::{Deserialize, Serialize};

use crate::game_systems::{degree_of_success, Degree};

/// Faces on the check die.
pub const D20_FACES: i32 = 20;

/// d20 + modifier against a DC, with its degree of success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRoll {
    pub d20: i32,
    #[serde(rename = "mod")]
    pub modifier: i32,
    pub total: i32,
    pub dc: i32,
    pub degree: Degree,
}

impl CheckRoll {
    pub fn resolve(d20: i32, modifier: i32, dc: i32) -> Self {
        let total = d20.saturating_add(modifier);
        Self {
            d20,
            modifier,
            total,
            dc,
            degree: degree_of_success(total, dc),
        }
    }

    pub fn is_natural_roll(value: i32) -> bool {
        (1..=D20_FACES).contains(&value)
    }
}
