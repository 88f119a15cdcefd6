//! Pathfinder 2nd Edition outcome rules.
//!
//! PF2e uses a d20 + modifier vs DC system with four degrees of success.
//! Only the two pieces the narrative engine needs are modelled here:
//! - Level-based DCs (GM Core "Level-Based DCs" table)
//! - The +/-10 degree-of-success rule

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Highest level covered by the DC table.
pub const MAX_TABLE_LEVEL: i32 = 25;

/// Level-based DCs, indexed by level 0..=25.
const DC_BY_LEVEL: [i32; 26] = [
    14, 15, 16, 18, 19, 20, 22, 23, 24, 26, 27, 28, 30, 31, 32, 34, 35, 36, 38, 39, 40, 42, 44,
    46, 48, 50,
];

/// Four degrees of success in PF2e.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Degree {
    /// Beat DC by 10+
    CriticalSuccess,
    /// Meet or beat DC
    Success,
    /// Below DC
    Failure,
    /// Miss DC by 10+
    CriticalFailure,
}

impl Degree {
    pub const ALL: [Degree; 4] = [
        Degree::CriticalSuccess,
        Degree::Success,
        Degree::Failure,
        Degree::CriticalFailure,
    ];

    /// Either success variant.
    pub fn is_success(self) -> bool {
        matches!(self, Degree::CriticalSuccess | Degree::Success)
    }

    pub fn is_critical(self) -> bool {
        matches!(self, Degree::CriticalSuccess | Degree::CriticalFailure)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Degree::CriticalSuccess => "critical_success",
            Degree::Success => "success",
            Degree::Failure => "failure",
            Degree::CriticalFailure => "critical_failure",
        }
    }
}

impl fmt::Display for Degree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Degree {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "critical_success" => Ok(Degree::CriticalSuccess),
            "success" => Ok(Degree::Success),
            "failure" => Ok(Degree::Failure),
            "critical_failure" => Ok(Degree::CriticalFailure),
            _ => Err(DomainError::parse(format!("Unknown degree of success: {}", s))),
        }
    }
}

/// DC for a challenge appropriate to `level`.
///
/// Levels outside the table are clamped to `0..=25`, so this never fails.
pub fn level_dc(level: i32) -> i32 {
    let index = level.clamp(0, MAX_TABLE_LEVEL) as usize;
    DC_BY_LEVEL[index]
}

/// Degree of success for a roll `total` against `dc`.
pub fn degree_of_success(total: i32, dc: i32) -> Degree {
    let diff = i64::from(total) - i64::from(dc);
    if diff >= 10 {
        Degree::CriticalSuccess
    } else if diff >= 0 {
        Degree::Success
    } else if diff <= -10 {
        Degree::CriticalFailure
    } else {
        Degree::Failure
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_dc_matches_table_endpoints() {
        assert_eq!(level_dc(0), 14);
        assert_eq!(level_dc(1), 15);
        assert_eq!(level_dc(3), 18);
        assert_eq!(level_dc(25), 50);
    }

    #[test]
    fn level_dc_clamps_out_of_range_levels() {
        assert_eq!(level_dc(-7), 14);
        assert_eq!(level_dc(i32::MIN), 14);
        assert_eq!(level_dc(26), 50);
        assert_eq!(level_dc(i32::MAX), 50);
    }

    #[test]
    fn level_dc_is_non_decreasing() {
        let mut previous = level_dc(-5);
        for level in -4..=30 {
            let dc = level_dc(level);
            assert!(dc >= previous, "dc dropped at level {}", level);
            previous = dc;
        }
    }

    #[test]
    fn degree_boundaries() {
        assert_eq!(degree_of_success(25, 15), Degree::CriticalSuccess);
        assert_eq!(degree_of_success(24, 15), Degree::Success);
        assert_eq!(degree_of_success(15, 15), Degree::Success);
        assert_eq!(degree_of_success(14, 15), Degree::Failure);
        assert_eq!(degree_of_success(6, 15), Degree::Failure);
        assert_eq!(degree_of_success(5, 15), Degree::CriticalFailure);
    }

    #[test]
    fn only_extreme_degrees_are_critical() {
        let critical: Vec<Degree> = Degree::ALL.into_iter().filter(|d| d.is_critical()).collect();
        assert_eq!(critical, vec![Degree::CriticalSuccess, Degree::CriticalFailure]);
    }

    #[test]
    fn raising_success_boundary_by_ten_is_critical() {
        for dc in [-3, 0, 14, 18, 50] {
            assert_eq!(degree_of_success(dc, dc), Degree::Success);
            assert_eq!(degree_of_success(dc + 10, dc), Degree::CriticalSuccess);
        }
    }

    #[test]
    fn degree_is_total_for_extreme_inputs() {
        assert_eq!(degree_of_success(i32::MAX, i32::MIN), Degree::CriticalSuccess);
        assert_eq!(degree_of_success(i32::MIN, i32::MAX), Degree::CriticalFailure);
    }

    #[test]
    fn degree_round_trips_through_str() {
        for degree in Degree::ALL {
            assert_eq!(degree.as_str().parse::<Degree>(), Ok(degree));
        }
        assert!("partial".parse::<Degree>().is_err());
    }
}
