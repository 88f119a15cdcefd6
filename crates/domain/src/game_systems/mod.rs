//! Game system rules.
//!
//! Only one ruleset is modelled: the PF2e level-based DC table and its
//! degree-of-success rule.

pub mod pf2e;

pub use pf2e::{degree_of_success, level_dc, Degree, MAX_TABLE_LEVEL};
