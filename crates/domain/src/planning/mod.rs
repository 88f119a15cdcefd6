//! Plan generators.
//!
//! - [`director`] plans the consequences of one resolved check
//! - [`procedural`] plans an advisory world tick from a snapshot and seed

pub mod director;
pub mod procedural;
pub mod rng;

pub use director::{derive_location, plan_from_outcome, pretty};
pub use procedural::{baseline_plan, merge_augmentation, plan_for_seed, PlanConstraints};
pub use rng::{LcgRng, PlanRng, DEFAULT_SEED};
