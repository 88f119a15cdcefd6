//! Infrastructure implementations.
//!
//! Contains port trait implementations for the narrative store.

pub mod clock;
pub mod memory;
pub mod ports;
