//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - The event store and world state store (could swap memory -> Postgres)
//! - The store's atomic delta procedures
//! - Realtime change notification
//! - Optional plan augmentation
//! - Clock/Random (for testing)

mod error;
mod repos;
mod testing;
pub mod types;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::*;

// =============================================================================
// Types from types module (re-export for visibility)
// =============================================================================
pub use types::{
    // Event store
    EventFilter, EventPatch,
    // World state
    ArcPatch, FactionPatch, WorldPatch,
    // Change feed
    ChangeKind, ChangeNotice, ChangeScope, ChangeSubscription, ChangeTable,
};

// =============================================================================
// Error Types
// =============================================================================
pub use error::{AugmentError, RepoError};

// =============================================================================
// Testability Ports
// =============================================================================
pub use testing::{ClockPort, RandomPort};

#[cfg(test)]
pub use testing::MockClockPort;
