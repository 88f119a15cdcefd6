//! Taleforge Engine library.
//!
//! Server side of the narrative engine: the event store, causality
//! threading, delta application and the HTTP surface.
//!
//! ## Structure
//!
//! - `use_cases/` - Flows across the store ports and domain planners
//! - `infrastructure/` - Store ports and the in-memory adapter
//! - `api/` - HTTP entry points
//! - `app` - Application composition
//! - `config` - Environment configuration

pub mod api;
pub mod app;
pub mod config;
pub mod infrastructure;
pub mod use_cases;

/// Test fixtures module for integration testing.
#[cfg(test)]
pub mod test_fixtures;

/// End-to-end flows through the HTTP router.
#[cfg(test)]
mod e2e_tests;

pub use app::App;
pub use config::EngineConfig;
