//! Test fixtures loader for JSON fixture files and common test helpers.
//!
//! Fixtures live in the crate's `test_data/` directory.
//!
//! # Usage
//!
//! ```rust,ignore
//! use crate::test_fixtures::{test_app, worlds};
//!
//! #[tokio::test]
//! async fn test_rumor_feed() {
//!     let (store, app) = test_app(10).await;
//!     // ... test logic
//! }
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};

use crate::app::App;
use crate::infrastructure::clock::{FixedRandom, SteppingClock};
use crate::infrastructure::memory::{InMemoryStore, WorldSeed};

// =============================================================================
// Fixture Loading
// =============================================================================

/// Load a JSON fixture from test_data/ directory.
///
/// # Panics
///
/// Panics if the fixture file cannot be read or parsed.
pub fn load_fixture<T: serde::de::DeserializeOwned>(path: &str) -> T {
    let fixture_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_data")
        .join(path);
    let content = std::fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read fixture '{}': {}",
            fixture_path.display(),
            e
        )
    });
    serde_json::from_str(&content).unwrap_or_else(|e| {
        panic!(
            "Failed to parse fixture '{}': {}",
            fixture_path.display(),
            e
        )
    })
}

/// Load a fixture and return Option instead of panicking.
pub fn try_load_fixture<T: serde::de::DeserializeOwned>(path: &str) -> Option<T> {
    let fixture_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_data")
        .join(path);
    let content = std::fs::read_to_string(&fixture_path).ok()?;
    serde_json::from_str(&content).ok()
}

// =============================================================================
// World Fixtures
// =============================================================================

pub mod worlds {
    use super::*;

    /// Greenfall Marches (`w1`).
    ///
    /// - Tension 0.5, time "Day 1, 08:00"
    /// - Arc `arc_bandit_threat` at 0.2, faction `f_bandits` at 0.5
    /// - PC `pc_sable` (level 1, investigation +5), NPC `npc_miller`
    /// - Rumor `ev1` tagged `wilderness`, not yet threaded
    pub fn greenfall() -> WorldSeed {
        load_fixture("world.json")
    }
}

// =============================================================================
// App Construction
// =============================================================================

/// Clock start for stores built here. Later than every fixture timestamp.
pub fn test_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Store seeded with [`worlds::greenfall`], stepping one second per write.
pub async fn seeded_store() -> Arc<InMemoryStore> {
    let store = InMemoryStore::new(Arc::new(SteppingClock::starting_at(test_start())));
    store.load_seed(worlds::greenfall()).await;
    Arc::new(store)
}

/// App over a seeded store whose server-side rolls always come up `d20`.
pub async fn test_app(d20: i32) -> (Arc<InMemoryStore>, Arc<App>) {
    let store = seeded_store().await;
    let app = App::new(
        store.clone(),
        Arc::new(SteppingClock::starting_at(test_start())),
        Arc::new(FixedRandom(d20)),
    );
    (store, Arc::new(app))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greenfall_fixture_parses() {
        let seed = worlds::greenfall();
        assert_eq!(seed.worlds.len(), 1);
        assert_eq!(seed.events[0].tags, vec!["wilderness"]);
        assert!(seed.events[0].thread_id.is_none());
    }

    #[test]
    fn missing_fixture_is_none() {
        assert!(try_load_fixture::<WorldSeed>("no_such_world.json").is_none());
    }
}
