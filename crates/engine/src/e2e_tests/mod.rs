//! End-to-end flows through the HTTP router.
//!
//! Every test builds a fresh app over the in-memory store seeded from
//! `test_data/world.json` and drives it with `tower::ServiceExt::oneshot`.
//!
//! ```bash
//! cargo test -p taleforge-engine --lib e2e_tests
//! ```

mod e2e_helpers;

pub use e2e_helpers::*;
