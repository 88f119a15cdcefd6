//! Request bodies and query strings accepted by the engine's HTTP surface.

mod actions;
mod events;
mod recommend;
mod tick;

pub use actions::{InvestigateRequest, PressureRequest, DEFAULT_PRESSURE_DC, DEFAULT_PRESSURE_MODIFIER};
pub use events::EventQuery;
pub use recommend::{IncludeOptions, RecommendConstraints, RecommendRequest, DEFAULT_ASK};
pub use tick::TickRequest;

fn default_true() -> bool {
    true
}
