//! Taleforge Shared - wire contracts for the engine's HTTP surface
//!
//! Pure data types. Plan, event and degree vocabulary comes from
//! `taleforge-domain` so both sides agree on the JSON shapes.

pub mod requests;
pub mod responses;

pub use requests::{
    EventQuery, IncludeOptions, InvestigateRequest, PressureRequest, RecommendConstraints,
    RecommendRequest, TickRequest, DEFAULT_ASK, DEFAULT_PRESSURE_DC, DEFAULT_PRESSURE_MODIFIER,
};
pub use responses::{
    ActionResponse, AppliedDeltas, ApplyPlanResponse, DeltaPath, ErrorResponse, HealthResponse,
    RecommendResponse, TickResponse,
};
