//! Use cases - User story orchestration.
//!
//! Each module orchestrates store ports and domain planners for one flow.

pub mod actions;
pub mod advisor;
pub mod apply_plan;
pub mod deltas;
pub mod threading;
pub mod tick;

pub use actions::{
    ActionError, ActionFailure, ActionOutcome, ActionStage, InvestigateInput, PressureInput,
    ResolveAction, TagMergeFailed,
};
pub use advisor::{Advisor, AdvisorError};
pub use apply_plan::{AppliedPlan, ApplyPlan, ApplyPlanError};
pub use deltas::{DeltaApplicator, DeltaError};
pub use threading::{CausalityThreader, ThreadError};
pub use tick::{AdvanceWorldTick, TickError, TickOutcome};
