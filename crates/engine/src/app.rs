//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::ports::{
    ChangeFeedPort, ClockPort, DeltaProcedures, EventRepo, RandomPort, WorldStateRepo,
};
use crate::use_cases::{
    AdvanceWorldTick, Advisor, ApplyPlan, CausalityThreader, DeltaApplicator, ResolveAction,
};

/// Main application state.
///
/// Holds the store ports and use cases.
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub stores: Stores,
    pub use_cases: UseCases,
    pub clock: Arc<dyn ClockPort>,
}

/// Store ports. One adapter usually backs all of them.
pub struct Stores {
    pub events: Arc<dyn EventRepo>,
    pub world_state: Arc<dyn WorldStateRepo>,
    pub changes: Arc<dyn ChangeFeedPort>,
}

/// Container for all use cases.
pub struct UseCases {
    pub threader: Arc<CausalityThreader>,
    pub deltas: Arc<DeltaApplicator>,
    pub actions: Arc<ResolveAction>,
    pub advisor: Arc<Advisor>,
    pub apply_plan: Arc<ApplyPlan>,
    pub tick: Arc<AdvanceWorldTick>,
}

impl App {
    /// Wire every use case against one store adapter.
    pub fn new<S>(store: Arc<S>, clock: Arc<dyn ClockPort>, random: Arc<dyn RandomPort>) -> Self
    where
        S: EventRepo + WorldStateRepo + DeltaProcedures + ChangeFeedPort + 'static,
    {
        let events: Arc<dyn EventRepo> = store.clone();
        let world_state: Arc<dyn WorldStateRepo> = store.clone();
        let procedures: Arc<dyn DeltaProcedures> = store.clone();
        let changes: Arc<dyn ChangeFeedPort> = store;

        let threader = Arc::new(CausalityThreader::new(events.clone()));
        let deltas = Arc::new(DeltaApplicator::new(procedures, world_state.clone()));
        let actions = Arc::new(ResolveAction::new(
            events.clone(),
            world_state.clone(),
            threader.clone(),
            deltas.clone(),
            random,
        ));
        let advisor = Arc::new(Advisor::new(events.clone(), world_state.clone()));
        let apply_plan = Arc::new(ApplyPlan::new(
            world_state.clone(),
            threader.clone(),
            deltas.clone(),
        ));
        let tick = Arc::new(AdvanceWorldTick::new(world_state.clone(), threader.clone()));

        Self {
            stores: Stores {
                events,
                world_state,
                changes,
            },
            use_cases: UseCases {
                threader,
                deltas,
                actions,
                advisor,
                apply_plan,
                tick,
            },
            clock,
        }
    }
}
