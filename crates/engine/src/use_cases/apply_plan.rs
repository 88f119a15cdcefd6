//! Apply an advisory plan to a world.

use std::sync::Arc;

use taleforge_domain::{ActionPlan, DomainError, Event, WorldId};
use taleforge_shared::AppliedDeltas;

use super::deltas::{DeltaApplicator, DeltaError};
use super::threading::{CausalityThreader, ThreadError};
use crate::infrastructure::ports::{RepoError, WorldStateRepo};

#[derive(Debug, thiserror::Error)]
pub enum ApplyPlanError {
    #[error("World not found: {0}")]
    WorldNotFound(WorldId),
    #[error("Invalid plan: {0}")]
    Invalid(#[from] DomainError),
    /// Events before the failure stay posted.
    #[error("Failed to post plan event after {posted} posted: {source}")]
    Post {
        posted: usize,
        #[source]
        source: ThreadError,
    },
    /// All events were posted; no delta section after the failure applied.
    #[error("Failed to apply plan deltas: {0}")]
    Deltas(#[source] DeltaError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl ApplyPlanError {
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::WorldNotFound(_) => true,
            Self::Post { source, .. } => source.is_not_found(),
            Self::Deltas(e) => e.is_not_found(),
            Self::Repo(e) => e.is_not_found(),
            Self::Invalid(_) => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppliedPlan {
    pub posted: Vec<Event>,
    pub applied: AppliedDeltas,
}

pub struct ApplyPlan {
    world_state: Arc<dyn WorldStateRepo>,
    threader: Arc<CausalityThreader>,
    deltas: Arc<DeltaApplicator>,
}

impl ApplyPlan {
    pub fn new(
        world_state: Arc<dyn WorldStateRepo>,
        threader: Arc<CausalityThreader>,
        deltas: Arc<DeltaApplicator>,
    ) -> Self {
        Self {
            world_state,
            threader,
            deltas,
        }
    }

    /// Post every new event as a thread root, then apply the deltas.
    ///
    /// Tag mutations and encounter suggestions are advisory and ignored.
    pub async fn execute(
        &self,
        world_id: &WorldId,
        plan: ActionPlan,
    ) -> Result<AppliedPlan, ApplyPlanError> {
        plan.validate()?;
        if self.world_state.get_world(world_id).await?.is_none() {
            return Err(ApplyPlanError::WorldNotFound(world_id.clone()));
        }

        let mut posted = Vec::with_capacity(plan.new_events.len());
        for draft in plan.new_events {
            let event = self
                .threader
                .post_draft_root(world_id, draft)
                .await
                .map_err(|source| ApplyPlanError::Post {
                    posted: posted.len(),
                    source,
                })?;
            posted.push(event);
        }

        let applied = self
            .deltas
            .apply(world_id, &plan.updates)
            .await
            .map_err(ApplyPlanError::Deltas)?;

        tracing::info!(world_id = %world_id, posted = posted.len(), "Applied plan");
        Ok(AppliedPlan { posted, applied })
    }
}
