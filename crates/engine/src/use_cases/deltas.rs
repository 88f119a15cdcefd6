//! Delta application.
//!
//! Each section of a plan's updates goes to the store's atomic procedure
//! first. When the store cannot run it, the applicator reads the current
//! value, adds the delta, clamps into `[0, 1]` and writes it back.
//!
//! Arcs and factions are scoped to the world being updated. A row owned by
//! another world counts as missing on both paths.
//!
//! The fallback is NOT isolated: two appliers that read the same row before
//! either writes will lose one of the deltas. Missing rows and rejected
//! input are never retried through the fallback.

use std::sync::Arc;

use taleforge_domain::{clamp_unit, ArcDelta, DomainError, FactionDelta, PlanUpdates, WorldId};
use taleforge_shared::{AppliedDeltas, DeltaPath};

use crate::infrastructure::ports::{
    ArcPatch, DeltaProcedures, FactionPatch, RepoError, WorldPatch, WorldStateRepo,
};

#[derive(Debug, thiserror::Error)]
pub enum DeltaError {
    #[error("Invalid deltas: {0}")]
    Invalid(#[from] DomainError),
    #[error("Failed to apply {section} deltas: {source}")]
    Apply {
        section: &'static str,
        #[source]
        source: RepoError,
    },
}

impl DeltaError {
    fn apply(section: &'static str) -> impl FnOnce(RepoError) -> Self {
        move |source| Self::Apply { section, source }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Apply { source, .. } if source.is_not_found())
    }
}

pub struct DeltaApplicator {
    procedures: Arc<dyn DeltaProcedures>,
    world_state: Arc<dyn WorldStateRepo>,
}

impl DeltaApplicator {
    pub fn new(procedures: Arc<dyn DeltaProcedures>, world_state: Arc<dyn WorldStateRepo>) -> Self {
        Self {
            procedures,
            world_state,
        }
    }

    /// Apply every present section of `updates` to `world_id`.
    ///
    /// Sections are applied world, arcs, factions. A failure leaves the
    /// sections before it applied.
    pub async fn apply(
        &self,
        world_id: &WorldId,
        updates: &PlanUpdates,
    ) -> Result<AppliedDeltas, DeltaError> {
        updates.validate()?;
        let mut applied = AppliedDeltas::default();

        if let Some(delta) = updates.world.as_ref().and_then(|w| w.tension_delta) {
            applied.world = Some(
                self.apply_world(world_id, delta)
                    .await
                    .map_err(DeltaError::apply("world"))?,
            );
        }
        if !updates.arcs.is_empty() {
            applied.arcs = Some(
                self.apply_arcs(world_id, &updates.arcs)
                    .await
                    .map_err(DeltaError::apply("arc"))?,
            );
        }
        if !updates.factions.is_empty() {
            applied.factions = Some(
                self.apply_factions(world_id, &updates.factions)
                    .await
                    .map_err(DeltaError::apply("faction"))?,
            );
        }

        tracing::info!(
            world_id = %world_id,
            world = ?applied.world,
            arcs = ?applied.arcs,
            factions = ?applied.factions,
            "Applied plan deltas"
        );
        Ok(applied)
    }

    async fn apply_world(&self, world_id: &WorldId, delta: f64) -> Result<DeltaPath, RepoError> {
        match self.procedures.apply_world_deltas(world_id, delta).await {
            Ok(()) => return Ok(DeltaPath::Procedure),
            Err(e) if e.permits_fallback() => {
                tracing::warn!(world_id = %world_id, error = %e, "World delta procedure failed, falling back");
            }
            Err(e) => return Err(e),
        }

        let world = self
            .world_state
            .get_world(world_id)
            .await?
            .ok_or_else(|| RepoError::not_found("World", world_id))?;
        let patch = WorldPatch {
            tension: Some(clamp_unit(world.tension + delta)),
            time: None,
        };
        self.world_state.update_world(world_id, patch).await?;
        Ok(DeltaPath::Fallback)
    }

    async fn apply_arcs(
        &self,
        world_id: &WorldId,
        deltas: &[ArcDelta],
    ) -> Result<DeltaPath, RepoError> {
        match self
            .procedures
            .apply_arc_progress_deltas(world_id, deltas.to_vec())
            .await
        {
            Ok(()) => return Ok(DeltaPath::Procedure),
            Err(e) if e.permits_fallback() => {
                tracing::warn!(arcs = deltas.len(), error = %e, "Arc delta procedure failed, falling back");
            }
            Err(e) => return Err(e),
        }

        for delta in deltas {
            let arc = self
                .world_state
                .get_arc(&delta.id)
                .await?
                .filter(|arc| arc.world_id == *world_id)
                .ok_or_else(|| RepoError::not_found("Arc", &delta.id))?;
            let patch = ArcPatch {
                progress: Some(clamp_unit(arc.progress + delta.progress_delta)),
            };
            self.world_state.update_arc(&delta.id, patch).await?;
        }
        Ok(DeltaPath::Fallback)
    }

    async fn apply_factions(
        &self,
        world_id: &WorldId,
        deltas: &[FactionDelta],
    ) -> Result<DeltaPath, RepoError> {
        match self
            .procedures
            .apply_faction_pressure_deltas(world_id, deltas.to_vec())
            .await
        {
            Ok(()) => return Ok(DeltaPath::Procedure),
            Err(e) if e.permits_fallback() => {
                tracing::warn!(factions = deltas.len(), error = %e, "Faction delta procedure failed, falling back");
            }
            Err(e) => return Err(e),
        }

        for delta in deltas {
            let faction = self
                .world_state
                .get_faction(&delta.id)
                .await?
                .filter(|faction| faction.world_id == *world_id)
                .ok_or_else(|| RepoError::not_found("Faction", &delta.id))?;
            let patch = FactionPatch {
                pressure: Some(clamp_unit(faction.pressure + delta.pressure_delta)),
            };
            self.world_state.update_faction(&delta.id, patch).await?;
        }
        Ok(DeltaPath::Fallback)
    }
}
