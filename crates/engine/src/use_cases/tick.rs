//! World tick: advance the clock label and let tension drift.

use std::sync::Arc;

use taleforge_domain::{
    clamp_unit, Event, EventPayload, LcgRng, NewEvent, PlanRng, RumorPayload, World, WorldId,
};

use super::threading::{CausalityThreader, ThreadError};
use crate::infrastructure::ports::{RepoError, WorldPatch, WorldStateRepo};

/// Time label for a world that has none yet.
const START_TIME: &str = "Day 1, 00:00";

/// Widest tension drift per tick, centred on zero.
const DRIFT_SPAN: f64 = 0.05;

/// Below this tension a tick seeds a market rumor.
const RUMOR_TENSION_CEILING: f64 = 0.6;

const RUMOR_PRIORITY: i32 = 2;

#[derive(Debug, thiserror::Error)]
pub enum TickError {
    #[error("World not found: {0}")]
    WorldNotFound(WorldId),
    #[error("Failed to post tick rumor: {0}")]
    Rumor(#[from] ThreadError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub world: World,
    pub hours: u32,
    pub rumor: Option<Event>,
}

pub struct AdvanceWorldTick {
    world_state: Arc<dyn WorldStateRepo>,
    threader: Arc<CausalityThreader>,
}

impl AdvanceWorldTick {
    pub fn new(world_state: Arc<dyn WorldStateRepo>, threader: Arc<CausalityThreader>) -> Self {
        Self {
            world_state,
            threader,
        }
    }

    pub async fn execute(
        &self,
        world_id: &WorldId,
        hours: u32,
        seed: i64,
    ) -> Result<TickOutcome, TickError> {
        let world = self
            .world_state
            .get_world(world_id)
            .await?
            .ok_or_else(|| TickError::WorldNotFound(world_id.clone()))?;

        let time = format!(
            "{} (+{}h)",
            world.time.as_deref().unwrap_or(START_TIME),
            hours
        );
        let drift = (LcgRng::new(seed).next_f64() - 0.5) * DRIFT_SPAN;
        let tension = clamp_unit(world.tension + drift);

        let world = self
            .world_state
            .update_world(
                world_id,
                WorldPatch {
                    tension: Some(tension),
                    time: Some(time),
                },
            )
            .await?;

        let rumor = if tension < RUMOR_TENSION_CEILING {
            Some(self.threader.post_root(market_rumor(world_id)).await?)
        } else {
            None
        };

        tracing::info!(
            world_id = %world_id,
            hours,
            seed,
            tension,
            rumor = rumor.is_some(),
            "Advanced world tick"
        );
        Ok(TickOutcome {
            world,
            hours,
            rumor,
        })
    }
}

fn market_rumor(world_id: &WorldId) -> NewEvent {
    let mut payload = RumorPayload {
        content: Some("Supplies are thinner than they look.".into()),
        ..RumorPayload::default()
    };
    payload.extra.insert("source".into(), "tick".into());
    NewEvent::new(world_id.clone(), EventPayload::Rumor(payload))
        .with_title("Market whispers")
        .with_priority(RUMOR_PRIORITY)
        .with_tags(["tick", "rumor"])
}
