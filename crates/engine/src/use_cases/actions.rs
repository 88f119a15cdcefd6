//! Interactive actions: investigate a rumor, pressure a faction move.
//!
//! Both run the same chain against a source event:
//!
//! `idle -> rolling -> resolved -> planned -> posted -> applied -> tagged -> done`
//!
//! Every step performs its own store write and is not rolled back when a
//! later step fails. The error names the step that failed. Tagging the
//! source is cosmetic: its failure is logged and reported on the outcome,
//! never raised.

use std::fmt;
use std::sync::Arc;

use taleforge_domain::{
    event_types, level_dc, merge_tags, plan_from_outcome, CheckResultPayload, CheckRoll,
    DomainError, EntityId, Event, EventDraft, EventId, EventPayload, FactionId, PayloadMap,
    TagMutation, WorldId, D20_FACES,
};
use taleforge_shared::AppliedDeltas;

use super::deltas::{DeltaApplicator, DeltaError};
use super::threading::{CausalityThreader, ThreadError};
use crate::infrastructure::ports::{EventPatch, EventRepo, RandomPort, RepoError, WorldStateRepo};

/// Priority of logged check results.
const RESULT_PRIORITY: i32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionStage {
    Idle,
    Rolling,
    Resolved,
    Planned,
    Posted,
    Applied,
    Tagged,
    Done,
    Failed,
}

impl ActionStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Rolling => "rolling",
            Self::Resolved => "resolved",
            Self::Planned => "planned",
            Self::Posted => "posted",
            Self::Applied => "applied",
            Self::Tagged => "tagged",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ActionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ActionFailure {
    #[error("Source event not found: {0}")]
    SourceNotFound(EventId),
    #[error("Actor not found: {0}")]
    ActorNotFound(EntityId),
    #[error("Faction not found: {0}")]
    FactionNotFound(FactionId),
    #[error("Roll must be between 1 and {max}, got {roll}")]
    InvalidRoll { roll: i32, max: i32 },
    #[error(transparent)]
    Invalid(#[from] DomainError),
    #[error(transparent)]
    Thread(#[from] ThreadError),
    #[error(transparent)]
    Deltas(#[from] DeltaError),
    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// An action that stopped before `done`.
///
/// `stage` is the state the chain was moving into when it failed. Effects
/// of the states before it are kept.
#[derive(Debug, thiserror::Error)]
#[error("Action failed entering {stage}: {source}")]
pub struct ActionError {
    pub stage: ActionStage,
    #[source]
    pub source: ActionFailure,
}

impl ActionError {
    fn at<E: Into<ActionFailure>>(stage: ActionStage) -> impl FnOnce(E) -> Self {
        move |source| Self {
            stage,
            source: source.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        match &self.source {
            ActionFailure::SourceNotFound(_)
            | ActionFailure::ActorNotFound(_)
            | ActionFailure::FactionNotFound(_) => true,
            ActionFailure::Thread(e) => e.is_not_found(),
            ActionFailure::Deltas(e) => e.is_not_found(),
            ActionFailure::Repo(e) => e.is_not_found(),
            ActionFailure::InvalidRoll { .. } | ActionFailure::Invalid(_) => false,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self.source,
            ActionFailure::InvalidRoll { .. }
                | ActionFailure::Invalid(_)
                | ActionFailure::Deltas(DeltaError::Invalid(_))
        )
    }
}

/// Merging the plan's tags into the source failed. Not fatal.
#[derive(Debug, Clone, thiserror::Error)]
#[error("Failed to merge tags into {event_id}: {reason}")]
pub struct TagMergeFailed {
    pub event_id: EventId,
    pub reason: String,
}

/// A completed action.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub roll: CheckRoll,
    pub thread_id: EventId,
    pub result_event: Event,
    pub posted: Vec<Event>,
    pub applied: AppliedDeltas,
    pub source_tags: Vec<String>,
    pub tag_error: Option<TagMergeFailed>,
}

/// Investigate a rumor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvestigateInput {
    pub world_id: WorldId,
    pub source_id: EventId,
    pub actor_id: EntityId,
    /// Natural d20. Rolled when absent.
    pub roll: Option<i32>,
}

/// Pressure a faction move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PressureInput {
    pub world_id: WorldId,
    pub source_id: EventId,
    pub faction_id: FactionId,
    pub modifier: i32,
    pub dc: i32,
    pub roll: Option<i32>,
}

/// What the chain needs to know about a particular kind of check.
struct CheckSetup {
    modifier: i32,
    dc: i32,
    roll: Option<i32>,
    /// Type the source is read as when it was stored untyped.
    source_kind: &'static str,
    title: String,
    tags: &'static [&'static str],
    result: fn(CheckResultPayload) -> EventPayload,
    actor: Option<String>,
    faction_id: Option<FactionId>,
}

pub struct ResolveAction {
    events: Arc<dyn EventRepo>,
    world_state: Arc<dyn WorldStateRepo>,
    threader: Arc<CausalityThreader>,
    deltas: Arc<DeltaApplicator>,
    random: Arc<dyn RandomPort>,
}

impl ResolveAction {
    pub fn new(
        events: Arc<dyn EventRepo>,
        world_state: Arc<dyn WorldStateRepo>,
        threader: Arc<CausalityThreader>,
        deltas: Arc<DeltaApplicator>,
        random: Arc<dyn RandomPort>,
    ) -> Self {
        Self {
            events,
            world_state,
            threader,
            deltas,
            random,
        }
    }

    /// Investigation check: DC from the actor's level, modifier from the
    /// actor's investigation, perception or wisdom.
    pub async fn investigate(&self, input: InvestigateInput) -> Result<ActionOutcome, ActionError> {
        let source = self
            .load_source(&input.world_id, &input.source_id)
            .await
            .map_err(ActionError::at(ActionStage::Idle))?;
        let actor = self
            .world_state
            .get_entity(&input.actor_id)
            .await
            .map_err(ActionError::at(ActionStage::Idle))?
            .filter(|actor| actor.world_id == input.world_id)
            .ok_or_else(|| ActionError {
                stage: ActionStage::Idle,
                source: ActionFailure::ActorNotFound(input.actor_id.clone()),
            })?;

        let setup = CheckSetup {
            modifier: actor.investigation_modifier(),
            dc: level_dc(actor.level()),
            roll: input.roll,
            source_kind: event_types::RUMOR,
            title: format!("Investigate: {}", source.title.as_deref().unwrap_or("Rumor")),
            tags: &["investigate", "skill", "rumor"],
            result: EventPayload::SkillResult,
            actor: Some(actor.display_name().to_string()),
            faction_id: None,
        };
        self.run(source, setup).await
    }

    /// Pressure check with a caller-supplied modifier and DC.
    pub async fn pressure(&self, input: PressureInput) -> Result<ActionOutcome, ActionError> {
        let source = self
            .load_source(&input.world_id, &input.source_id)
            .await
            .map_err(ActionError::at(ActionStage::Idle))?;
        let faction_known = self
            .world_state
            .get_faction(&input.faction_id)
            .await
            .map_err(ActionError::at(ActionStage::Idle))?
            .is_some_and(|faction| faction.world_id == input.world_id);
        if !faction_known {
            return Err(ActionError {
                stage: ActionStage::Idle,
                source: ActionFailure::FactionNotFound(input.faction_id),
            });
        }

        let setup = CheckSetup {
            modifier: input.modifier,
            dc: input.dc,
            roll: input.roll,
            source_kind: event_types::FACTION_MOVE,
            title: format!("Pressure {}", source.title.as_deref().unwrap_or("Faction Move")),
            tags: &["faction", "negotiation"],
            result: EventPayload::FactionPressureResult,
            actor: None,
            faction_id: Some(input.faction_id),
        };
        self.run(source, setup).await
    }

    async fn load_source(
        &self,
        world_id: &WorldId,
        source_id: &EventId,
    ) -> Result<Event, ActionFailure> {
        self.events
            .get(source_id)
            .await?
            .filter(|event| event.world_id == *world_id)
            .ok_or_else(|| ActionFailure::SourceNotFound(source_id.clone()))
    }

    async fn run(&self, mut source: Event, setup: CheckSetup) -> Result<ActionOutcome, ActionError> {
        // Rejected before anything is written.
        if let Some(roll) = setup.roll {
            if !CheckRoll::is_natural_roll(roll) {
                return Err(ActionError {
                    stage: ActionStage::Idle,
                    source: ActionFailure::InvalidRoll {
                        roll,
                        max: D20_FACES,
                    },
                });
            }
        }
        let planning_source = Event {
            payload: source
                .payload
                .clone()
                .retyped(setup.source_kind)
                .map_err(ActionError::at(ActionStage::Idle))?,
            ..source.clone()
        };
        let world_id = source.world_id.clone();

        // idle -> rolling
        let thread_id = self
            .threader
            .ensure_thread(&source)
            .await
            .map_err(ActionError::at(ActionStage::Rolling))?;
        source.thread_id = Some(thread_id.clone());

        // rolling -> resolved
        let d20 = setup
            .roll
            .unwrap_or_else(|| self.random.gen_range(1, D20_FACES));
        let roll = CheckRoll::resolve(d20, setup.modifier, setup.dc);
        tracing::info!(
            world_id = %world_id,
            source_event_id = %source.id,
            d20 = roll.d20,
            modifier = roll.modifier,
            total = roll.total,
            dc = roll.dc,
            degree = %roll.degree,
            "Resolved check"
        );

        // resolved -> planned
        let payload = (setup.result)(CheckResultPayload {
            actor: setup.actor,
            d20: roll.d20,
            modifier: roll.modifier,
            total: roll.total,
            dc: roll.dc,
            degree: roll.degree,
            source_event_id: source.id.clone(),
            faction_id: setup.faction_id,
            extra: PayloadMap::new(),
        });
        let draft = EventDraft::new(payload, setup.title, RESULT_PRIORITY)
            .with_tags(setup.tags.iter().copied());
        let result_event = self
            .threader
            .post_child(&source, draft)
            .await
            .map_err(ActionError::at(ActionStage::Planned))?;
        let plan = plan_from_outcome(&planning_source, roll.degree);

        // planned -> posted
        let mut posted = Vec::with_capacity(plan.new_events.len());
        for draft in plan.new_events {
            let event = self
                .threader
                .post_child(&result_event, draft)
                .await
                .map_err(ActionError::at(ActionStage::Posted))?;
            posted.push(event);
        }

        // posted -> applied
        let applied = self
            .deltas
            .apply(&world_id, &plan.updates)
            .await
            .map_err(ActionError::at(ActionStage::Applied))?;

        // applied -> tagged
        let (source_tags, tag_error) = match plan.mutate {
            Some(mutation) => match self.merge_source_tags(&mutation).await {
                Ok(tags) => (tags, None),
                Err(failure) => {
                    tracing::warn!(
                        event_id = %failure.event_id,
                        reason = %failure.reason,
                        "Tag merge failed, continuing"
                    );
                    (source.tags.clone(), Some(failure))
                }
            },
            None => (source.tags.clone(), None),
        };

        // tagged -> done
        tracing::info!(
            world_id = %world_id,
            source_event_id = %source.id,
            thread_id = %thread_id,
            result_event_id = %result_event.id,
            posted = posted.len(),
            degree = %roll.degree,
            "Action complete"
        );
        Ok(ActionOutcome {
            roll,
            thread_id,
            result_event,
            posted,
            applied,
            source_tags,
            tag_error,
        })
    }

    /// Union the mutation's tags into the stored tags, re-read so that
    /// tags written since the source was loaded survive.
    async fn merge_source_tags(&self, mutation: &TagMutation) -> Result<Vec<String>, TagMergeFailed> {
        let failed = |reason: String| TagMergeFailed {
            event_id: mutation.source_event_id.clone(),
            reason,
        };
        let current = self
            .events
            .get(&mutation.source_event_id)
            .await
            .map_err(|e| failed(e.to_string()))?
            .ok_or_else(|| failed("event no longer exists".to_string()))?;
        let tags = merge_tags(&current.tags, &mutation.add_tags, &mutation.remove_tags);
        let updated = self
            .events
            .update(&mutation.source_event_id, EventPatch::tags(tags))
            .await
            .map_err(|e| failed(e.to_string()))?;
        Ok(updated.tags)
    }
}
