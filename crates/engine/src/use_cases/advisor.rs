//! Advisory planning for one world tick.
//!
//! Loads a snapshot of the world and hands it to the procedural planner
//! with an explicit seed. An optional augmenter may extend the plan, but
//! only when the caller allows non-deterministic output.

use std::future::Future;
use std::sync::Arc;

use taleforge_domain::{
    merge_augmentation, plan_for_seed, PlanConstraints, Recommendation, WorldId, WorldSnapshot,
    DEFAULT_SEED,
};
use taleforge_shared::{RecommendRequest, RecommendResponse};

use crate::infrastructure::ports::{EventFilter, EventRepo, PlanAugmenter, RepoError, WorldStateRepo};

#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    #[error("World not found: {0}")]
    WorldNotFound(WorldId),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

pub struct Advisor {
    events: Arc<dyn EventRepo>,
    world_state: Arc<dyn WorldStateRepo>,
    augmenter: Option<Arc<dyn PlanAugmenter>>,
}

impl Advisor {
    pub fn new(events: Arc<dyn EventRepo>, world_state: Arc<dyn WorldStateRepo>) -> Self {
        Self {
            events,
            world_state,
            augmenter: None,
        }
    }

    pub fn with_augmenter(mut self, augmenter: Arc<dyn PlanAugmenter>) -> Self {
        self.augmenter = Some(augmenter);
        self
    }

    pub async fn recommend(
        &self,
        request: &RecommendRequest,
    ) -> Result<RecommendResponse, AdvisorError> {
        let world_id = WorldId::from(request.world_id.as_str());
        let snapshot = self.load_snapshot(&world_id, request).await?;
        let constraints = PlanConstraints {
            max_new_events: request.constraints.max_new_events,
        };
        let seed = request.seed.unwrap_or(DEFAULT_SEED);

        let mut recommendation = plan_for_seed(&snapshot, constraints, seed);
        if !request.constraints.deterministic_only {
            recommendation = self
                .augment(&snapshot, recommendation, &request.ask, constraints)
                .await;
        }

        tracing::info!(
            world_id = %world_id,
            seed,
            new_events = recommendation.plan.new_events.len(),
            encounter = recommendation.plan.encounter.is_some(),
            "Built recommendation"
        );
        Ok(RecommendResponse::from_recommendation(
            recommendation,
            request.constraints.allow_updates,
        ))
    }

    async fn load_snapshot(
        &self,
        world_id: &WorldId,
        request: &RecommendRequest,
    ) -> Result<WorldSnapshot, AdvisorError> {
        let world = self
            .world_state
            .get_world(world_id)
            .await?
            .ok_or_else(|| AdvisorError::WorldNotFound(world_id.clone()))?;

        let include = &request.include;
        let mut snapshot = WorldSnapshot::new(world);
        if include.recent_events > 0 {
            snapshot.recent_events = optional_section(
                "recent_events",
                world_id,
                self.events
                    .query(world_id, EventFilter::recent(include.recent_events)),
            )
            .await;
        }
        if include.party {
            snapshot.party =
                optional_section("party", world_id, self.world_state.list_party(world_id)).await;
        }
        if include.arcs {
            snapshot.arcs =
                optional_section("arcs", world_id, self.world_state.list_arcs(world_id)).await;
        }
        if include.factions {
            snapshot.factions =
                optional_section("factions", world_id, self.world_state.list_factions(world_id))
                    .await;
        }
        Ok(snapshot)
    }

    async fn augment(
        &self,
        snapshot: &WorldSnapshot,
        baseline: Recommendation,
        ask: &str,
        constraints: PlanConstraints,
    ) -> Recommendation {
        let Some(augmenter) = &self.augmenter else {
            return baseline;
        };
        match augmenter.augment(snapshot, &baseline, ask).await {
            Ok(Some(extra)) => merge_augmentation(baseline, extra, constraints),
            Ok(None) => baseline,
            Err(e) => {
                tracing::warn!(world_id = %snapshot.world.id, error = %e, "Plan augmentation failed, using baseline");
                baseline
            }
        }
    }
}

/// A snapshot section that may fail to load without failing the request.
async fn optional_section<T>(
    section: &'static str,
    world_id: &WorldId,
    load: impl Future<Output = Result<Vec<T>, RepoError>>,
) -> Vec<T> {
    match load.await {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(world_id = %world_id, section, error = %e, "Snapshot section unavailable");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ports::{AugmentError, MockEventRepo, MockPlanAugmenter, MockWorldStateRepo};
    use taleforge_domain::{
        ActionPlan, EventDraft, EventPayload, Faction, FactionId, World,
    };

    fn world() -> World {
        World::new(WorldId::from("w1")).with_tension(0.7)
    }

    fn world_state() -> MockWorldStateRepo {
        let mut repo = MockWorldStateRepo::new();
        repo.expect_get_world().returning(|_| Ok(Some(world())));
        repo.expect_list_party().returning(|_| Ok(Vec::new()));
        repo.expect_list_arcs().returning(|_| Ok(Vec::new()));
        repo.expect_list_factions().returning(|id| {
            Ok(vec![Faction::new(FactionId::from("f_bandits"), id.clone(), "Bandits")])
        });
        repo
    }

    fn quiet_events() -> MockEventRepo {
        let mut repo = MockEventRepo::new();
        repo.expect_query().returning(|_, _| Ok(Vec::new()));
        repo
    }

    #[tokio::test]
    async fn same_seed_same_plan() {
        let advisor = Advisor::new(Arc::new(quiet_events()), Arc::new(world_state()));
        let request = RecommendRequest::new("w1").with_seed(1234);

        let first = advisor.recommend(&request).await.expect("recommend");
        let second = advisor.recommend(&request).await.expect("recommend");
        assert_eq!(
            serde_json::to_string(&first).expect("encode"),
            serde_json::to_string(&second).expect("encode")
        );
        // Quiet feed always gets a rumor.
        assert!(first
            .new_events
            .iter()
            .any(|e| e.event_type() == "rumor"));
    }

    #[tokio::test]
    async fn missing_world_is_not_found() {
        let mut repo = MockWorldStateRepo::new();
        repo.expect_get_world().returning(|_| Ok(None));
        let advisor = Advisor::new(Arc::new(quiet_events()), Arc::new(repo));

        let err = advisor
            .recommend(&RecommendRequest::new("nowhere"))
            .await
            .expect_err("no world");
        assert!(matches!(err, AdvisorError::WorldNotFound(_)));
    }

    #[tokio::test]
    async fn failing_sections_load_as_empty() {
        let mut repo = MockWorldStateRepo::new();
        repo.expect_get_world().returning(|_| Ok(Some(world())));
        repo.expect_list_party()
            .returning(|_| Err(RepoError::database("list_party", "timeout")));
        repo.expect_list_arcs()
            .returning(|_| Err(RepoError::database("list_arcs", "timeout")));
        repo.expect_list_factions()
            .returning(|_| Err(RepoError::database("list_factions", "timeout")));
        let mut events = MockEventRepo::new();
        events
            .expect_query()
            .returning(|_, _| Err(RepoError::database("query_events", "timeout")));

        let advisor = Advisor::new(Arc::new(events), Arc::new(repo));
        let response = advisor
            .recommend(&RecommendRequest::new("w1"))
            .await
            .expect("recommend");
        assert!(!response.new_events.is_empty());
    }

    #[tokio::test]
    async fn excluded_sections_are_not_loaded() {
        let mut repo = MockWorldStateRepo::new();
        repo.expect_get_world().returning(|_| Ok(Some(world())));
        repo.expect_list_party().times(0);
        repo.expect_list_arcs().times(0);
        repo.expect_list_factions().times(0);
        let mut events = MockEventRepo::new();
        events.expect_query().times(0);

        let mut request = RecommendRequest::new("w1");
        request.include.recent_events = 0;
        request.include.party = false;
        request.include.arcs = false;
        request.include.factions = false;

        let advisor = Advisor::new(Arc::new(events), Arc::new(repo));
        advisor.recommend(&request).await.expect("recommend");
    }

    #[tokio::test]
    async fn disallowed_updates_are_withheld() {
        let advisor = Advisor::new(Arc::new(quiet_events()), Arc::new(world_state()));
        let mut request = RecommendRequest::new("w1");
        request.constraints.allow_updates = false;

        let response = advisor.recommend(&request).await.expect("recommend");
        assert!(response.updates.is_none());
    }

    fn augmentation() -> Recommendation {
        Recommendation {
            summary: String::new(),
            plan: ActionPlan {
                new_events: vec![EventDraft::new(EventPayload::unknown("omen"), "Omen", 1)],
                ..ActionPlan::default()
            },
            notes: vec!["augmented".into()],
        }
    }

    #[tokio::test]
    async fn deterministic_requests_never_consult_the_augmenter() {
        let mut augmenter = MockPlanAugmenter::new();
        augmenter.expect_augment().times(0);
        let advisor = Advisor::new(Arc::new(quiet_events()), Arc::new(world_state()))
            .with_augmenter(Arc::new(augmenter));

        let response = advisor
            .recommend(&RecommendRequest::new("w1"))
            .await
            .expect("recommend");
        assert!(!response.notes.contains(&"augmented".to_string()));
    }

    #[tokio::test]
    async fn augmentation_is_merged_when_allowed() {
        let mut augmenter = MockPlanAugmenter::new();
        augmenter
            .expect_augment()
            .times(1)
            .returning(|_, _, _| Ok(Some(augmentation())));
        let advisor = Advisor::new(Arc::new(quiet_events()), Arc::new(world_state()))
            .with_augmenter(Arc::new(augmenter));

        let mut request = RecommendRequest::new("w1");
        request.constraints.deterministic_only = false;
        request.constraints.max_new_events = 10;

        let response = advisor.recommend(&request).await.expect("recommend");
        assert!(response.notes.contains(&"augmented".to_string()));
        assert_eq!(
            response.new_events.last().map(|e| e.event_type()),
            Some("omen")
        );
    }

    #[tokio::test]
    async fn augmenter_failure_keeps_the_baseline() {
        let mut augmenter = MockPlanAugmenter::new();
        augmenter
            .expect_augment()
            .returning(|_, _, _| Err(AugmentError::RequestFailed("offline".into())));
        let advisor = Advisor::new(Arc::new(quiet_events()), Arc::new(world_state()))
            .with_augmenter(Arc::new(augmenter));

        let mut request = RecommendRequest::new("w1").with_seed(7);
        request.constraints.deterministic_only = false;
        let augmented = advisor.recommend(&request).await.expect("recommend");

        request.constraints.deterministic_only = true;
        let baseline = advisor.recommend(&request).await.expect("recommend");
        assert_eq!(augmented, baseline);
    }
}
