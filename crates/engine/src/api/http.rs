//! HTTP routes.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;

use taleforge_domain::{ActionPlan, EntityId, Event, EventId, FactionId, WorldId};
use taleforge_shared::{
    ActionResponse, ApplyPlanResponse, ErrorResponse, EventQuery, HealthResponse,
    InvestigateRequest, PressureRequest, RecommendRequest, RecommendResponse, TickRequest,
    TickResponse,
};

use crate::app::App;
use crate::infrastructure::clock::seed_from_clock;
use crate::infrastructure::ports::{EventFilter, RepoError};
use crate::use_cases::{
    ActionError, ActionOutcome, AdvisorError, ApplyPlanError, InvestigateInput, PressureInput,
    TickError,
};

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        .route("/api/recommend", post(recommend))
        .route("/api/worlds/{world_id}/tick", post(tick))
        .route("/api/worlds/{world_id}/plans/apply", post(apply_plan))
        .route("/api/worlds/{world_id}/events", get(list_events))
        .route(
            "/api/worlds/{world_id}/events/{event_id}/investigate",
            post(investigate),
        )
        .route(
            "/api/worlds/{world_id}/events/{event_id}/pressure",
            post(pressure),
        )
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn recommend(
    State(app): State<Arc<App>>,
    body: Result<Json<RecommendRequest>, JsonRejection>,
) -> Result<Json<RecommendResponse>, ApiError> {
    let Json(request) = body?;
    let response = app.use_cases.advisor.recommend(&request).await?;
    Ok(Json(response))
}

async fn tick(
    State(app): State<Arc<App>>,
    Path(world_id): Path<String>,
    body: Result<Option<Json<TickRequest>>, JsonRejection>,
) -> Result<Json<TickResponse>, ApiError> {
    let request = body?.map(|Json(request)| request).unwrap_or_default();
    let seed = request
        .seed
        .unwrap_or_else(|| seed_from_clock(app.clock.as_ref()));

    let outcome = app
        .use_cases
        .tick
        .execute(&WorldId::from(world_id), request.hours, seed)
        .await?;

    Ok(Json(TickResponse {
        world_id: outcome.world.id.into_string(),
        hours: outcome.hours,
        time: outcome.world.time.unwrap_or_default(),
        tension: outcome.world.tension,
        rumor_event_id: outcome.rumor.map(|event| event.id.into_string()),
    }))
}

async fn apply_plan(
    State(app): State<Arc<App>>,
    Path(world_id): Path<String>,
    body: Result<Json<ActionPlan>, JsonRejection>,
) -> Result<Json<ApplyPlanResponse>, ApiError> {
    let Json(plan) = body?;
    let applied = app
        .use_cases
        .apply_plan
        .execute(&WorldId::from(world_id), plan)
        .await?;

    Ok(Json(ApplyPlanResponse {
        posted_event_ids: event_ids(applied.posted),
        applied: applied.applied,
    }))
}

async fn list_events(
    State(app): State<Arc<App>>,
    Path(world_id): Path<String>,
    query: Result<Query<EventQuery>, QueryRejection>,
) -> Result<Json<Vec<Event>>, ApiError> {
    let Query(query) = query?;
    let world_id = WorldId::from(world_id);
    if app.stores.world_state.get_world(&world_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("World not found: {}", world_id)));
    }

    // Threads read oldest first, the world feed newest first.
    let newest_first = query.newest_first.unwrap_or(query.thread_id.is_none());
    let filter = EventFilter {
        thread_id: query.thread_id.map(EventId::from),
        parent_event_id: query.parent_event_id.map(EventId::from),
        tag: query.tag,
        event_type: query.event_type,
        limit: query.limit,
        newest_first,
    };

    let events = app.stores.events.query(&world_id, filter).await?;
    Ok(Json(events))
}

async fn investigate(
    State(app): State<Arc<App>>,
    Path((world_id, event_id)): Path<(String, String)>,
    body: Result<Json<InvestigateRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(request) = body?;
    let outcome = app
        .use_cases
        .actions
        .investigate(InvestigateInput {
            world_id: WorldId::from(world_id),
            source_id: EventId::from(event_id),
            actor_id: EntityId::from(request.actor_id),
            roll: request.roll,
        })
        .await?;
    Ok(Json(action_response(outcome)))
}

async fn pressure(
    State(app): State<Arc<App>>,
    Path((world_id, event_id)): Path<(String, String)>,
    body: Result<Json<PressureRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, ApiError> {
    let Json(request) = body?;
    let modifier = request.modifier();
    let dc = request.dc();
    let outcome = app
        .use_cases
        .actions
        .pressure(PressureInput {
            world_id: WorldId::from(world_id),
            source_id: EventId::from(event_id),
            faction_id: FactionId::from(request.faction_id),
            modifier,
            dc,
            roll: request.roll,
        })
        .await?;
    Ok(Json(action_response(outcome)))
}

fn action_response(outcome: ActionOutcome) -> ActionResponse {
    ActionResponse {
        roll: outcome.roll,
        thread_id: outcome.thread_id.into_string(),
        result_event_id: outcome.result_event.id.into_string(),
        posted_event_ids: event_ids(outcome.posted),
        applied: outcome.applied,
        source_tags: outcome.source_tags,
        tag_error: outcome.tag_error.map(|e| e.to_string()),
    }
}

fn event_ids(events: Vec<Event>) -> Vec<String> {
    events.into_iter().map(|event| event.id.into_string()).collect()
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
            }
        };
        (status, Json(ErrorResponse { error })).into_response()
    }
}

// Body and query rejections answer 400 with the same JSON error shape.
impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::BadRequest(e.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        ApiError::BadRequest(e.body_text())
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            RepoError::ConstraintViolation(_) => ApiError::BadRequest(e.to_string()),
            _ => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<AdvisorError> for ApiError {
    fn from(e: AdvisorError) -> Self {
        match e {
            AdvisorError::WorldNotFound(_) => ApiError::NotFound(e.to_string()),
            AdvisorError::Repo(e) => e.into(),
        }
    }
}

impl From<TickError> for ApiError {
    fn from(e: TickError) -> Self {
        match e {
            TickError::WorldNotFound(_) => ApiError::NotFound(e.to_string()),
            TickError::Rumor(_) => ApiError::Internal(e.to_string()),
            TickError::Repo(e) => e.into(),
        }
    }
}

impl From<ApplyPlanError> for ApiError {
    fn from(e: ApplyPlanError) -> Self {
        if e.is_not_found() {
            return ApiError::NotFound(e.to_string());
        }
        match e {
            ApplyPlanError::Invalid(_)
            | ApplyPlanError::Deltas(crate::use_cases::DeltaError::Invalid(_)) => {
                ApiError::BadRequest(e.to_string())
            }
            _ => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<ActionError> for ApiError {
    fn from(e: ActionError) -> Self {
        if e.is_not_found() {
            ApiError::NotFound(e.to_string())
        } else if e.is_validation() {
            ApiError::BadRequest(e.to_string())
        } else {
            ApiError::Internal(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::test_fixtures::test_app;

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    fn get_uri(uri: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request")
    }

    async fn router() -> Router {
        let (_store, app) = test_app(10).await;
        routes().with_state(app)
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, body) = send(router().await, get_uri("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn recommend_is_deterministic_per_seed() {
        let router = router().await;
        let request = json!({ "world_id": "w1", "seed": 42 });

        let (status, first) = send(router.clone(), post_json("/api/recommend", request.clone())).await;
        assert_eq!(status, StatusCode::OK);
        let (_, second) = send(router, post_json("/api/recommend", request)).await;
        assert_eq!(first, second);
        assert!(first["summary"].is_string());
    }

    #[tokio::test]
    async fn recommend_unknown_world_is_404() {
        let (status, body) = send(
            router().await,
            post_json("/api/recommend", json!({ "world_id": "nowhere" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().is_some_and(|e| e.contains("nowhere")));
    }

    #[tokio::test]
    async fn tick_without_body_uses_one_hour() {
        let (status, body) = send(
            router().await,
            Request::builder()
                .method("POST")
                .uri("/api/worlds/w1/tick")
                .body(Body::empty())
                .expect("request"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hours"], 1);
        assert_eq!(body["time"], "Day 1, 08:00 (+1h)");
    }

    #[tokio::test]
    async fn tick_with_seed_posts_rumor() {
        let router = router().await;
        let (status, body) = send(
            router.clone(),
            post_json("/api/worlds/w1/tick", json!({ "hours": 4, "seed": 42 })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["time"], "Day 1, 08:00 (+4h)");
        let rumor_id = body["rumor_event_id"].as_str().expect("rumor id").to_string();

        let (_, events) = send(router, get_uri("/api/worlds/w1/events?tag=tick")).await;
        let events = events.as_array().expect("events");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0]["id"], rumor_id.as_str());
        assert_eq!(events[0]["thread_id"], rumor_id.as_str());
    }

    #[tokio::test]
    async fn apply_plan_posts_roots_and_applies_deltas() {
        let (status, body) = send(
            router().await,
            post_json(
                "/api/worlds/w1/plans/apply",
                json!({
                    "new_events": [{ "type": "rumor", "title": "Smoke on the ridge", "payload": {} }],
                    "updates": { "factions": [{ "id": "f_bandits", "pressure_delta": 0.1 }] }
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["posted_event_ids"].as_array().map(Vec::len), Some(1));
        assert_eq!(body["applied"]["factions"], "procedure");
        assert!(body["applied"].get("world").is_none());
    }

    #[tokio::test]
    async fn plan_for_missing_arc_is_404() {
        let (status, _) = send(
            router().await,
            post_json(
                "/api/worlds/w1/plans/apply",
                json!({ "updates": { "arcs": [{ "id": "arc_missing", "progress_delta": 0.1 }] } }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_plan_is_rejected() {
        let (status, body) = send(
            router().await,
            post_json(
                "/api/worlds/w1/plans/apply",
                json!({ "updates": { "arcs": [{ "id": "arc_bandit_threat", "progress_delta": null }] } }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn unparseable_body_gets_json_error() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/worlds/w1/events/ev1/investigate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{ not json"))
            .expect("request");
        let (status, body) = send(router().await, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn bad_event_query_gets_json_error() {
        let (status, body) = send(router().await, get_uri("/api/worlds/w1/events?limit=many")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn investigate_returns_roll_and_thread() {
        let router = router().await;
        let (status, body) = send(
            router.clone(),
            post_json(
                "/api/worlds/w1/events/ev1/investigate",
                json!({ "actor_id": "pc_sable", "roll": 20 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["d20"], 20);
        assert_eq!(body["degree"], "critical_success");
        assert_eq!(body["thread_id"], "ev1");
        assert!(body.get("tag_error").is_none());

        let (_, thread) = send(router, get_uri("/api/worlds/w1/events?thread_id=ev1")).await;
        let thread = thread.as_array().expect("thread");
        assert_eq!(thread[0]["id"], "ev1");
        assert_eq!(thread[1]["id"], body["result_event_id"]);
    }

    #[tokio::test]
    async fn investigate_out_of_range_roll_is_400() {
        let (status, body) = send(
            router().await,
            post_json(
                "/api/worlds/w1/events/ev1/investigate",
                json!({ "actor_id": "pc_sable", "roll": 21 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().is_some_and(|e| e.contains("21")));
    }

    #[tokio::test]
    async fn unknown_source_event_is_404() {
        let (status, _) = send(
            router().await,
            post_json(
                "/api/worlds/w1/events/missing/pressure",
                json!({ "faction_id": "f_bandits" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn events_of_unknown_world_is_404() {
        let (status, _) = send(router().await, get_uri("/api/worlds/nowhere/events")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn internal_errors_hide_details() {
        let response = ApiError::from(RepoError::database("query_events", "socket closed"))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
