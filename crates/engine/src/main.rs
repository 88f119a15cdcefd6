//! Taleforge Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use taleforge_engine::api;
use taleforge_engine::infrastructure::{
    clock::{SystemClock, SystemRandom},
    memory::{InMemoryStore, WorldSeed},
    ports::{ChangeFeedPort, ChangeScope, ChangeTable, ClockPort},
};
use taleforge_engine::{App, EngineConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the engine usually runs from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taleforge_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Taleforge Engine");

    let config = EngineConfig::from_env();
    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());

    let store = Arc::new(
        InMemoryStore::new(clock.clone()).with_procedures(config.store_procedures),
    );
    if !config.store_procedures {
        tracing::warn!("Store procedures disabled, deltas will use read-modify-write");
    }

    if let Some(path) = &config.world_seed_path {
        tracing::info!(path = %path.display(), "Loading world seed");
        let seed = WorldSeed::load(path).await?;
        store.load_seed(seed).await;
    }

    spawn_change_log(store.as_ref());

    let app = Arc::new(App::new(store, clock, Arc::new(SystemRandom::new())));

    let mut router = api::http::routes()
        .with_state(app)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = build_cors_layer(config.cors_allowed_origins.as_deref()) {
        router = router.layer(cors);
    }

    // Start server
    let addr: SocketAddr = config.bind_address().parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

/// Log every committed write at debug level.
fn spawn_change_log(feed: &dyn ChangeFeedPort) {
    for table in [
        ChangeTable::Events,
        ChangeTable::Worlds,
        ChangeTable::Arcs,
        ChangeTable::Factions,
    ] {
        let mut subscription = feed.subscribe(ChangeScope::table(table));
        tokio::spawn(async move {
            while let Some(notice) = subscription.recv().await {
                tracing::debug!(
                    table = ?notice.table,
                    world_id = %notice.world_id,
                    row_id = %notice.row_id,
                    kind = ?notice.kind,
                    "Store change"
                );
            }
        });
    }
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn build_cors_layer(allowed_origins: Option<&str>) -> Option<CorsLayer> {
    let allowed_origins = allowed_origins?;

    let mut cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    if allowed_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            return None;
        }

        cors = cors.allow_origin(origins);
    }

    Some(cors)
}
