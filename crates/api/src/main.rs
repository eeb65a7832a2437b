mod handlers;
mod session;
mod views;

use axum::{
    routing::get,
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use stockpick_core::analytics::forecast::ForecastConfig;
use stockpick_core::cache::{ttl_from_env, StockDetailsCache};
use stockpick_core::config::env_or;
use stockpick_core::market::HttpJsonMarketData;
use stockpick_core::recommend::{EngineOptions, RecommendationEngine};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::session::SessionStore;

const DEFAULT_SESSION_TTL_MINUTES: u64 = 120;
const SESSION_SWEEP_SECS: u64 = 300;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = stockpick_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let provider = HttpJsonMarketData::from_settings(&settings)?;
    let cache = match StockDetailsCache::open(&settings.cache_dir).await {
        Ok(cache) => Some(cache.with_ttl(ttl_from_env())),
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "cache dir unavailable; stock details will not be cached");
            None
        }
    };
    let opts = EngineOptions::from_env();
    tracing::info!(
        limit = opts.limit,
        concurrency = opts.concurrency,
        cache_dir = %settings.cache_dir,
        "recommendation engine configured"
    );

    let pool: Option<PgPool> = match settings.require_database_url() {
        Ok(db_url) => match sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await
        {
            Ok(pool) => match stockpick_core::storage::migrate(&pool).await {
                Ok(()) => Some(pool),
                Err(e) => {
                    sentry_anyhow::capture_anyhow(&e);
                    tracing::error!(error = %e, "db migrations failed; starting in degraded mode");
                    None
                }
            },
            Err(e) => {
                let err = anyhow::Error::new(e);
                sentry_anyhow::capture_anyhow(&err);
                tracing::error!(error = %err, "db connect failed; starting in degraded mode");
                None
            }
        },
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "DATABASE_URL missing; starting in degraded mode");
            None
        }
    };

    let sessions = SessionStore::new();
    let session_ttl_minutes = env_or("SESSION_TTL_MINUTES", DEFAULT_SESSION_TTL_MINUTES);
    sessions.spawn_sweeper(
        Duration::from_secs(session_ttl_minutes * 60),
        Duration::from_secs(SESSION_SWEEP_SECS),
    );

    let state = AppState {
        engine: Arc::new(RecommendationEngine::new(Arc::new(provider), cache, opts)),
        sessions,
        pool,
        forecast: ForecastConfig::from_env(),
    };

    let app = router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "web server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) engine: Arc<RecommendationEngine>,
    pub(crate) sessions: SessionStore,
    pub(crate) pool: Option<PgPool>,
    pub(crate) forecast: ForecastConfig,
}

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index).post(handlers::submit_profile))
        .route("/recommendations", get(handlers::recommendations))
        .route("/shuffle", get(handlers::shuffle))
        .route("/projections/:symbol", get(handlers::projections))
        .route("/healthz", get(healthz))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &stockpick_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
