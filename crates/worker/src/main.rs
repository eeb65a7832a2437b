use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use stockpick_core::cache::{ttl_from_env, StockDetailsCache};
use stockpick_core::market::HttpJsonMarketData;
use stockpick_core::recommend::{EngineOptions, RecommendationEngine};
use stockpick_core::storage::lock::WarmLock;
use stockpick_core::storage::warm_runs::{WarmRun, WarmStatus};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod universe;
mod warm;

#[derive(Debug, Parser)]
#[command(name = "stockpick_worker")]
struct Args {
    /// Market as-of date (YYYY-MM-DD). Defaults to the latest closed US market date.
    #[arg(long)]
    as_of_date: Option<String>,

    /// Resolve the catalog and exit without fetching anything.
    #[arg(long)]
    dry_run: bool,

    /// Comma-separated sector slugs (default: all).
    #[arg(long)]
    sectors: Option<String>,

    /// Comma-separated investment types (default: all).
    #[arg(long)]
    types: Option<String>,
}

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

    let args = Args::parse();

    let as_of_date = stockpick_core::time::us_market::resolve_as_of_date(
        args.as_of_date.as_deref(),
        chrono::Utc::now(),
    )?;
    let sectors = universe::parse_sectors(args.sectors.as_deref())?;
    let types = universe::parse_types(args.types.as_deref())?;
    let symbols = universe::build_universe(&sectors, &types);

    if args.dry_run {
        tracing::info!(
            %as_of_date,
            dry_run = true,
            sectors = sectors.len(),
            types = types.len(),
            symbols = symbols.len(),
            "cache warm (dry-run)"
        );
        return Ok(());
    }

    let provider = HttpJsonMarketData::from_settings(&settings)?;
    let cache = StockDetailsCache::open(&settings.cache_dir)
        .await?
        .with_ttl(ttl_from_env());
    let engine = RecommendationEngine::new(Arc::new(provider), Some(cache), EngineOptions::from_env());

    let db = match settings.database_url.as_deref() {
        Some(db_url) => {
            let pool = sqlx::postgres::PgPoolOptions::new()
                .max_connections(2)
                .connect(db_url)
                .await
                .context("connect DATABASE_URL failed")?;
            stockpick_core::storage::migrate(&pool).await?;

            let Some(lock) = WarmLock::try_acquire(&pool, as_of_date).await? else {
                tracing::warn!(%as_of_date, "warm lock not acquired; another run in progress");
                return Ok(());
            };
            tracing::debug!(%as_of_date, key = lock.key(), "warm lock acquired");
            Some((pool, lock))
        }
        None => {
            tracing::info!("DATABASE_URL not set; run will not be recorded");
            None
        }
    };

    tracing::info!(%as_of_date, symbols = symbols.len(), "cache warm started");
    let opts = universe::WarmOptions::from_env();
    let report = warm::warm_cache(&engine, &symbols, &opts).await;

    let error = (report.total > 0 && report.cached == 0)
        .then(|| format!("no symbols could be fetched ({} attempted)", report.total));
    match &error {
        Some(msg) => {
            let err = anyhow::anyhow!("{msg}");
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(%as_of_date, error = %err, "cache warm failed");
        }
        None => tracing::info!(
            %as_of_date,
            total = report.total,
            cached = report.cached,
            failed = report.failed.len(),
            "cache warm finished"
        ),
    }
    if !report.failed.is_empty() {
        tracing::debug!(failed = ?report.failed, "symbols without data");
    }

    if let Some((pool, lock)) = db {
        let run = WarmRun {
            as_of_date,
            provider: engine.provider_name(),
            status: if error.is_some() {
                WarmStatus::Error
            } else {
                WarmStatus::Success
            },
            symbols_total: report.total,
            symbols_cached: report.cached,
            error: error.as_deref(),
        };
        let recorded = stockpick_core::storage::warm_runs::record_warm_run(&pool, &run).await;
        if let Err(e) = lock.release().await {
            tracing::warn!(%as_of_date, error = %e, "failed to release warm lock");
        }
        let run_id = recorded?;
        tracing::info!(%as_of_date, %run_id, "cache warm run recorded");
    }

    Ok(())
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
