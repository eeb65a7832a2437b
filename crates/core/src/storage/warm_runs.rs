use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarmStatus {
    Success,
    Error,
}

impl WarmStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            WarmStatus::Success => "success",
            WarmStatus::Error => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct WarmRun<'a> {
    pub as_of_date: NaiveDate,
    pub provider: &'a str,
    pub status: WarmStatus,
    pub symbols_total: usize,
    pub symbols_cached: usize,
    pub error: Option<&'a str>,
}

pub async fn record_warm_run(pool: &sqlx::PgPool, run: &WarmRun<'_>) -> anyhow::Result<Uuid> {
    let id = Uuid::new_v4();
    let generated_at: DateTime<Utc> = Utc::now();

    sqlx::query(
        "INSERT INTO cache_warm_runs (id, as_of_date, generated_at, provider, status, symbols_total, symbols_cached, error) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .persistent(false)
    .bind(id)
    .bind(run.as_of_date)
    .bind(generated_at)
    .bind(run.provider)
    .bind(run.status.as_str())
    .bind(run.symbols_total as i32)
    .bind(run.symbols_cached as i32)
    .bind(run.error)
    .execute(pool)
    .await
    .context("insert cache_warm_runs failed")?;

    Ok(id)
}
