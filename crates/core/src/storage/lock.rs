use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use sqlx::pool::PoolConnection;
use sqlx::Postgres;

// Session-scoped advisory lock: one cache warm per as-of date at a time.
const WARM_LOCK_NAMESPACE: i64 = 0x5354_4F43_4B50; // "STOCKP"

pub fn warm_lock_key(as_of_date: NaiveDate) -> i64 {
    WARM_LOCK_NAMESPACE ^ (as_of_date.num_days_from_ce() as i64)
}

/// Held warm lock. Owns the connection the lock was taken on, since
/// Postgres only lets that session unlock it.
#[derive(Debug)]
pub struct WarmLock {
    conn: PoolConnection<Postgres>,
    key: i64,
}

impl WarmLock {
    /// `Ok(None)` when another session holds the lock for `as_of_date`.
    pub async fn try_acquire(
        pool: &sqlx::PgPool,
        as_of_date: NaiveDate,
    ) -> anyhow::Result<Option<Self>> {
        let key = warm_lock_key(as_of_date);
        let mut conn = pool
            .acquire()
            .await
            .context("failed to check out a connection for the warm lock")?;
        let acquired: (bool,) = sqlx::query_as("SELECT pg_try_advisory_lock($1)")
            .persistent(false)
            .bind(key)
            .fetch_one(&mut *conn)
            .await
            .with_context(|| format!("failed to acquire advisory lock (key={key})"))?;
        Ok(acquired.0.then_some(Self { conn, key }))
    }

    pub fn key(&self) -> i64 {
        self.key
    }

    pub async fn release(mut self) -> anyhow::Result<()> {
        let key = self.key;
        let released: (bool,) = sqlx::query_as("SELECT pg_advisory_unlock($1)")
            .persistent(false)
            .bind(key)
            .fetch_one(&mut *self.conn)
            .await
            .with_context(|| format!("failed to release advisory lock (key={key})"))?;
        if !released.0 {
            anyhow::bail!("advisory lock (key={key}) was not held by this session");
        }
        Ok(())
    }
}
