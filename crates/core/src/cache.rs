use crate::domain::stock::StockDetails;
use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_TTL_HOURS: i64 = 24;

/// Entry lifetime from `CACHE_TTL_HOURS`, 24h by default.
pub fn ttl_from_env() -> Duration {
    Duration::hours(crate::config::env_or("CACHE_TTL_HOURS", DEFAULT_TTL_HOURS).max(0))
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry {
    data: StockDetails,
    /// Unix seconds.
    cache_timestamp: f64,
}

/// One JSON file per symbol under `dir`. Read and write failures are logged
/// and treated as misses.
#[derive(Debug, Clone)]
pub struct StockDetailsCache {
    dir: PathBuf,
    ttl: Duration,
}

impl StockDetailsCache {
    pub async fn open(dir: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("failed to create cache dir {}", dir.display()))?;
        Ok(Self {
            dir,
            ttl: Duration::hours(DEFAULT_TTL_HOURS),
        })
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir
            .join(format!("{}_cache.json", symbol.trim().to_ascii_lowercase()))
    }

    pub async fn get(&self, symbol: &str) -> Option<StockDetails> {
        self.get_at(symbol, Utc::now()).await
    }

    async fn get_at(&self, symbol: &str, now: DateTime<Utc>) -> Option<StockDetails> {
        let path = self.path_for(symbol);
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                tracing::warn!(symbol, error = %e, "error reading cache");
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_slice(&bytes) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(symbol, error = %e, "error reading cache");
                return None;
            }
        };

        let cached_at = DateTime::from_timestamp(entry.cache_timestamp as i64, 0)?;
        if now - cached_at < self.ttl {
            Some(entry.data)
        } else {
            tracing::debug!(symbol, %cached_at, "cache entry expired");
            None
        }
    }

    pub async fn put(&self, symbol: &str, data: &StockDetails) {
        self.put_at(symbol, data, Utc::now()).await
    }

    async fn put_at(&self, symbol: &str, data: &StockDetails, now: DateTime<Utc>) {
        let entry = CacheEntry {
            data: data.clone(),
            cache_timestamp: now.timestamp() as f64,
        };
        let res = match serde_json::to_vec(&entry) {
            Ok(bytes) => tokio::fs::write(self.path_for(symbol), bytes)
                .await
                .map_err(anyhow::Error::from),
            Err(e) => Err(anyhow::Error::from(e)),
        };
        if let Err(e) = res {
            tracing::warn!(symbol, error = %e, "error saving cache");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::stock::EsgScores;

    fn details() -> StockDetails {
        StockDetails {
            symbol: "KO".to_string(),
            name: "Coca-Cola".to_string(),
            sector: "consumer".to_string(),
            industry: "Beverages".to_string(),
            quote_type: "EQUITY".to_string(),
            beta: 0.6,
            market_cap: 2.6e11,
            regular_market_price: 61.0,
            dividend_yield: 3.1,
            historical_return: Some(7.5),
            volatility: 0.14,
            esg_data: EsgScores::default(),
        }
    }

    async fn temp_cache() -> StockDetailsCache {
        let dir = std::env::temp_dir().join(format!("stockpick-cache-{}", uuid::Uuid::new_v4()));
        StockDetailsCache::open(dir).await.unwrap()
    }

    #[tokio::test]
    async fn round_trips_fresh_entries() {
        let cache = temp_cache().await;
        assert!(cache.get("KO").await.is_none());
        cache.put("KO", &details()).await;
        assert!(cache.path_for("KO").ends_with("ko_cache.json"));
        assert_eq!(cache.get("ko").await, Some(details()));
    }

    #[tokio::test]
    async fn expired_and_corrupt_entries_are_misses() {
        let cache = temp_cache().await;
        let now = Utc::now();
        cache.put_at("KO", &details(), now - Duration::hours(25)).await;
        assert!(cache.get_at("KO", now).await.is_none());

        tokio::fs::write(cache.path_for("PEP"), b"not json").await.unwrap();
        assert!(cache.get("PEP").await.is_none());
    }

    #[tokio::test]
    async fn zero_ttl_never_hits() {
        let cache = temp_cache().await.with_ttl(Duration::zero());
        cache.put("KO", &details()).await;
        assert!(cache.get("KO").await.is_none());
    }
}
