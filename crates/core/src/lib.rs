pub mod analytics;
pub mod cache;
pub mod catalog;
pub mod domain;
pub mod market;
pub mod recommend;
pub mod storage;
pub mod time;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_CACHE_DIR: &str = "data/cache";

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub sentry_dsn: Option<String>,
        pub market_data_base_url: Option<String>,
        pub market_data_api_key: Option<String>,
        pub cache_dir: String,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                database_url: std::env::var("DATABASE_URL").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
                market_data_base_url: std::env::var("MARKET_DATA_BASE_URL").ok(),
                market_data_api_key: std::env::var("MARKET_DATA_API_KEY").ok(),
                cache_dir: std::env::var("CACHE_DIR")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_CACHE_DIR.to_string()),
            })
        }

        pub fn require_database_url(&self) -> anyhow::Result<&str> {
            self.database_url
                .as_deref()
                .context("DATABASE_URL is required")
        }

        pub fn require_market_data_base_url(&self) -> anyhow::Result<&str> {
            self.market_data_base_url
                .as_deref()
                .context("MARKET_DATA_BASE_URL is required")
        }
    }

    /// Reads a numeric tunable from the environment, falling back to `default`.
    pub fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
        std::env::var(key)
            .ok()
            .and_then(|s| s.trim().parse::<T>().ok())
            .unwrap_or(default)
    }
}
