use crate::config::{env_or, Settings};
use crate::domain::series::PriceBar;
use crate::market::types::{FinancialStatements, HistoryResponse, TickerInfo};
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_RETRIES: u32 = 3;
const HISTORY_PERIOD: &str = "1y";

#[async_trait::async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// One year of daily bars in chronological order. Unknown symbols yield
    /// an empty list.
    async fn price_history(&self, symbol: &str) -> Result<Vec<PriceBar>>;

    async fn ticker_info(&self, symbol: &str) -> Result<TickerInfo>;

    /// `None` when the provider has no statements for the symbol.
    async fn financials(&self, symbol: &str) -> Result<Option<FinancialStatements>>;
}

#[derive(Debug, Clone)]
pub struct HttpJsonMarketData {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    retries: u32,
    backoff_base: Duration,
}

impl HttpJsonMarketData {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings.require_market_data_base_url()?;
        let timeout_secs = env_or("MARKET_DATA_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS);
        let retries = env_or("MARKET_DATA_RETRIES", DEFAULT_RETRIES);

        Self::new(
            base_url,
            settings.market_data_api_key.clone(),
            Duration::from_secs(timeout_secs),
            retries,
        )
    }

    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
        retries: u32,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build market data http client")?;

        Ok(Self {
            http,
            base_url: base_url.to_string(),
            api_key,
            retries: retries.max(1),
            backoff_base: Duration::from_secs(1),
        })
    }

    /// First retry waits `base`, each later one doubles it.
    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base * (1u32 << (attempt - 1).min(16))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &self.api_key {
            headers.insert("x-api-key", HeaderValue::from_str(api_key)?);
        }
        Ok(headers)
    }

    /// One GET; `Ok(None)` on 404.
    async fn get_once<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>> {
        let res = self
            .http
            .get(self.url(path))
            .headers(self.headers()?)
            .query(query)
            .send()
            .await
            .context("market data request failed")?;

        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let text = res
            .text()
            .await
            .context("failed to read market data response")?;
        if !status.is_success() {
            anyhow::bail!("market data HTTP {status}: {text}");
        }

        let parsed = serde_json::from_str::<T>(&text)
            .with_context(|| format!("market data response has unexpected shape: {text}"))?;
        Ok(Some(parsed))
    }

    async fn get_with_retries<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Option<T>> {
        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.get_once(path, query).await {
                Ok(v) => return Ok(v),
                Err(err) => {
                    if attempt >= self.retries {
                        return Err(err);
                    }
                    let backoff = self.backoff(attempt);
                    tracing::warn!(attempt, path, ?backoff, error = %err, "market data fetch failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for HttpJsonMarketData {
    fn provider_name(&self) -> &'static str {
        "external_http_json"
    }

    async fn price_history(&self, symbol: &str) -> Result<Vec<PriceBar>> {
        let path = format!("/v1/history/{}", encode_symbol(symbol));
        let resp: Option<HistoryResponse> = self
            .get_with_retries(&path, &[("period", HISTORY_PERIOD)])
            .await
            .with_context(|| format!("price history for {symbol}"))?;

        let Some(resp) = resp else {
            return Ok(Vec::new());
        };
        Ok(clean_bars(resp.bars))
    }

    async fn ticker_info(&self, symbol: &str) -> Result<TickerInfo> {
        let path = format!("/v1/info/{}", encode_symbol(symbol));
        let info: Option<TickerInfo> = self
            .get_with_retries(&path, &[])
            .await
            .with_context(|| format!("ticker info for {symbol}"))?;
        Ok(info.unwrap_or_default())
    }

    async fn financials(&self, symbol: &str) -> Result<Option<FinancialStatements>> {
        let path = format!("/v1/financials/{}", encode_symbol(symbol));
        self.get_with_retries(&path, &[])
            .await
            .with_context(|| format!("financial statements for {symbol}"))
    }
}

fn encode_symbol(symbol: &str) -> String {
    symbol
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
        .collect::<String>()
        .to_ascii_uppercase()
}

/// Drops bars without a finite close and sorts chronologically.
pub fn clean_bars(mut bars: Vec<PriceBar>) -> Vec<PriceBar> {
    bars.retain(|b| b.close.is_finite() && b.volume.is_finite());
    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);
    bars
}
