use crate::domain::series::PriceBar;
use crate::market::provider::{clean_bars, MarketDataProvider};
use crate::market::types::{FinancialStatements, TickerInfo};
use anyhow::Result;
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;

/// Provider serving preloaded data, keyed by upper-case symbol.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMarketData {
    history: HashMap<String, Vec<PriceBar>>,
    info: HashMap<String, TickerInfo>,
    financials: HashMap<String, FinancialStatements>,
    failing: Vec<String>,
}

impl InMemoryMarketData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(mut self, symbol: &str, bars: Vec<PriceBar>) -> Self {
        self.history.insert(symbol.to_ascii_uppercase(), bars);
        self
    }

    pub fn with_info(mut self, symbol: &str, info: TickerInfo) -> Self {
        self.info.insert(symbol.to_ascii_uppercase(), info);
        self
    }

    pub fn with_financials(mut self, symbol: &str, statements: FinancialStatements) -> Self {
        self.financials
            .insert(symbol.to_ascii_uppercase(), statements);
        self
    }

    /// Every call for `symbol` returns an error.
    pub fn with_failure(mut self, symbol: &str) -> Self {
        self.failing.push(symbol.to_ascii_uppercase());
        self
    }

    fn check(&self, symbol: &str) -> Result<String> {
        let key = symbol.trim().to_ascii_uppercase();
        anyhow::ensure!(
            !self.failing.contains(&key),
            "simulated provider failure for {key}"
        );
        Ok(key)
    }
}

#[async_trait::async_trait]
impl MarketDataProvider for InMemoryMarketData {
    fn provider_name(&self) -> &'static str {
        "in_memory"
    }

    async fn price_history(&self, symbol: &str) -> Result<Vec<PriceBar>> {
        let key = self.check(symbol)?;
        Ok(clean_bars(self.history.get(&key).cloned().unwrap_or_default()))
    }

    async fn ticker_info(&self, symbol: &str) -> Result<TickerInfo> {
        let key = self.check(symbol)?;
        Ok(self.info.get(&key).cloned().unwrap_or_default())
    }

    async fn financials(&self, symbol: &str) -> Result<Option<FinancialStatements>> {
        let key = self.check(symbol)?;
        Ok(self.financials.get(&key).cloned())
    }
}

/// Consecutive daily bars starting at `start`, one per close.
pub fn bars_from_closes(start: NaiveDate, closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            date: start + Duration::days(i as i64),
            close,
            volume: 1_000_000.0,
        })
        .collect()
}
