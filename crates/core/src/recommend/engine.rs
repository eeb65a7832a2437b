use crate::analytics::indicators::{annualized_volatility, build_historical_bars, historical_return_pct};
use crate::analytics::piotroski::{piotroski_score, NEUTRAL_SCORE};
use crate::cache::StockDetailsCache;
use crate::catalog::{candidate_symbols, sector_override};
use crate::config::env_or;
use crate::domain::preferences::InvestmentPreferences;
use crate::domain::recommendation::Recommendation;
use crate::domain::series::{HistoricalBar, PriceBar};
use crate::domain::stock::{EsgScores, StockDetails, StockInfo};
use crate::market::types::TickerInfo;
use crate::market::MarketDataProvider;
use crate::recommend::criteria::check_criteria;
use crate::recommend::scoring::overall_score;
use futures::StreamExt;
use rand::Rng;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineOptions {
    /// Number of recommendations returned.
    pub limit: usize,
    /// Concurrent per-symbol fetches.
    pub concurrency: usize,
    /// Shuffle samples from the top `limit * shuffle_pool_factor` qualified stocks.
    pub shuffle_pool_factor: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            limit: 5,
            concurrency: 8,
            shuffle_pool_factor: 3,
        }
    }
}

impl EngineOptions {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            limit: env_or("RECOMMENDATION_LIMIT", d.limit).max(1),
            concurrency: env_or("RECOMMEND_CONCURRENCY", d.concurrency).max(1),
            shuffle_pool_factor: env_or("SHUFFLE_POOL_FACTOR", d.shuffle_pool_factor).max(1),
        }
    }
}

pub struct RecommendationEngine {
    provider: Arc<dyn MarketDataProvider>,
    cache: Option<StockDetailsCache>,
    opts: EngineOptions,
}

impl RecommendationEngine {
    pub fn new(
        provider: Arc<dyn MarketDataProvider>,
        cache: Option<StockDetailsCache>,
        opts: EngineOptions,
    ) -> Self {
        Self {
            provider,
            cache,
            opts,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.provider_name()
    }

    /// Top matches by score, or `None` when nothing qualifies.
    pub async fn recommend(&self, prefs: &InvestmentPreferences) -> Option<Vec<Recommendation>> {
        let mut qualified = self.qualified(prefs).await;
        if qualified.is_empty() {
            return None;
        }
        qualified.truncate(self.opts.limit);
        Some(qualified)
    }

    /// Random pick from the top of the qualified list, kept in score order.
    pub async fn shuffle(&self, prefs: &InvestmentPreferences) -> Option<Vec<Recommendation>> {
        let qualified = self.qualified(prefs).await;
        if qualified.is_empty() {
            return None;
        }
        let mut rng = rand::rng();
        Some(sample_in_order(
            qualified,
            self.opts.limit,
            self.opts.shuffle_pool_factor,
            &mut rng,
        ))
    }

    /// Every candidate passing the screen, best score first.
    pub async fn qualified(&self, prefs: &InvestmentPreferences) -> Vec<Recommendation> {
        let symbols = candidate_symbols(prefs);
        tracing::info!(candidates = symbols.len(), sectors = ?prefs.sectors, "recommendation search started");

        let details: Vec<Option<StockDetails>> = futures::stream::iter(symbols)
            .map(|symbol| async move { self.stock_details(&symbol).await })
            .buffer_unordered(self.opts.concurrency)
            .collect()
            .await;

        let mut scored = Vec::new();
        for stock in details.into_iter().flatten() {
            match check_criteria(&stock, prefs) {
                Ok(()) => {
                    let score = overall_score(&stock, prefs);
                    tracing::debug!(symbol = %stock.symbol, score, "qualified");
                    scored.push(Recommendation { stock, score });
                }
                Err(reason) => {
                    tracing::debug!(symbol = %stock.symbol, %reason, "rejected");
                }
            }
        }

        sort_by_score(&mut scored);
        tracing::info!(qualified = scored.len(), "recommendation search finished");
        scored
    }

    /// Cached details for a symbol, fetched and cached on a miss. Provider
    /// failures are logged and yield `None`.
    pub async fn stock_details(&self, symbol: &str) -> Option<StockDetails> {
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.get(symbol).await {
                return Some(hit);
            }
        }

        let fetched = self.fetch_details(symbol).await;

        match fetched {
            Ok(Some(details)) => {
                tracing::debug!(
                    symbol,
                    price = details.regular_market_price,
                    sector = %details.sector,
                    historical_return = ?details.historical_return,
                    beta = details.beta,
                    "fetched stock details"
                );
                if let Some(cache) = &self.cache {
                    cache.put(symbol, &details).await;
                }
                Some(details)
            }
            Ok(None) => {
                tracing::info!(symbol, "no historical data found");
                None
            }
            Err(err) => {
                tracing::warn!(symbol, error = %err, "error fetching stock details");
                None
            }
        }
    }

    async fn fetch_details(&self, symbol: &str) -> anyhow::Result<Option<StockDetails>> {
        let bars = self.provider.price_history(symbol).await?;
        if bars.is_empty() {
            return Ok(None);
        }
        let info = self.provider.ticker_info(symbol).await?;
        Ok(details_from(symbol, &bars, &info))
    }

    /// One year of bars with rolling indicators; `None` when unavailable.
    pub async fn historical_data(&self, symbol: &str) -> Option<Vec<HistoricalBar>> {
        match self.provider.price_history(symbol).await {
            Ok(bars) if !bars.is_empty() => Some(build_historical_bars(&bars)),
            Ok(_) => None,
            Err(err) => {
                tracing::warn!(symbol, error = %err, "error fetching historical data");
                None
            }
        }
    }

    pub async fn stock_info(&self, symbol: &str) -> Option<StockInfo> {
        match self.provider.ticker_info(symbol).await {
            Ok(info) => Some(StockInfo {
                name: info.long_name.unwrap_or_default(),
                sector: info.sector.unwrap_or_default(),
                industry: info.industry.unwrap_or_default(),
                market_cap: info.market_cap.unwrap_or(0.0),
                pe_ratio: info.forward_pe.unwrap_or(0.0),
                dividend_yield: info.dividend_yield.unwrap_or(0.0),
                beta: info.beta.unwrap_or(0.0),
            }),
            Err(err) => {
                tracing::warn!(symbol, error = %err, "error fetching stock info");
                None
            }
        }
    }

    pub async fn piotroski(&self, symbol: &str) -> u8 {
        match self.provider.financials(symbol).await {
            Ok(statements) => piotroski_score(statements.as_ref()),
            Err(err) => {
                tracing::warn!(symbol, error = %err, "error calculating Piotroski score");
                NEUTRAL_SCORE
            }
        }
    }
}

pub fn details_from(symbol: &str, bars: &[PriceBar], info: &TickerInfo) -> Option<StockDetails> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let current_price = *closes.last()?;

    let sector = match sector_override(symbol) {
        Some(s) => s.slug().to_string(),
        None => info
            .sector
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "Unknown".to_string())
            .to_lowercase(),
    };

    let dividend_yield = match info.dividend_yield {
        Some(y) if y.is_finite() && y != 0.0 => y * 100.0,
        _ => 0.0,
    };

    Some(StockDetails {
        symbol: symbol.to_string(),
        name: info
            .long_name
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| symbol.to_string()),
        sector,
        industry: info
            .industry
            .clone()
            .unwrap_or_else(|| "Unknown".to_string()),
        quote_type: info.quote_type.clone().unwrap_or_else(|| "stock".to_string()),
        beta: info.beta.filter(|b| b.is_finite()).unwrap_or(1.0),
        market_cap: info.market_cap.unwrap_or(0.0),
        regular_market_price: current_price,
        dividend_yield,
        historical_return: historical_return_pct(&closes),
        volatility: annualized_volatility(&closes),
        esg_data: EsgScores {
            total: info.total_esg.unwrap_or(0.0),
            environment: info.environment_score.unwrap_or(0.0),
            social: info.social_score.unwrap_or(0.0),
            governance: info.governance_score.unwrap_or(0.0),
        },
    })
}

fn sort_by_score(items: &mut [Recommendation]) {
    items.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.stock.symbol.cmp(&b.stock.symbol))
    });
}

/// Samples up to `limit` entries from the first `limit * pool_factor` of a
/// score-sorted list, preserving their relative order.
pub fn sample_in_order<R: Rng + ?Sized>(
    mut sorted: Vec<Recommendation>,
    limit: usize,
    pool_factor: usize,
    rng: &mut R,
) -> Vec<Recommendation> {
    sorted.truncate(limit.saturating_mul(pool_factor).max(limit));
    let amount = limit.min(sorted.len());
    let mut picked = rand::seq::index::sample(rng, sorted.len(), amount).into_vec();
    picked.sort_unstable();

    let mut slots: Vec<Option<Recommendation>> = sorted.into_iter().map(Some).collect();
    picked
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::preferences::{DividendPriority, InvestmentType, RiskLevel, Sector};
    use crate::market::fixture::{bars_from_closes, InMemoryMarketData};
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 1).unwrap()
    }

    fn info(name: &str, sector: &str, beta: f64, dividend_yield: Option<f64>) -> TickerInfo {
        TickerInfo {
            long_name: Some(name.to_string()),
            sector: Some(sector.to_string()),
            industry: Some("Utilities - Regulated Electric".to_string()),
            quote_type: Some("EQUITY".to_string()),
            beta: Some(beta),
            market_cap: Some(5e9),
            dividend_yield,
            ..TickerInfo::default()
        }
    }

    fn utilities_prefs() -> InvestmentPreferences {
        InvestmentPreferences {
            risk_level: RiskLevel::Medium,
            desired_return: 10.0,
            duration: 5,
            sectors: vec![Sector::Utilities],
            budget: 10_000.0,
            dividend_priority: DividendPriority::NotImportant,
            ethical_considerations: vec![],
            investment_types: vec![InvestmentType::Stocks],
        }
    }

    fn provider() -> InMemoryMarketData {
        InMemoryMarketData::new()
            // +20%, beta 1.0: best match.
            .with_history("NEE", bars_from_closes(start(), &[50.0, 55.0, 60.0]))
            .with_info("NEE", info("NextEra Energy", "Utilities", 1.0, Some(0.03)))
            // +8%, beta 0.9.
            .with_history("DUK", bars_from_closes(start(), &[100.0, 104.0, 108.0]))
            .with_info("DUK", info("Duke Energy", "Utilities", 0.9, Some(0.04)))
            // Beta outside the medium band.
            .with_history("SO", bars_from_closes(start(), &[70.0, 80.0, 90.0]))
            .with_info("SO", info("Southern Co", "Utilities", 0.3, None))
            // Provider failure is skipped.
            .with_failure("AEP")
    }

    fn engine(p: InMemoryMarketData) -> RecommendationEngine {
        RecommendationEngine::new(Arc::new(p), None, EngineOptions::default())
    }

    #[test]
    fn details_convert_units_and_defaults() {
        let bars = bars_from_closes(start(), &[100.0, 110.0]);
        let d = details_from("GOOGL", &bars, &TickerInfo {
            sector: Some("Communication Services".to_string()),
            dividend_yield: Some(0.005),
            ..TickerInfo::default()
        })
        .unwrap();
        assert_eq!(d.sector, "tech");
        assert_eq!(d.name, "GOOGL");
        assert_eq!(d.beta, 1.0);
        assert_eq!(d.quote_type, "stock");
        assert!((d.dividend_yield - 0.5).abs() < 1e-12);
        assert!((d.historical_return.unwrap() - 10.0).abs() < 1e-9);
        assert_eq!(d.regular_market_price, 110.0);

        assert!(details_from("X", &[], &TickerInfo::default()).is_none());
    }

    #[tokio::test]
    async fn recommend_ranks_qualified_stocks() {
        let recs = engine(provider())
            .recommend(&utilities_prefs())
            .await
            .unwrap();
        let symbols: Vec<_> = recs.iter().map(|r| r.stock.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["NEE", "DUK"]);
        assert!(recs[0].score > recs[1].score);
    }

    #[tokio::test]
    async fn recommend_returns_none_when_nothing_qualifies() {
        let mut prefs = utilities_prefs();
        prefs.desired_return = 100.0;
        assert!(engine(provider()).recommend(&prefs).await.is_none());
        assert!(engine(provider()).shuffle(&prefs).await.is_none());
    }

    #[tokio::test]
    async fn stock_details_are_cached() {
        let dir = std::env::temp_dir().join(format!("stockpick-engine-{}", uuid::Uuid::new_v4()));
        let cache = StockDetailsCache::open(&dir).await.unwrap();
        let e = RecommendationEngine::new(Arc::new(provider()), Some(cache.clone()), EngineOptions::default());
        let first = e.stock_details("NEE").await.unwrap();

        // A provider that fails everything still serves the cached entry.
        let offline = RecommendationEngine::new(
            Arc::new(InMemoryMarketData::new().with_failure("NEE")),
            Some(cache),
            EngineOptions::default(),
        );
        assert_eq!(offline.stock_details("NEE").await, Some(first));
    }

    #[tokio::test]
    async fn projection_inputs_fall_back_when_missing() {
        let e = engine(provider());
        assert!(e.historical_data("ZZZZ").await.is_none());
        assert_eq!(e.historical_data("NEE").await.unwrap().len(), 3);
        assert_eq!(e.piotroski("NEE").await, NEUTRAL_SCORE);
        assert_eq!(e.piotroski("AEP").await, NEUTRAL_SCORE);
        assert!(e.stock_info("AEP").await.is_none());
        assert_eq!(e.stock_info("DUK").await.unwrap().dividend_yield, 0.04);
    }

    fn rec(symbol: &str, score: f64) -> Recommendation {
        let bars = bars_from_closes(start(), &[1.0, 1.0]);
        Recommendation {
            stock: details_from(symbol, &bars, &TickerInfo::default()).unwrap(),
            score,
        }
    }

    #[test]
    fn shuffle_sample_stays_in_pool_and_in_order() {
        let sorted: Vec<_> = (0..20).map(|i| rec(&format!("S{i:02}"), 1.0 - i as f64 / 100.0)).collect();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let out = sample_in_order(sorted.clone(), 5, 3, &mut rng);
            assert_eq!(out.len(), 5);
            assert!(out.iter().all(|r| r.score > 1.0 - 15.0 / 100.0));
            assert!(out.windows(2).all(|w| w[0].score > w[1].score));
        }
    }

    #[test]
    fn shuffle_sample_returns_everything_from_small_pools() {
        let sorted = vec![rec("A", 0.9), rec("B", 0.8)];
        let mut rng = StdRng::seed_from_u64(1);
        let out = sample_in_order(sorted, 5, 3, &mut rng);
        let symbols: Vec<_> = out.iter().map(|r| r.stock.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["A", "B"]);
    }
}
