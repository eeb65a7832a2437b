use crate::domain::series::PriceBar;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub symbol: String,
    #[serde(default)]
    pub bars: Vec<PriceBar>,
}

/// Ticker metadata in Yahoo-style keys. Every field is optional upstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TickerInfo {
    #[serde(rename = "longName", default)]
    pub long_name: Option<String>,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(rename = "quoteType", default)]
    pub quote_type: Option<String>,
    #[serde(default)]
    pub beta: Option<f64>,
    #[serde(rename = "marketCap", default)]
    pub market_cap: Option<f64>,
    /// Fraction, e.g. `0.0125` for 1.25%.
    #[serde(rename = "dividendYield", default)]
    pub dividend_yield: Option<f64>,
    #[serde(rename = "forwardPE", default)]
    pub forward_pe: Option<f64>,
    #[serde(rename = "totalEsg", default)]
    pub total_esg: Option<f64>,
    #[serde(rename = "environmentScore", default)]
    pub environment_score: Option<f64>,
    #[serde(rename = "socialScore", default)]
    pub social_score: Option<f64>,
    #[serde(rename = "governanceScore", default)]
    pub governance_score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FiscalYear {
    #[serde(default)]
    pub net_income: Option<f64>,
    #[serde(default)]
    pub total_assets: Option<f64>,
    #[serde(default)]
    pub operating_cash_flow: Option<f64>,
    #[serde(default)]
    pub long_term_debt: Option<f64>,
    #[serde(default)]
    pub current_assets: Option<f64>,
    #[serde(default)]
    pub current_liabilities: Option<f64>,
    #[serde(default)]
    pub shares_outstanding: Option<f64>,
    #[serde(default)]
    pub gross_profit: Option<f64>,
    #[serde(default)]
    pub revenue: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatements {
    pub current: FiscalYear,
    #[serde(default)]
    pub prior: Option<FiscalYear>,
}
