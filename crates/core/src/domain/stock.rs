use serde::{Deserialize, Serialize};
use std::fmt;

/// Display risk tier derived from beta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl RiskTier {
    pub const LOW_BETA_BELOW: f64 = 0.8;
    pub const HIGH_BETA_ABOVE: f64 = 1.2;

    /// Both thresholds are exclusive: 0.8 and 1.2 map to `Medium`.
    pub fn from_beta(beta: f64) -> Self {
        if beta < Self::LOW_BETA_BELOW {
            RiskTier::Low
        } else if beta > Self::HIGH_BETA_ABOVE {
            RiskTier::High
        } else {
            RiskTier::Medium
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RiskTier::Low => "Low",
            RiskTier::Medium => "Medium",
            RiskTier::High => "High",
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EsgScores {
    #[serde(rename = "totalEsg", default)]
    pub total: f64,
    #[serde(rename = "environmentScore", default)]
    pub environment: f64,
    #[serde(rename = "socialScore", default)]
    pub social: f64,
    #[serde(rename = "governanceScore", default)]
    pub governance: f64,
}

/// Per-symbol snapshot used for screening and scoring. Percent fields are in
/// percent units (`12.5` means 12.5%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockDetails {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub industry: String,
    #[serde(rename = "quoteType")]
    pub quote_type: String,
    pub beta: f64,
    #[serde(rename = "marketCap")]
    pub market_cap: f64,
    #[serde(rename = "regularMarketPrice")]
    pub regular_market_price: f64,
    pub dividend_yield: f64,
    /// `None` when the return could not be computed.
    pub historical_return: Option<f64>,
    pub volatility: f64,
    pub esg_data: EsgScores,
}

impl StockDetails {
    pub fn risk_tier(&self) -> RiskTier {
        RiskTier::from_beta(self.beta)
    }
}

/// Summary shown on the projection page. `dividend_yield` is a fraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockInfo {
    pub name: String,
    pub sector: String,
    pub industry: String,
    pub market_cap: f64,
    pub pe_ratio: f64,
    pub dividend_yield: f64,
    pub beta: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn risk_tier_thresholds_are_exclusive() {
        assert_eq!(RiskTier::from_beta(0.79), RiskTier::Low);
        assert_eq!(RiskTier::from_beta(0.8), RiskTier::Medium);
        assert_eq!(RiskTier::from_beta(1.0), RiskTier::Medium);
        assert_eq!(RiskTier::from_beta(1.2), RiskTier::Medium);
        assert_eq!(RiskTier::from_beta(1.21), RiskTier::High);
        assert_eq!(RiskTier::from_beta(-0.3), RiskTier::Low);
    }

    #[test]
    fn details_use_provider_style_keys() {
        let details = StockDetails {
            symbol: "AAPL".to_string(),
            name: "Apple Inc.".to_string(),
            sector: "tech".to_string(),
            industry: "Consumer Electronics".to_string(),
            quote_type: "EQUITY".to_string(),
            beta: 1.25,
            market_cap: 3.0e12,
            regular_market_price: 190.0,
            dividend_yield: 0.5,
            historical_return: Some(21.3),
            volatility: 0.22,
            esg_data: EsgScores::default(),
        };
        let v = serde_json::to_value(&details).unwrap();
        assert_eq!(v["quoteType"], "EQUITY");
        assert_eq!(v["regularMarketPrice"], 190.0);
        assert_eq!(v["esg_data"]["totalEsg"], 0.0);
        assert_eq!(details.risk_tier(), RiskTier::High);
    }
}
