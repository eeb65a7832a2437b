use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Raw daily bar as delivered by the market data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

/// Daily bar enriched with rolling indicators. Rolling fields stay `None`
/// until their window is full.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalBar {
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Volume")]
    pub volume: f64,
    #[serde(rename = "MA20")]
    pub ma20: Option<f64>,
    #[serde(rename = "MA50")]
    pub ma50: Option<f64>,
    #[serde(rename = "Daily_Return")]
    pub daily_return: Option<f64>,
    #[serde(rename = "Volatility")]
    pub volatility: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionPoint {
    pub date: NaiveDate,
    pub price: f64,
}
