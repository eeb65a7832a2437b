use crate::catalog::standardize_sector;
use crate::domain::preferences::{
    DividendPriority, EthicalConsideration, InvestmentPreferences, RiskLevel,
};
use crate::domain::stock::StockDetails;
use serde::{Deserialize, Serialize};

const W_RISK: f64 = 0.25;
const W_RETURN: f64 = 0.30;
const W_SECTOR: f64 = 0.20;
const W_DIVIDEND: f64 = 0.15;
const W_ETHICAL: f64 = 0.05;
const W_BUDGET: f64 = 0.05;

/// Per-criterion match scores, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub risk: f64,
    pub r#return: f64,
    pub sector: f64,
    pub dividend: f64,
    pub ethical: f64,
    pub budget: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.risk * W_RISK
            + self.r#return * W_RETURN
            + self.sector * W_SECTOR
            + self.dividend * W_DIVIDEND
            + self.ethical * W_ETHICAL
            + self.budget * W_BUDGET
    }
}

pub fn score_breakdown(stock: &StockDetails, prefs: &InvestmentPreferences) -> ScoreBreakdown {
    ScoreBreakdown {
        risk: risk_score(stock.beta, prefs.risk_level),
        r#return: return_score(stock.historical_return, prefs.desired_return),
        sector: sector_score(stock, prefs),
        dividend: dividend_score(stock.dividend_yield, prefs.dividend_priority),
        ethical: ethical_score(stock, &prefs.ethical_considerations),
        // Multiple units are allowed, so any budget fits.
        budget: 1.0,
    }
}

pub fn overall_score(stock: &StockDetails, prefs: &InvestmentPreferences) -> f64 {
    score_breakdown(stock, prefs).total()
}

fn risk_score(beta: f64, level: RiskLevel) -> f64 {
    match level {
        RiskLevel::High => (beta / 2.0).min(1.0),
        RiskLevel::Medium => (1.0 - (beta - 1.0).abs()).max(0.0),
        RiskLevel::Low => (1.0 - beta / 2.0).max(0.0),
    }
}

fn return_score(historical: Option<f64>, target: f64) -> f64 {
    let Some(r) = historical.filter(|r| r.is_finite()) else {
        return 0.5;
    };
    if r >= target {
        1.0
    } else if target > 0.0 {
        (r / target).max(0.5)
    } else {
        0.5
    }
}

fn sector_score(stock: &StockDetails, prefs: &InvestmentPreferences) -> f64 {
    let sector = standardize_sector(&stock.sector);
    if prefs.sectors.iter().any(|s| s.slug() == sector) {
        1.0
    } else {
        0.0
    }
}

fn dividend_score(dividend_yield: f64, priority: DividendPriority) -> f64 {
    match priority {
        DividendPriority::Very => (dividend_yield / 2.0).min(1.0),
        DividendPriority::Somewhat => dividend_yield.min(1.0),
        DividendPriority::NotImportant => 1.0,
    }
    .max(0.0)
}

fn ethical_score(stock: &StockDetails, considerations: &[EthicalConsideration]) -> f64 {
    if considerations.is_empty() {
        return 1.0;
    }
    let esg = &stock.esg_data;
    let sum: f64 = considerations
        .iter()
        .map(|c| match c {
            EthicalConsideration::Esg => esg.total,
            EthicalConsideration::Green => esg.environment,
            EthicalConsideration::Social => esg.social,
            EthicalConsideration::Governance => esg.governance,
        })
        .map(|v| v / 100.0)
        .sum();
    sum / considerations.len() as f64
}
