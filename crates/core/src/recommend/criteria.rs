use crate::catalog::standardize_sector;
use crate::domain::preferences::{InvestmentPreferences, InvestmentType};
use crate::domain::stock::StockDetails;
use std::collections::BTreeSet;
use std::fmt;

const LARGE_CAP: f64 = 10e9;
/// A security passes the return screen at this share of the desired return.
const RETURN_FLOOR_SHARE: f64 = 0.25;

/// Every investment type a security can stand in for.
pub fn investment_types_for(stock: &StockDetails) -> BTreeSet<InvestmentType> {
    let mut types = BTreeSet::new();
    match stock.quote_type.trim().to_ascii_lowercase().as_str() {
        "equity" | "stock" | "" => {
            types.insert(InvestmentType::Stocks);
        }
        "etf" => {
            types.insert(InvestmentType::Etf);
        }
        "mutualfund" => {
            types.insert(InvestmentType::MutualFunds);
        }
        "bond" => {
            types.insert(InvestmentType::Bonds);
        }
        _ => {}
    }

    // Large caps sit inside most index ETFs and funds.
    if stock.market_cap > LARGE_CAP {
        types.insert(InvestmentType::Etf);
        types.insert(InvestmentType::MutualFunds);
    }
    if stock.dividend_yield > 0.0 {
        types.insert(InvestmentType::MutualFunds);
    }
    types
}

#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    InvestmentType,
    Sector { sector: String },
    Risk { beta: f64, band: (f64, f64) },
    Return { historical: f64, floor: f64 },
    Dividend { dividend_yield: f64, min: f64 },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::InvestmentType => write!(f, "investment type not selected"),
            Rejection::Sector { sector } => write!(f, "sector {sector} not selected"),
            Rejection::Risk { beta, band } => {
                write!(f, "beta {beta} outside [{}, {}]", band.0, band.1)
            }
            Rejection::Return { historical, floor } => {
                write!(f, "historical return {historical:.2}% below {floor:.2}%")
            }
            Rejection::Dividend {
                dividend_yield,
                min,
            } => write!(f, "dividend yield {dividend_yield:.2}% below {min:.2}%"),
        }
    }
}

/// Screens a security against the preference set; the first failed check wins.
pub fn check_criteria(
    stock: &StockDetails,
    prefs: &InvestmentPreferences,
) -> Result<(), Rejection> {
    let stock_types = investment_types_for(stock);
    let wanted = prefs.effective_investment_types();
    if !wanted.iter().any(|t| stock_types.contains(t)) {
        return Err(Rejection::InvestmentType);
    }

    let sector = standardize_sector(&stock.sector);
    if !prefs.sectors.iter().any(|s| s.slug() == sector) {
        return Err(Rejection::Sector { sector });
    }

    let band = prefs.risk_level.beta_band();
    if !(band.0 <= stock.beta && stock.beta <= band.1) {
        return Err(Rejection::Risk {
            beta: stock.beta,
            band,
        });
    }

    let historical = stock
        .historical_return
        .filter(|r| r.is_finite())
        .unwrap_or(0.0);
    let floor = prefs.desired_return * RETURN_FLOOR_SHARE;
    if historical < floor {
        return Err(Rejection::Return { historical, floor });
    }

    if let Some(min) = prefs.dividend_priority.min_yield() {
        if stock.dividend_yield < min {
            return Err(Rejection::Dividend {
                dividend_yield: stock.dividend_yield,
                min,
            });
        }
    }

    Ok(())
}
