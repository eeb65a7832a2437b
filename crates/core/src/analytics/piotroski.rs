use crate::market::types::{FinancialStatements, FiscalYear};

/// Score reported when statements are unavailable.
pub const NEUTRAL_SCORE: u8 = 5;

/// Piotroski F-Score (0..=9). Checks comparing against the prior year fail
/// when there is no prior year; checks with a missing input fail.
pub fn piotroski_score(statements: Option<&FinancialStatements>) -> u8 {
    let Some(st) = statements else {
        return NEUTRAL_SCORE;
    };
    let cur = &st.current;
    let prior = st.prior.as_ref();

    let checks = [
        // Profitability
        roa(cur).is_some_and(|v| v > 0.0),
        cur.operating_cash_flow.is_some_and(|v| v > 0.0),
        compare(cur, prior, roa, |c, p| c > p),
        matches!((cur.operating_cash_flow, cur.net_income), (Some(cfo), Some(ni)) if cfo > ni),
        // Leverage, liquidity and dilution
        compare(cur, prior, leverage, |c, p| c < p),
        compare(cur, prior, current_ratio, |c, p| c > p),
        compare(cur, prior, |y| y.shares_outstanding, |c, p| c <= p),
        // Operating efficiency
        compare(cur, prior, gross_margin, |c, p| c > p),
        compare(cur, prior, asset_turnover, |c, p| c > p),
    ];

    checks.iter().filter(|passed| **passed).count() as u8
}

fn compare(
    cur: &FiscalYear,
    prior: Option<&FiscalYear>,
    metric: impl Fn(&FiscalYear) -> Option<f64>,
    test: impl Fn(f64, f64) -> bool,
) -> bool {
    match (metric(cur), prior.and_then(&metric)) {
        (Some(c), Some(p)) => test(c, p),
        _ => false,
    }
}

fn ratio(num: Option<f64>, den: Option<f64>) -> Option<f64> {
    match (num, den) {
        (Some(n), Some(d)) if d != 0.0 => Some(n / d),
        _ => None,
    }
}

fn roa(y: &FiscalYear) -> Option<f64> {
    ratio(y.net_income, y.total_assets)
}

fn leverage(y: &FiscalYear) -> Option<f64> {
    ratio(y.long_term_debt, y.total_assets)
}

fn current_ratio(y: &FiscalYear) -> Option<f64> {
    ratio(y.current_assets, y.current_liabilities)
}

fn gross_margin(y: &FiscalYear) -> Option<f64> {
    ratio(y.gross_profit, y.revenue)
}

fn asset_turnover(y: &FiscalYear) -> Option<f64> {
    ratio(y.revenue, y.total_assets)
}

/// Qualitative band shown next to the score.
pub fn score_label(score: u8) -> &'static str {
    match score {
        0..=3 => "Weak",
        4..=6 => "Moderate",
        _ => "Strong",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn year(scale: f64) -> FiscalYear {
        FiscalYear {
            net_income: Some(10.0 * scale),
            total_assets: Some(100.0),
            operating_cash_flow: Some(15.0 * scale),
            long_term_debt: Some(40.0 / scale),
            current_assets: Some(50.0 * scale),
            current_liabilities: Some(40.0),
            shares_outstanding: Some(1000.0),
            gross_profit: Some(30.0 * scale),
            revenue: Some(80.0 + scale),
        }
    }

    #[test]
    fn missing_statements_score_neutral() {
        assert_eq!(piotroski_score(None), NEUTRAL_SCORE);
    }

    #[test]
    fn improving_company_scores_nine() {
        let st = FinancialStatements {
            current: year(2.0),
            prior: Some(year(1.0)),
        };
        assert_eq!(piotroski_score(Some(&st)), 9);
    }

    #[test]
    fn single_year_only_earns_static_checks() {
        let st = FinancialStatements {
            current: year(1.0),
            prior: None,
        };
        // ROA > 0, CFO > 0, CFO > NI.
        assert_eq!(piotroski_score(Some(&st)), 3);
    }

    #[test]
    fn deteriorating_company_scores_low() {
        let mut cur = year(1.0);
        cur.net_income = Some(-5.0);
        cur.operating_cash_flow = Some(-8.0);
        cur.shares_outstanding = Some(1200.0);
        let st = FinancialStatements {
            current: cur,
            prior: Some(year(2.0)),
        };
        assert_eq!(piotroski_score(Some(&st)), 0);
        assert_eq!(score_label(0), "Weak");
        assert_eq!(score_label(9), "Strong");
    }
}
