use crate::domain::series::{HistoricalBar, PriceBar};
use serde::{Deserialize, Serialize};

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Simple moving average aligned with `values`: `None` until `window` values exist.
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    values
        .iter()
        .enumerate()
        .scan(0.0_f64, move |sum, (i, &v)| {
            *sum += v;
            if i >= window {
                *sum -= values[i - window];
            }
            Some((i + 1 >= window).then(|| *sum / window as f64))
        })
        .collect()
}

/// Rolling sample standard deviation (n - 1) over a window of optional
/// values. A window containing a `None` yields `None`.
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| {
            if window < 2 || i + 1 < window {
                return None;
            }
            let slice: Option<Vec<f64>> = values[i + 1 - window..=i].iter().copied().collect();
            slice.map(|s| sample_std(&s))
        })
        .collect()
}

/// Day-over-day fractional change; the first element is `None`.
pub fn pct_change(values: &[f64]) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    for i in 0..values.len() {
        if i == 0 || values[i - 1] == 0.0 {
            out.push(None);
        } else {
            out.push(Some(values[i] / values[i - 1] - 1.0));
        }
    }
    out
}

pub fn sample_std(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);
    var.sqrt()
}

/// Total return over the series in percent.
pub fn historical_return_pct(closes: &[f64]) -> Option<f64> {
    let first = *closes.first()?;
    let last = *closes.last()?;
    if first == 0.0 {
        return None;
    }
    let r = (last / first - 1.0) * 100.0;
    r.is_finite().then_some(r)
}

/// Annualised volatility of daily returns.
pub fn annualized_volatility(closes: &[f64]) -> f64 {
    let returns: Vec<f64> = pct_change(closes).into_iter().flatten().collect();
    sample_std(&returns) * TRADING_DAYS_PER_YEAR.sqrt()
}

/// Builds display bars: MA20, MA50 and a 20-day volatility of daily returns.
pub fn build_historical_bars(bars: &[PriceBar]) -> Vec<HistoricalBar> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let ma20 = sma(&closes, 20);
    let ma50 = sma(&closes, 50);
    let returns = pct_change(&closes);
    let volatility = rolling_std(&returns, 20);

    bars.iter()
        .enumerate()
        .map(|(i, b)| HistoricalBar {
            date: b.date,
            close: b.close,
            volume: b.volume,
            ma20: ma20[i],
            ma50: ma50[i],
            daily_return: returns[i],
            volatility: volatility[i],
        })
        .collect()
}

/// Exponential moving average seeded with the first value (no warm-up gap).
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    if values.is_empty() || span == 0 {
        return Vec::new();
    }
    let alpha = 2.0 / (span as f64 + 1.0);
    values
        .iter()
        .scan(values[0], move |prev, &v| {
            *prev = alpha * v + (1.0 - alpha) * *prev;
            Some(*prev)
        })
        .collect()
}

/// RSI over simple averages of gains and losses.
pub fn rsi(closes: &[f64], period: usize) -> Option<f64> {
    if period == 0 || closes.len() <= period {
        return None;
    }
    let deltas: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let tail = &deltas[deltas.len() - period..];
    let gain = tail.iter().filter(|d| **d > 0.0).sum::<f64>() / period as f64;
    let loss = -tail.iter().filter(|d| **d < 0.0).sum::<f64>() / period as f64;
    if loss == 0.0 {
        return Some(if gain == 0.0 { 50.0 } else { 100.0 });
    }
    let rs = gain / loss;
    Some(100.0 - 100.0 / (1.0 + rs))
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TechnicalIndicators {
    pub rsi: Option<f64>,
    pub macd: Option<f64>,
    pub bollinger_upper: Option<f64>,
    pub bollinger_lower: Option<f64>,
}

/// Latest RSI(14), MACD(12, 26) and 20-day Bollinger bands.
pub fn technical_indicators(closes: &[f64]) -> TechnicalIndicators {
    let macd = match (ema(closes, 12).last(), ema(closes, 26).last()) {
        (Some(fast), Some(slow)) => Some(fast - slow),
        _ => None,
    };

    let (bollinger_upper, bollinger_lower) = if closes.len() >= 20 {
        let tail = &closes[closes.len() - 20..];
        let mid = tail.iter().sum::<f64>() / 20.0;
        let std = sample_std(tail);
        (Some(mid + 2.0 * std), Some(mid - 2.0 * std))
    } else {
        (None, None)
    };

    TechnicalIndicators {
        rsi: rsi(closes, 14),
        macd,
        bollinger_upper,
        bollinger_lower,
    }
}
