//! Autoregressive price forecaster.
//!
//! Close prices are min-max scaled to `[0, 1]`, a ridge regression is fitted on
//! `lags` previous values plus an intercept, and the model is rolled forward
//! one day at a time.

use crate::config::env_or;
use crate::domain::series::{HistoricalBar, PredictionPoint};
use anyhow::{bail, ensure, Context, Result};
use chrono::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForecastConfig {
    pub lags: usize,
    pub horizon_days: usize,
    pub ridge: f64,
    pub train_fraction: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            lags: 20,
            horizon_days: 30,
            ridge: 1e-4,
            train_fraction: 0.8,
        }
    }
}

impl ForecastConfig {
    pub fn from_env() -> Self {
        let d = Self::default();
        Self {
            lags: env_or("FORECAST_LAGS", d.lags),
            horizon_days: env_or("FORECAST_HORIZON_DAYS", d.horizon_days),
            ridge: env_or("FORECAST_RIDGE", d.ridge),
            train_fraction: d.train_fraction,
        }
    }

    /// Fewest bars that still leave a validation split.
    pub fn min_history(&self) -> usize {
        self.lags * 2 + 10
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct MinMaxScaler {
    min: f64,
    range: f64,
}

impl MinMaxScaler {
    fn fit(values: &[f64]) -> Self {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = if max > min { max - min } else { 1.0 };
        Self { min, range }
    }

    fn transform(&self, v: f64) -> f64 {
        (v - self.min) / self.range
    }

    fn inverse(&self, v: f64) -> f64 {
        v * self.range + self.min
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainReport {
    pub train_samples: usize,
    pub validation_samples: usize,
    /// RMSE on the held-out tail, in price units.
    pub validation_rmse: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct PricePredictor {
    config: ForecastConfig,
    scaler: Option<MinMaxScaler>,
    /// Intercept first, then one weight per lag (oldest lag first).
    weights: Vec<f64>,
}

impl PricePredictor {
    pub fn new(config: ForecastConfig) -> Self {
        Self {
            config,
            scaler: None,
            weights: Vec::new(),
        }
    }

    pub fn train(&mut self, history: &[HistoricalBar]) -> Result<TrainReport> {
        let lags = self.config.lags;
        ensure!(lags >= 1, "forecast lags must be >= 1");
        ensure!(
            history.len() >= self.config.min_history(),
            "not enough history to train: need {} bars, got {}",
            self.config.min_history(),
            history.len()
        );

        let closes: Vec<f64> = history.iter().map(|b| b.close).collect();
        let scaler = MinMaxScaler::fit(&closes);
        let scaled: Vec<f64> = closes.iter().map(|&v| scaler.transform(v)).collect();

        let samples: Vec<(&[f64], f64)> = (lags..scaled.len())
            .map(|i| (&scaled[i - lags..i], scaled[i]))
            .collect();
        let split = ((samples.len() as f64) * self.config.train_fraction).round() as usize;
        let split = split.clamp(1, samples.len());
        let (train, validation) = samples.split_at(split);

        let weights = fit_ridge(train, self.config.ridge).context("ridge fit failed")?;

        let validation_rmse = if validation.is_empty() {
            None
        } else {
            let mse = validation
                .iter()
                .map(|(x, y)| {
                    let err = scaler.inverse(predict_one(&weights, x)) - scaler.inverse(*y);
                    err * err
                })
                .sum::<f64>()
                / validation.len() as f64;
            Some(mse.sqrt())
        };

        self.scaler = Some(scaler);
        self.weights = weights;

        Ok(TrainReport {
            train_samples: train.len(),
            validation_samples: validation.len(),
            validation_rmse,
        })
    }

    /// Forecasts `horizon_days` calendar days after the last bar.
    pub fn predict_future(&self, history: &[HistoricalBar]) -> Result<Vec<PredictionPoint>> {
        let Some(scaler) = self.scaler else {
            bail!("model needs to be trained first");
        };
        let lags = self.config.lags;
        ensure!(
            history.len() >= lags,
            "need at least {lags} bars to forecast, got {}",
            history.len()
        );
        let last_date = history[history.len() - 1].date;

        let mut window: Vec<f64> = history[history.len() - lags..]
            .iter()
            .map(|b| scaler.transform(b.close))
            .collect();

        let mut out = Vec::with_capacity(self.config.horizon_days);
        for day in 1..=self.config.horizon_days {
            let next = predict_one(&self.weights, &window);
            ensure!(next.is_finite(), "forecast diverged at day {day}");
            window.remove(0);
            window.push(next);
            out.push(PredictionPoint {
                date: last_date + Duration::days(day as i64),
                price: scaler.inverse(next),
            });
        }
        Ok(out)
    }
}

fn predict_one(weights: &[f64], x: &[f64]) -> f64 {
    weights[0] + weights[1..].iter().zip(x).map(|(w, v)| w * v).sum::<f64>()
}

/// Solves `(XᵀX + λI) w = Xᵀy` with an unpenalised intercept.
fn fit_ridge(samples: &[(&[f64], f64)], lambda: f64) -> Result<Vec<f64>> {
    ensure!(!samples.is_empty(), "no training samples");
    let dim = samples[0].0.len() + 1;

    let mut a = vec![vec![0.0; dim]; dim];
    let mut b = vec![0.0; dim];
    for (x, y) in samples {
        let row: Vec<f64> = std::iter::once(1.0).chain(x.iter().copied()).collect();
        for i in 0..dim {
            b[i] += row[i] * y;
            for j in 0..dim {
                a[i][j] += row[i] * row[j];
            }
        }
    }
    for (i, row) in a.iter_mut().enumerate().skip(1) {
        row[i] += lambda;
    }

    solve(a, b)
}

/// Gaussian elimination with partial pivoting.
fn solve(mut a: Vec<Vec<f64>>, mut b: Vec<f64>) -> Result<Vec<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
            .unwrap_or(col);
        ensure!(a[pivot][col].abs() > 1e-12, "singular system at column {col}");
        a.swap(col, pivot);
        b.swap(col, pivot);

        for row in col + 1..n {
            let factor = a[row][col] / a[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                let delta = factor * a[col][k];
                a[row][k] -= delta;
            }
            let delta = factor * b[col];
            b[row] -= delta;
        }
    }

    let mut x = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[row][k] * x[k]).sum();
        x[row] = (b[row] - tail) / a[row][row];
    }
    Ok(x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::indicators::build_historical_bars;
    use crate::market::fixture::bars_from_closes;
    use chrono::NaiveDate;

    fn history(closes: &[f64]) -> Vec<HistoricalBar> {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        build_historical_bars(&bars_from_closes(start, closes))
    }

    #[test]
    fn predicting_before_training_fails() {
        let p = PricePredictor::new(ForecastConfig::default());
        assert!(p.predict_future(&history(&[1.0; 60])).is_err());
    }

    #[test]
    fn short_history_is_rejected() {
        let mut p = PricePredictor::new(ForecastConfig::default());
        assert!(p.train(&history(&[1.0; 10])).is_err());
    }

    #[test]
    fn linear_trend_is_extrapolated() {
        let closes: Vec<f64> = (0..120).map(|i| 100.0 + i as f64).collect();
        let hist = history(&closes);
        let config = ForecastConfig {
            lags: 5,
            horizon_days: 10,
            ridge: 1e-6,
            train_fraction: 0.8,
        };
        let mut p = PricePredictor::new(config);
        let report = p.train(&hist).unwrap();
        assert_eq!(report.train_samples + report.validation_samples, 115);
        assert!(report.validation_rmse.unwrap() < 1.0);

        let preds = p.predict_future(&hist).unwrap();
        assert_eq!(preds.len(), 10);
        assert_eq!(preds[0].date, hist.last().unwrap().date + Duration::days(1));
        assert!((preds[0].price - 220.0).abs() < 1.0);
        assert!((preds[9].price - 229.0).abs() < 2.0);
    }

    #[test]
    fn flat_series_stays_flat() {
        let hist = history(&[42.0; 80]);
        let mut p = PricePredictor::new(ForecastConfig::default());
        p.train(&hist).unwrap();
        let preds = p.predict_future(&hist).unwrap();
        assert_eq!(preds.len(), 30);
        assert!(preds.iter().all(|pt| (pt.price - 42.0).abs() < 1e-6));
    }

    #[test]
    fn solve_handles_small_system() {
        let x = solve(vec![vec![2.0, 1.0], vec![1.0, 3.0]], vec![3.0, 5.0]).unwrap();
        assert!((x[0] - 0.8).abs() < 1e-12);
        assert!((x[1] - 1.4).abs() < 1e-12);
        assert!(solve(vec![vec![0.0, 0.0], vec![0.0, 0.0]], vec![1.0, 1.0]).is_err());
    }
}
