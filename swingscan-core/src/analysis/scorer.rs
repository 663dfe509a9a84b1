//! Momentum scoring — trailing returns, annualized volatility, composite score.
//!
//! score = (w_long·r63 + w_mid·r21 + w_short·r5) / annualized_volatility
//!
//! The score is only defined when volatility is defined and strictly
//! positive. Zero or negative volatility means "undefined", never a division
//! blowing up to infinity. How missing lookback returns are handled is a
//! configuration choice, not an accident — see [`MissingReturnPolicy`].

use serde::{Deserialize, Serialize};

use crate::domain::{Candle, MomentumRecord};

/// Trailing lookback windows in trading bars.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Lookbacks {
    pub long: usize,
    pub mid: usize,
    pub short: usize,
}

impl Default for Lookbacks {
    fn default() -> Self {
        // ~3 months, ~1 month, ~1 week of trading days
        Self {
            long: 63,
            mid: 21,
            short: 5,
        }
    }
}

/// Weights applied to the long/mid/short trailing returns.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Weights {
    pub long: f64,
    pub mid: f64,
    pub short: f64,
}

/// What to do when a lookback return cannot be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MissingReturnPolicy {
    /// Any missing lookback return makes the whole score undefined.
    Strict,
    /// Missing lookback returns contribute 0 to the weighted sum.
    ZeroFill,
}

/// Scoring parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreConfig {
    /// Minimum candles to attempt scoring, and minimum daily returns for a
    /// defined volatility.
    pub min_points: usize,
    /// √(this) scales daily-return std to the reporting horizon.
    pub annualization_factor: f64,
    pub lookbacks: Lookbacks,
    pub weights: Weights,
    pub missing_returns: MissingReturnPolicy,
}

impl ScoreConfig {
    /// Long-biased weights over a quarterly volatility horizon; all three
    /// lookback returns required.
    pub fn strict() -> Self {
        Self {
            min_points: 5,
            annualization_factor: 63.0,
            lookbacks: Lookbacks::default(),
            weights: Weights {
                long: 0.6,
                mid: 0.3,
                short: 0.1,
            },
            missing_returns: MissingReturnPolicy::Strict,
        }
    }

    /// Short-biased weights over a yearly volatility horizon; symbols with a
    /// short history still get a (partial) score.
    pub fn degraded() -> Self {
        Self {
            min_points: 5,
            annualization_factor: 252.0,
            lookbacks: Lookbacks::default(),
            weights: Weights {
                long: 0.2,
                mid: 0.3,
                short: 0.5,
            },
            missing_returns: MissingReturnPolicy::ZeroFill,
        }
    }
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self::strict()
    }
}

/// Daily return sequence: `r[i] = close[i]/close[i-1] - 1`.
pub fn daily_returns(series: &[Candle]) -> Vec<f64> {
    series
        .windows(2)
        .map(|pair| pair[1].close / pair[0].close - 1.0)
        .collect()
}

/// Bessel-corrected standard deviation of `values`, `None` below 2 samples.
fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    Some(var.sqrt())
}

/// Trailing return over the last `lookback` bars (inclusive):
/// `close[n-1]/close[n-lookback] - 1`, defined when `n >= lookback`.
pub fn trailing_return(series: &[Candle], lookback: usize) -> Option<f64> {
    let n = series.len();
    if lookback < 2 || n < lookback {
        return None;
    }
    let base = series[n - lookback].close;
    let last = series[n - 1].close;
    if base > 0.0 && base.is_finite() && last.is_finite() {
        Some(last / base - 1.0)
    } else {
        None
    }
}

/// Score one symbol's price series.
///
/// `None` means the series is too short to say anything at all
/// (`len < min_points`). A returned record may still carry an undefined
/// score when volatility or a required lookback is undefined.
pub fn score(ticker: &str, series: &[Candle], config: &ScoreConfig) -> Option<MomentumRecord> {
    let n = series.len();
    if n < config.min_points {
        return None;
    }

    let returns = daily_returns(series);
    let volatility = if returns.len() < config.min_points {
        None
    } else {
        sample_std(&returns)
            .map(|std| std * config.annualization_factor.sqrt())
            .filter(|v| v.is_finite())
    };

    let r_long = trailing_return(series, config.lookbacks.long);
    let r_mid = trailing_return(series, config.lookbacks.mid);
    let r_short = trailing_return(series, config.lookbacks.short);

    let weighted = match config.missing_returns {
        MissingReturnPolicy::Strict => match (r_long, r_mid, r_short) {
            (Some(l), Some(m), Some(s)) => Some(
                config.weights.long * l + config.weights.mid * m + config.weights.short * s,
            ),
            _ => None,
        },
        MissingReturnPolicy::ZeroFill => Some(
            config.weights.long * r_long.unwrap_or(0.0)
                + config.weights.mid * r_mid.unwrap_or(0.0)
                + config.weights.short * r_short.unwrap_or(0.0),
        ),
    };

    let momentum_score = match (weighted, volatility) {
        (Some(w), Some(vol)) if vol > 0.0 => Some(w / vol),
        _ => None,
    };

    Some(MomentumRecord {
        ticker: ticker.to_string(),
        data_points: n,
        momentum_score,
        return_3m_pct: r_long.map(|r| r * 100.0),
        return_1m_pct: r_mid.map(|r| r * 100.0),
        return_1w_pct: r_short.map(|r| r * 100.0),
        annualized_volatility: volatility,
        last_close: series[n - 1].close,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const EPSILON: f64 = 1e-10;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPSILON,
            "expected {expected}, got {actual}"
        );
    }

    fn make_series(closes: &[f64]) -> Vec<Candle> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: (close - 1.0).max(0.1),
                close,
                volume: 1_000,
            })
            .collect()
    }

    #[test]
    fn daily_returns_basic() {
        let series = make_series(&[100.0, 110.0, 99.0]);
        let returns = daily_returns(&series);
        assert_eq!(returns.len(), 2);
        assert_approx(returns[0], 0.1);
        assert_approx(returns[1], -0.1);
    }

    #[test]
    fn trailing_return_spans_lookback_inclusive() {
        let series = make_series(&[100.0, 101.0, 102.0, 103.0, 110.0]);
        // Last 5 bars: 110/100 - 1
        assert_approx(trailing_return(&series, 5).unwrap(), 0.1);
        // Last 2 bars: 110/103 - 1
        assert_approx(trailing_return(&series, 2).unwrap(), 110.0 / 103.0 - 1.0);
        // Not enough bars
        assert!(trailing_return(&series, 6).is_none());
    }

    #[test]
    fn too_short_series_yields_no_record() {
        let series = make_series(&[100.0, 101.0, 102.0, 103.0]);
        assert!(score("X", &series, &ScoreConfig::strict()).is_none());
    }

    #[test]
    fn zero_variance_series_has_undefined_score() {
        // 70 flat closes: volatility is exactly 0 => no score, never inf
        let series = make_series(&[100.0; 70]);
        let record = score("FLAT", &series, &ScoreConfig::strict()).unwrap();
        assert_eq!(record.annualized_volatility, Some(0.0));
        assert_eq!(record.momentum_score, None);
        assert_eq!(record.data_points, 70);
    }

    #[test]
    fn strict_policy_requires_all_lookbacks() {
        // 30 bars: 1W and 1M defined, 3M missing
        let closes: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let series = make_series(&closes);

        let strict = score("X", &series, &ScoreConfig::strict()).unwrap();
        assert!(strict.return_3m_pct.is_none());
        assert!(strict.return_1m_pct.is_some());
        assert_eq!(strict.momentum_score, None);

        let degraded = score("X", &series, &ScoreConfig::degraded()).unwrap();
        assert!(degraded.momentum_score.is_some());
    }

    #[test]
    fn score_matches_hand_computation() {
        // Geometric closes: constant daily return of 1%, zero variance in
        // returns would kill the score, so perturb the last close.
        let mut closes: Vec<f64> = (0..70).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let last = closes.len() - 1;
        closes[last] *= 1.05;
        let series = make_series(&closes);

        let config = ScoreConfig::strict();
        let record = score("X", &series, &config).unwrap();

        let r63 = trailing_return(&series, 63).unwrap();
        let r21 = trailing_return(&series, 21).unwrap();
        let r5 = trailing_return(&series, 5).unwrap();
        let vol = record.annualized_volatility.unwrap();
        assert!(vol > 0.0);

        let expected = (0.6 * r63 + 0.3 * r21 + 0.1 * r5) / vol;
        assert_approx(record.momentum_score.unwrap(), expected);
        assert_approx(record.return_3m_pct.unwrap(), r63 * 100.0);
    }

    #[test]
    fn percent_fields_are_scaled_returns() {
        let closes: Vec<f64> = (0..70).map(|i| 100.0 + i as f64).collect();
        let series = make_series(&closes);
        let record = score("X", &series, &ScoreConfig::strict()).unwrap();
        assert_approx(
            record.return_1w_pct.unwrap(),
            trailing_return(&series, 5).unwrap() * 100.0,
        );
    }

    #[test]
    fn volatility_is_bessel_corrected() {
        let series = make_series(&[100.0, 110.0, 99.0, 108.9, 97.9, 108.0]);
        let returns = daily_returns(&series);
        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        let var =
            returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (returns.len() - 1) as f64;

        let record = score("X", &series, &ScoreConfig::strict()).unwrap();
        assert_approx(
            record.annualized_volatility.unwrap(),
            var.sqrt() * 63.0f64.sqrt(),
        );
    }
}
