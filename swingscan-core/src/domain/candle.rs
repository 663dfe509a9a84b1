//! Candle — the fundamental market data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV candle for a single symbol.
///
/// Carries a calendar date only — daily resolution has no time component.
/// A price series is a `Vec<Candle>` ascending by date with no duplicate
/// dates; [`canonicalize`] establishes that invariant after a fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Candle {
    /// Basic OHLC sanity check: high >= low, bounds contain open/close,
    /// prices positive.
    pub fn is_sane(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}

/// Sort candles ascending by date and drop duplicate dates, keeping the
/// first occurrence.
///
/// Overlapping fetch windows can hand back the same date twice; the first
/// occurrence wins so earlier windows take precedence. Idempotent: applying
/// it to an already-canonical series is a no-op.
pub fn canonicalize(mut candles: Vec<Candle>) -> Vec<Candle> {
    candles.sort_by_key(|c| c.date);
    candles.dedup_by_key(|c| c.date);
    candles
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candle(date: NaiveDate, close: f64) -> Candle {
        Candle {
            date,
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1_000,
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn candle_is_sane() {
        assert!(candle(d(2), 100.0).is_sane());
    }

    #[test]
    fn candle_detects_inverted_high_low() {
        let mut c = candle(d(2), 100.0);
        c.high = c.low - 1.0;
        assert!(!c.is_sane());
    }

    #[test]
    fn canonicalize_sorts_by_date() {
        let out = canonicalize(vec![candle(d(3), 3.0), candle(d(1), 1.0), candle(d(2), 2.0)]);
        let dates: Vec<_> = out.iter().map(|c| c.date).collect();
        assert_eq!(dates, vec![d(1), d(2), d(3)]);
    }

    #[test]
    fn canonicalize_keeps_first_duplicate() {
        let out = canonicalize(vec![candle(d(1), 100.0), candle(d(2), 2.0), candle(d(1), 999.0)]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].close, 100.0);
    }

    #[test]
    fn canonicalize_is_idempotent() {
        let once = canonicalize(vec![candle(d(2), 2.0), candle(d(1), 1.0), candle(d(2), 9.0)]);
        let twice = canonicalize(once.clone());
        assert_eq!(once, twice);
    }
}
