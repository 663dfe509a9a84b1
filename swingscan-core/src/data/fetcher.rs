//! Chunked, retrying history fetcher.
//!
//! The provider refuses ranges wider than ~90 calendar days, so a symbol's
//! full history is assembled from consecutive windows. Retry scope is the
//! window, not the symbol: one bad window costs its own retry budget and is
//! then skipped, leaving the rest of the series intact. Every attempt —
//! retries included — passes through the shared rate limiter first.

use chrono::{Duration as ChronoDuration, NaiveDate};
use rand::Rng;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use super::cache::HistoryCache;
use super::provider::{HistoryProvider, HistoryRequest, ProviderError};
use super::rate_limiter::RateLimiter;
use crate::domain::{canonicalize, Candle};

/// Slice an inclusive date range into provider-sized windows.
///
/// Windows are contiguous, non-overlapping, ascending, each at most
/// `max_days` calendar days, and cover `[start, end]` exactly.
pub fn plan_windows(start: NaiveDate, end: NaiveDate, max_days: u32) -> Vec<(NaiveDate, NaiveDate)> {
    assert!(max_days >= 1, "window size must be at least one day");
    if start > end {
        return Vec::new();
    }

    let mut windows = Vec::new();
    let mut from = start;
    while from <= end {
        let to = (from + ChronoDuration::days(i64::from(max_days) - 1)).min(end);
        windows.push((from, to));
        from = to + ChronoDuration::days(1);
    }
    windows
}

/// Retry policy for transient window failures.
///
/// Kept separate from the rate limiter's delay so the two wait sources can
/// be tuned and tested independently. A provider rate-limit signal gets the
/// fixed `rate_limit_delay` and does not consume an attempt.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    /// Attempts per window before the window is skipped.
    pub max_attempts: u32,
    /// Delay after the first failed attempt; doubles per attempt.
    pub base_delay: Duration,
    /// Fixed pause after a provider rate-limit signal.
    pub rate_limit_delay: Duration,
    /// Apply ±25% jitter to backoff delays.
    pub jitter: bool,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
            rate_limit_delay: Duration::from_secs(2),
            jitter: true,
        }
    }
}

impl BackoffPolicy {
    /// Exponential delay for the given 1-based failed attempt number.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = self.base_delay.saturating_mul(1u32 << (attempt - 1).min(16));
        if self.jitter {
            let factor = rand::thread_rng().gen_range(0.75..1.25);
            exp.mul_f64(factor)
        } else {
            exp
        }
    }
}

/// Fetches one symbol's full daily history through windowing, retry, and
/// the shared rate limiter.
pub struct ChunkFetcher {
    provider: Arc<dyn HistoryProvider>,
    limiter: Arc<RateLimiter>,
    cache: Option<Arc<HistoryCache>>,
    max_window_days: u32,
    backoff: BackoffPolicy,
}

impl ChunkFetcher {
    pub fn new(provider: Arc<dyn HistoryProvider>, limiter: Arc<RateLimiter>) -> Self {
        Self {
            provider,
            limiter,
            cache: None,
            max_window_days: 90,
            backoff: BackoffPolicy::default(),
        }
    }

    /// Memoize fetched series for repeated analyses within this process.
    pub fn with_cache(mut self, cache: Arc<HistoryCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffPolicy) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn with_max_window_days(mut self, max_days: u32) -> Self {
        assert!(max_days >= 1, "window size must be at least one day");
        self.max_window_days = max_days;
        self
    }

    /// Shared rate limiter (one instance per process drives all workers).
    pub fn limiter(&self) -> &Arc<RateLimiter> {
        &self.limiter
    }

    /// Fetch the symbol's daily candles over `[start, end]`.
    ///
    /// Returns a date-sorted, deduplicated series; empty when no window
    /// yielded data or the provider rejected the symbol outright. Per-window
    /// failures are absorbed here and never propagate.
    pub fn fetch(&self, symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<Candle> {
        if let Some(cache) = &self.cache {
            if let Some(series) = cache.get(symbol, start, end) {
                debug!(symbol, "memo cache hit");
                return series.to_vec();
            }
        }

        let windows = plan_windows(start, end, self.max_window_days);
        let mut collected: Vec<Candle> = Vec::new();

        'windows: for &(from, to) in &windows {
            let request = HistoryRequest::daily(symbol, from, to);
            let mut failed_attempts = 0u32;

            loop {
                self.limiter.admit();
                match self.provider.fetch_window(&request) {
                    Ok(candles) => {
                        if candles.is_empty() {
                            debug!(symbol, from = %from, to = %to, "window has no data");
                        } else {
                            collected.extend(candles);
                        }
                        continue 'windows;
                    }
                    Err(e) if e.is_invalid_symbol() => {
                        warn!(symbol, "provider rejected symbol, aborting fetch");
                        let empty = Vec::new();
                        self.store(symbol, start, end, &empty);
                        return empty;
                    }
                    Err(e) if e.is_rate_limit() => {
                        debug!(symbol, "provider rate limit, pausing before retry");
                        thread::sleep(self.backoff.rate_limit_delay);
                    }
                    Err(e) => {
                        failed_attempts += 1;
                        if failed_attempts >= self.backoff.max_attempts {
                            warn!(
                                symbol,
                                from = %from,
                                to = %to,
                                error = %e,
                                "window failed after {failed_attempts} attempts, skipping"
                            );
                            continue 'windows;
                        }
                        let delay = self.backoff.delay_for(failed_attempts);
                        debug!(
                            symbol,
                            attempt = failed_attempts,
                            error = %e,
                            "transient window failure, backing off {delay:?}"
                        );
                        thread::sleep(delay);
                    }
                }
            }
        }

        let series = canonicalize(collected);
        self.store(symbol, start, end, &series);
        series
    }

    fn store(&self, symbol: &str, start: NaiveDate, end: NaiveDate, series: &[Candle]) {
        if let Some(cache) = &self.cache {
            cache.put(symbol, start, end, series.to_vec());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn windows_cover_range_exactly() {
        let windows = plan_windows(d(2024, 1, 1), d(2024, 3, 31), 30);
        assert_eq!(windows.first().unwrap().0, d(2024, 1, 1));
        assert_eq!(windows.last().unwrap().1, d(2024, 3, 31));
        for pair in windows.windows(2) {
            assert_eq!(pair[0].1 + ChronoDuration::days(1), pair[1].0);
        }
        for &(from, to) in &windows {
            assert!((to - from).num_days() < 30);
        }
    }

    #[test]
    fn window_count_is_ceiling() {
        // 400 days / 90-day windows => ceil(400/90) = 5
        let start = d(2023, 1, 1);
        let end = start + ChronoDuration::days(399);
        assert_eq!(plan_windows(start, end, 90).len(), 5);
    }

    #[test]
    fn single_day_range_is_one_window() {
        let windows = plan_windows(d(2024, 1, 1), d(2024, 1, 1), 90);
        assert_eq!(windows, vec![(d(2024, 1, 1), d(2024, 1, 1))]);
    }

    #[test]
    fn inverted_range_yields_no_windows() {
        assert!(plan_windows(d(2024, 2, 1), d(2024, 1, 1), 90).is_empty());
    }

    #[test]
    fn backoff_doubles_per_attempt() {
        let policy = BackoffPolicy {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
            rate_limit_delay: Duration::ZERO,
            jitter: false,
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
    }

    #[test]
    fn backoff_jitter_stays_in_band() {
        let policy = BackoffPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
            rate_limit_delay: Duration::ZERO,
            jitter: true,
        };
        for _ in 0..50 {
            let delay = policy.delay_for(1);
            assert!(delay >= Duration::from_millis(75));
            assert!(delay < Duration::from_millis(125));
        }
    }
}
