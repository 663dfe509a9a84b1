//! History provider trait and error classification.
//!
//! The `HistoryProvider` trait abstracts over the upstream candle source so
//! the fetch pipeline can be exercised against scripted providers in tests.
//! The error taxonomy drives the fetcher's retry decisions: invalid symbol
//! aborts, rate limit gets a fixed pause, everything else backs off.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::Candle;

/// One window-sized request to the provider.
///
/// `range_to - range_from` never exceeds the provider's maximum range; the
/// fetcher is responsible for slicing larger spans into windows.
#[derive(Debug, Clone)]
pub struct HistoryRequest {
    pub symbol: String,
    /// Daily bars only ("D"); intraday resolutions are out of scope.
    pub resolution: &'static str,
    pub range_from: NaiveDate,
    pub range_to: NaiveDate,
    pub continuation: bool,
}

impl HistoryRequest {
    pub fn daily(symbol: impl Into<String>, range_from: NaiveDate, range_to: NaiveDate) -> Self {
        Self {
            symbol: symbol.into(),
            resolution: "D",
            range_from,
            range_to,
            continuation: true,
        }
    }
}

/// Errors a provider call can surface.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider rejected the symbol itself. Terminal for the whole
    /// symbol — retrying or requesting other windows cannot help.
    #[error("invalid symbol: {symbol}")]
    InvalidSymbol { symbol: String },

    /// Provider-side rate limit. Retried after a short fixed delay without
    /// consuming a backoff attempt.
    #[error("rate limited by provider")]
    RateLimited,

    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// Generic provider-reported failure.
    #[error("provider error: {0}")]
    Provider(String),
}

impl ProviderError {
    pub fn is_invalid_symbol(&self) -> bool {
        matches!(self, Self::InvalidSymbol { .. })
    }

    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited)
    }

    /// Transient errors are retried with exponential backoff.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout(_) | Self::MalformedResponse(_) | Self::Provider(_)
        )
    }
}

/// Trait for candle history sources.
///
/// Implementations fetch exactly one window and do no retrying of their own;
/// retry/backoff policy lives in the fetcher. An empty `Vec` is a valid
/// response meaning "no data in this window" (holiday stretch, new listing).
pub trait HistoryProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily candles for a single window.
    fn fetch_window(&self, request: &HistoryRequest) -> Result<Vec<Candle>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification_helpers() {
        assert!(ProviderError::InvalidSymbol { symbol: "X".into() }.is_invalid_symbol());
        assert!(ProviderError::RateLimited.is_rate_limit());
        assert!(ProviderError::Network("reset".into()).is_transient());
        assert!(ProviderError::Timeout("30s".into()).is_transient());
        assert!(ProviderError::MalformedResponse("bad json".into()).is_transient());
        assert!(!ProviderError::RateLimited.is_transient());
        assert!(!ProviderError::InvalidSymbol { symbol: "X".into() }.is_transient());
    }

    #[test]
    fn daily_request_defaults() {
        let req = HistoryRequest::daily(
            "SBIN",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        );
        assert_eq!(req.resolution, "D");
        assert!(req.continuation);
    }
}
