//! Fyers history API provider.
//!
//! Fetches daily OHLCV candles from the Fyers v3 data API. One call covers
//! one window; the provider caps ranges at 90 calendar days, so wider spans
//! are sliced upstream by the fetcher. Handles response classification
//! (ok / no_data / invalid symbol / rate limit) and candle conversion.

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use super::provider::{HistoryProvider, HistoryRequest, ProviderError};
use crate::domain::Candle;

const HISTORY_URL: &str = "https://api-t1.fyers.in/data/history";

/// Fyers data API response.
///
/// `s` is "ok", "no_data", or "error"; candles are
/// `[epoch_secs, open, high, low, close, volume]` rows.
#[derive(Debug, Deserialize)]
struct HistoryResponse {
    s: String,
    #[serde(default)]
    candles: Vec<[f64; 6]>,
    #[serde(default)]
    message: Option<String>,
}

/// Fyers history data provider.
pub struct FyersProvider {
    client: reqwest::blocking::Client,
    client_id: String,
    access_token: String,
}

impl FyersProvider {
    pub fn new(client_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            client_id: client_id.into(),
            access_token: access_token.into(),
        }
    }

    /// Exchange-qualified symbol, e.g. "SBIN" → "NSE:SBIN-EQ".
    fn wire_symbol(ticker: &str) -> String {
        if ticker.contains(':') {
            ticker.to_string()
        } else {
            format!("NSE:{ticker}-EQ")
        }
    }

    /// Classify a provider-reported error by its message text.
    fn classify_error(symbol: &str, message: Option<String>) -> ProviderError {
        let msg = message.unwrap_or_default();
        let lower = msg.to_lowercase();
        if lower.contains("invalid symbol") || lower.contains("invalid input") {
            ProviderError::InvalidSymbol {
                symbol: symbol.to_string(),
            }
        } else if lower.contains("rate limit") || lower.contains("too many requests") {
            ProviderError::RateLimited
        } else {
            ProviderError::Provider(msg)
        }
    }

    /// Convert candle rows to `Candle`s, dropping rows with bad timestamps.
    fn to_candles(rows: Vec<[f64; 6]>) -> Result<Vec<Candle>, ProviderError> {
        let mut candles = Vec::with_capacity(rows.len());
        for row in rows {
            let date = DateTime::from_timestamp(row[0] as i64, 0)
                .map(|dt| dt.date_naive())
                .ok_or_else(|| {
                    ProviderError::MalformedResponse(format!("invalid timestamp: {}", row[0]))
                })?;
            candles.push(Candle {
                date,
                open: row[1],
                high: row[2],
                low: row[3],
                close: row[4],
                volume: row[5] as u64,
            });
        }
        Ok(candles)
    }

    fn fmt_date(date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }
}

impl HistoryProvider for FyersProvider {
    fn name(&self) -> &str {
        "fyers"
    }

    fn fetch_window(&self, request: &HistoryRequest) -> Result<Vec<Candle>, ProviderError> {
        let symbol = Self::wire_symbol(&request.symbol);
        debug!(
            symbol = %symbol,
            from = %request.range_from,
            to = %request.range_to,
            "requesting history window"
        );

        let response = self
            .client
            .get(HISTORY_URL)
            .header(
                "Authorization",
                format!("{}:{}", self.client_id, self.access_token),
            )
            .query(&[
                ("symbol", symbol.as_str()),
                ("resolution", request.resolution),
                ("date_format", "1"),
                ("range_from", &Self::fmt_date(request.range_from)),
                ("range_to", &Self::fmt_date(request.range_to)),
                ("cont_flag", if request.continuation { "1" } else { "0" }),
            ])
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(e.to_string())
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            return Err(ProviderError::Provider(format!(
                "HTTP {status} for {symbol}"
            )));
        }

        let body: HistoryResponse = response
            .json()
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        match body.s.as_str() {
            "ok" => Self::to_candles(body.candles),
            "no_data" => Ok(Vec::new()),
            _ => Err(Self::classify_error(&request.symbol, body.message)),
        }
    }
}
