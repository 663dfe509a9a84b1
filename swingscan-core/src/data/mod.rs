//! Data acquisition: rate limiting, provider client, chunked fetch, caching.

pub mod cache;
pub mod fetcher;
pub mod fyers;
pub mod provider;
pub mod rate_limiter;
pub mod universe;

pub use cache::HistoryCache;
pub use fetcher::{plan_windows, BackoffPolicy, ChunkFetcher};
pub use fyers::FyersProvider;
pub use provider::{HistoryProvider, HistoryRequest, ProviderError};
pub use rate_limiter::{RateLimiter, RateLimits};
pub use universe::{UniverseError, UniverseSet};
