//! Dual sliding-window rate limiter shared by all fetch workers.
//!
//! The provider enforces both a per-second and a per-minute call budget.
//! Every worker thread funnels through one `RateLimiter` (held in an `Arc`),
//! so the total outbound call rate stays bounded no matter how many
//! universes are being analyzed concurrently.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

/// Call budgets for the two rolling windows.
#[derive(Debug, Clone, Copy)]
pub struct RateLimits {
    /// Max calls per rolling short window (default 10 per second).
    pub per_short_window: usize,
    /// Max calls per rolling long window (default 190 per minute).
    pub per_long_window: usize,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            per_short_window: 10,
            per_long_window: 190,
        }
    }
}

#[derive(Debug)]
struct Windows {
    short: VecDeque<Instant>,
    long: VecDeque<Instant>,
}

/// Blocking admission control over two rolling windows.
///
/// `admit()` never fails; it sleeps until issuing one more call satisfies
/// both budgets, then records the call. Check-and-record happens under a
/// single lock so concurrent callers cannot jointly overrun either cap.
#[derive(Debug)]
pub struct RateLimiter {
    limits: RateLimits,
    short_window: Duration,
    long_window: Duration,
    windows: Mutex<Windows>,
}

impl RateLimiter {
    /// Limiter with the provider's real windows (1s / 60s).
    pub fn new(limits: RateLimits) -> Self {
        Self::with_windows(limits, Duration::from_secs(1), Duration::from_secs(60))
    }

    /// Limiter with custom window durations. Tests shrink these to
    /// milliseconds so admission pressure is observable without real sleeps.
    pub fn with_windows(limits: RateLimits, short_window: Duration, long_window: Duration) -> Self {
        Self {
            limits,
            short_window,
            long_window,
            windows: Mutex::new(Windows {
                short: VecDeque::new(),
                long: VecDeque::new(),
            }),
        }
    }

    /// Block until one more call fits in both windows, then record it.
    pub fn admit(&self) {
        loop {
            let wait = {
                let mut windows = self.windows.lock().unwrap();
                let now = Instant::now();
                Self::evict(&mut windows.short, now, self.short_window);
                Self::evict(&mut windows.long, now, self.long_window);

                let short_wait = Self::wait_for_slot(
                    &windows.short,
                    self.limits.per_short_window,
                    now,
                    self.short_window,
                );
                let long_wait = Self::wait_for_slot(
                    &windows.long,
                    self.limits.per_long_window,
                    now,
                    self.long_window,
                );

                match short_wait.max(long_wait) {
                    Some(wait) if !wait.is_zero() => wait,
                    _ => {
                        windows.short.push_back(now);
                        windows.long.push_back(now);
                        return;
                    }
                }
            };
            // Lock released while sleeping; re-evict and re-check on wake
            // since another thread may have claimed the freed slot.
            thread::sleep(wait);
        }
    }

    /// Current occupancy of (short, long) windows after eviction.
    pub fn occupancy(&self) -> (usize, usize) {
        let mut windows = self.windows.lock().unwrap();
        let now = Instant::now();
        Self::evict(&mut windows.short, now, self.short_window);
        Self::evict(&mut windows.long, now, self.long_window);
        (windows.short.len(), windows.long.len())
    }

    fn evict(queue: &mut VecDeque<Instant>, now: Instant, window: Duration) {
        while let Some(&oldest) = queue.front() {
            if now.duration_since(oldest) >= window {
                queue.pop_front();
            } else {
                break;
            }
        }
    }

    /// Time until the oldest retained entry leaves its window, or `None`
    /// when the cap has room right now.
    fn wait_for_slot(
        queue: &VecDeque<Instant>,
        cap: usize,
        now: Instant,
        window: Duration,
    ) -> Option<Duration> {
        if queue.len() < cap {
            return None;
        }
        queue
            .front()
            .map(|&oldest| window.saturating_sub(now.duration_since(oldest)))
    }
}
