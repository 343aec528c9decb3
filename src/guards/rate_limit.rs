use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use super::clock::{Clock, SystemClock};

/// Windows shorter than this are clamped up to it, keeping `check` total.
const MIN_WINDOW: Duration = Duration::from_millis(1);

/// Per-key state. Never leaves this module.
#[derive(Debug, Clone, Copy)]
struct RateWindowCounter {
    count: u32,
    window_started_at: Instant,
}

/// RateLimitDecision
///
/// The verdict for a single `check` call. `ok` is the only field callers must act on;
/// `remaining` and `reset_after` exist so a handler can emit a `Retry-After` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub ok: bool,
    /// Calls still allowed in the current window (0 once exhausted).
    pub remaining: u32,
    /// Time until the current window ends and the count resets.
    pub reset_after: Duration,
}

/// RateLimiter
///
/// Fixed-window counter keyed by an opaque string (e.g. `"redeem:<user id>"`).
///
/// *Concurrency*: counters live in a sharded `DashMap`. The whole
/// read → maybe reset → increment → compare sequence runs while holding the entry guard
/// for that key, so concurrent checks for one key never lose an increment, and keys that
/// land on different shards never wait on each other. The map itself is never exposed.
///
/// *Counting*: every call increments, including denied ones, so sustained abuse inside
/// an exhausted window keeps registering and the denial persists until the window ends.
pub struct RateLimiter {
    counters: DashMap<String, RateWindowCounter>,
    clock: Arc<dyn Clock>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiter {
    /// Creates a limiter driven by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            counters: DashMap::new(),
            clock,
        }
    }

    /// check
    ///
    /// Records one event for `key` and reports whether it fits within `limit` events per
    /// `window`. A `limit` of 0 denies from the first call. A zero `window` is clamped to
    /// one millisecond.
    ///
    /// The window for a key starts at its first event and resets on the first event
    /// after more than `window` has elapsed.
    pub fn check(&self, key: &str, limit: u32, window: Duration) -> RateLimitDecision {
        let window = window.max(MIN_WINDOW);
        let now = self.clock.now();

        let mut counter = self
            .counters
            .entry(key.to_owned())
            .or_insert(RateWindowCounter {
                count: 0,
                window_started_at: now,
            });

        if now.saturating_duration_since(counter.window_started_at) > window {
            counter.count = 0;
            counter.window_started_at = now;
        }

        counter.count = counter.count.saturating_add(1);

        let elapsed = now.saturating_duration_since(counter.window_started_at);
        RateLimitDecision {
            ok: counter.count <= limit,
            remaining: limit.saturating_sub(counter.count),
            reset_after: window.saturating_sub(elapsed),
        }
    }

    /// Millisecond form of [`RateLimiter::check`].
    pub fn check_ms(&self, key: &str, limit: u32, window_ms: u64) -> RateLimitDecision {
        self.check(key, limit, Duration::from_millis(window_ms))
    }

    /// sweep_expired
    ///
    /// Drops counters whose window started more than `max_age` ago and returns how many
    /// were removed. Purely a memory bound: an evicted key behaves exactly like one whose
    /// window expired, since the next check starts a fresh window either way, provided
    /// `max_age` is at least as long as the longest window in use.
    pub fn sweep_expired(&self, max_age: Duration) -> usize {
        let now = self.clock.now();
        let mut evicted = 0;
        self.counters.retain(|_, counter| {
            let keep = now.saturating_duration_since(counter.window_started_at) <= max_age;
            if !keep {
                evicted += 1;
            }
            keep
        });
        evicted
    }

    /// Number of keys currently holding a counter.
    pub fn tracked_keys(&self) -> usize {
        self.counters.len()
    }

    /// spawn_sweeper
    ///
    /// Runs `sweep_expired(max_age)` every `every` on the tokio runtime for the life of
    /// the process. Must be called from within a runtime.
    pub fn spawn_sweeper(self: Arc<Self>, every: Duration, max_age: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every.max(MIN_WINDOW));
            // The first tick completes immediately; skip it so the first sweep is one period in.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let evicted = self.sweep_expired(max_age);
                if evicted > 0 {
                    tracing::debug!(evicted, remaining = self.tracked_keys(), "Swept expired rate-limit counters");
                }
            }
        })
    }
}
