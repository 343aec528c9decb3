use pagegate::guards::{ManualClock, RateLimiter};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

const WINDOW: Duration = Duration::from_millis(60_000);

fn limiter_with_clock() -> (RateLimiter, ManualClock) {
    let clock = ManualClock::default();
    (RateLimiter::with_clock(Arc::new(clock.clone())), clock)
}

// --- Fixed-window counting ---

#[test]
fn test_allows_exactly_limit_calls_per_window() {
    let (limiter, _clock) = limiter_with_clock();

    for attempt in 1..=5 {
        assert!(
            limiter.check("redeem:user-1", 5, WINDOW).ok,
            "attempt {attempt} should be allowed"
        );
    }
    assert!(!limiter.check("redeem:user-1", 5, WINDOW).ok);
}

#[test]
fn test_denial_persists_for_rest_of_window() {
    let (limiter, clock) = limiter_with_clock();

    for _ in 0..3 {
        limiter.check("k", 3, WINDOW);
    }
    for _ in 0..10 {
        clock.advance(Duration::from_secs(5));
        assert!(!limiter.check("k", 3, WINDOW).ok);
    }
}

#[test]
fn test_window_resets_after_it_elapses() {
    let (limiter, clock) = limiter_with_clock();

    for _ in 0..4 {
        limiter.check("k", 3, WINDOW);
    }
    assert!(!limiter.check("k", 3, WINDOW).ok);

    clock.advance(WINDOW + Duration::from_millis(1));
    let decision = limiter.check("k", 3, WINDOW);
    assert!(decision.ok);
    assert_eq!(decision.remaining, 2);
}

#[test]
fn test_window_does_not_reset_at_exact_boundary() {
    let (limiter, clock) = limiter_with_clock();

    assert!(limiter.check("k", 1, WINDOW).ok);
    clock.advance(WINDOW);
    assert!(!limiter.check("k", 1, WINDOW).ok);
}

#[test]
fn test_zero_limit_denies_first_call() {
    let (limiter, _clock) = limiter_with_clock();

    let decision = limiter.check("k", 0, WINDOW);
    assert!(!decision.ok);
    assert_eq!(decision.remaining, 0);
}

#[test]
fn test_chaos_scenario_hits_the_limit() {
    let limiter = RateLimiter::new();

    let results: Vec<bool> = (0..6)
        .map(|_| limiter.check_ms("chaos:abc", 3, 60_000).ok)
        .collect();

    assert!(results.iter().any(|ok| !ok));
    assert_eq!(results, vec![true, true, true, false, false, false]);
}

// --- Key independence ---

#[test]
fn test_distinct_keys_are_independent() {
    let (limiter, _clock) = limiter_with_clock();

    assert!(limiter.check("redeem:a", 1, WINDOW).ok);
    assert!(!limiter.check("redeem:a", 1, WINDOW).ok);

    assert!(limiter.check("redeem:b", 1, WINDOW).ok);
    assert!(limiter.check("email-check:a", 1, WINDOW).ok);
}

#[test]
fn test_concurrent_checks_on_one_key_lose_no_updates() {
    let limiter = Arc::new(RateLimiter::new());
    let threads = 8;
    let per_thread = 250;
    let limit = 1_000;

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let limiter = limiter.clone();
            thread::spawn(move || {
                (0..per_thread)
                    .filter(|_| limiter.check("shared", limit, Duration::from_secs(3600)).ok)
                    .count()
            })
        })
        .collect();

    let allowed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();

    // 2000 calls against a limit of 1000: exactly 1000 pass if no increment is lost.
    assert_eq!(allowed, limit as usize);
}

#[test]
fn test_concurrent_distinct_keys_do_not_interfere() {
    let limiter = Arc::new(RateLimiter::new());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let limiter = limiter.clone();
            thread::spawn(move || {
                let key = format!("redeem:user-{i}");
                (0..10)
                    .filter(|_| limiter.check(&key, 10, Duration::from_secs(3600)).ok)
                    .count()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 10);
    }
    assert_eq!(limiter.tracked_keys(), 8);
}

// --- Eviction ---

#[test]
fn test_sweep_evicts_only_expired_counters() {
    let (limiter, clock) = limiter_with_clock();

    limiter.check("old", 1, WINDOW);
    clock.advance(Duration::from_secs(90));
    limiter.check("fresh", 1, WINDOW);

    assert_eq!(limiter.sweep_expired(WINDOW), 1);
    assert_eq!(limiter.tracked_keys(), 1);

    // The surviving counter keeps its count.
    assert!(!limiter.check("fresh", 1, WINDOW).ok);
    // The evicted key starts a fresh window.
    assert!(limiter.check("old", 1, WINDOW).ok);
}

#[tokio::test(start_paused = true)]
async fn test_background_sweeper_evicts_stale_counters() {
    let clock = ManualClock::default();
    let limiter = Arc::new(RateLimiter::with_clock(Arc::new(clock.clone())));

    limiter.check("stale", 1, WINDOW);
    clock.advance(WINDOW * 2);

    let handle = limiter
        .clone()
        .spawn_sweeper(Duration::from_secs(10), WINDOW);
    tokio::time::sleep(Duration::from_secs(11)).await;

    assert_eq!(limiter.tracked_keys(), 0);
    handle.abort();
}
