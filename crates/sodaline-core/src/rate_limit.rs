//! Client-side request pacing.
//!
//! The catalog's anonymous tier shares one quota across all unauthenticated
//! traffic; every outbound request must pass through the limiter.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Sliding-window rate limiter shared by every outbound request.
///
/// [`acquire`](RateLimiter::acquire) blocks the calling thread until one more
/// call fits inside the window, then records it. It never fails; the only
/// observable effect is delay. The mutex-guarded timestamp window is the only
/// shared state, so `acquire` is safe from concurrent callers.
pub struct RateLimiter {
    max_calls: usize,
    window: Duration,
    recent: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Allow at most `max_calls` calls per `window`.
    pub fn new(max_calls: usize, window: Duration) -> Self {
        assert!(max_calls > 0, "max_calls must be positive");
        Self {
            max_calls,
            window,
            recent: Mutex::new(VecDeque::with_capacity(max_calls)),
        }
    }

    /// Block until issuing one call would not exceed the configured rate,
    /// then account for that call.
    pub fn acquire(&self) {
        loop {
            let wait = {
                let mut recent = match self.recent.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                let now = Instant::now();
                while recent
                    .front()
                    .is_some_and(|t| now.duration_since(*t) >= self.window)
                {
                    recent.pop_front();
                }
                if recent.len() < self.max_calls {
                    recent.push_back(now);
                    return;
                }
                // Oldest call still inside the window; sleep until it leaves
                let oldest = recent[0];
                self.window - now.duration_since(oldest)
            };
            std::thread::sleep(wait);
        }
    }

    pub fn max_calls(&self) -> usize {
        self.max_calls
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Instant;

    const WINDOW: Duration = Duration::from_millis(100);

    #[test]
    fn burst_within_limit_does_not_block() {
        let limiter = RateLimiter::new(5, WINDOW);
        let start = Instant::now();
        for _ in 0..5 {
            limiter.acquire();
        }
        assert!(start.elapsed() < WINDOW);
    }

    #[test]
    fn sustained_calls_are_paced() {
        // 20 calls at 5 per window must span at least 3 full windows
        let limiter = RateLimiter::new(5, WINDOW);
        let start = Instant::now();
        for _ in 0..20 {
            limiter.acquire();
        }
        assert!(
            start.elapsed() >= WINDOW * 3,
            "20 calls finished in {:?}",
            start.elapsed()
        );
    }

    #[test]
    fn concurrent_callers_share_one_window() {
        let limiter = Arc::new(RateLimiter::new(4, WINDOW));
        let start = Instant::now();
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || {
                    for _ in 0..5 {
                        limiter.acquire();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        // 10 calls at 4 per window: call 9 cannot start before 2 windows
        assert!(
            start.elapsed() >= WINDOW * 2,
            "10 calls finished in {:?}",
            start.elapsed()
        );
    }

    #[test]
    fn window_frees_up_after_elapse() {
        let limiter = RateLimiter::new(2, Duration::from_millis(50));
        limiter.acquire();
        limiter.acquire();
        std::thread::sleep(Duration::from_millis(60));
        let start = Instant::now();
        limiter.acquire();
        assert!(start.elapsed() < Duration::from_millis(20));
    }
}
