//! Fixed-window request rate limiting.
//!
//! Upstream providers enforce per-minute request ceilings that differ per
//! provider. [`FixedWindowLimiter`] keeps a request counter for the current
//! window; once the ceiling is reached, [`acquire`](FixedWindowLimiter::acquire)
//! suspends the caller until the window expires.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::debug;

/// Length of the default rate window.
const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// A fixed-window request counter.
///
/// Each provider client owns one limiter instance and calls
/// [`acquire`](Self::acquire) before every outbound request. The counter
/// increments on every permitted request regardless of whether that request
/// ultimately succeeds. There is no fairness guarantee across concurrent
/// callers beyond "first to take the lock proceeds".
#[derive(Debug)]
pub struct FixedWindowLimiter {
    max_requests: u32,
    window: Duration,
    state: Mutex<WindowState>,
}

#[derive(Debug)]
struct WindowState {
    count: u32,
    window_start: Instant,
}

impl FixedWindowLimiter {
    /// Creates a limiter allowing `max_requests` per `window`.
    #[must_use]
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            state: Mutex::new(WindowState {
                count: 0,
                window_start: Instant::now(),
            }),
        }
    }

    /// Creates a limiter allowing `max_requests` per rolling 60-second window.
    #[must_use]
    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, DEFAULT_WINDOW)
    }

    /// Waits until a request slot is available, then claims it.
    ///
    /// If the ceiling has been reached and the window has not yet elapsed,
    /// the caller is suspended for the remaining window time, after which
    /// the counter and window start are reset. If the window has already
    /// elapsed, the reset happens immediately without waiting.
    pub async fn acquire(&self) {
        let mut state = self.state.lock().await;

        if state.count >= self.max_requests {
            let elapsed = state.window_start.elapsed();
            if elapsed < self.window {
                let wait = self.window - elapsed;
                debug!(wait_ms = wait.as_millis() as u64, "rate limit reached, waiting");
                sleep(wait).await;
            }
            state.count = 0;
            state.window_start = Instant::now();
        }

        state.count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn acquire_proceeds_under_ceiling() {
        let limiter = FixedWindowLimiter::per_minute(5);

        let start = Instant::now();
        for _ in 0..5 {
            limiter.acquire().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn acquire_waits_for_remaining_window() {
        let limiter = FixedWindowLimiter::per_minute(5);

        for _ in 0..5 {
            limiter.acquire().await;
        }

        tokio::time::advance(Duration::from_secs(20)).await;

        // Sixth call in the same window must wait out the remaining 40s.
        let start = Instant::now();
        limiter.acquire().await;
        let waited = start.elapsed();

        assert!(waited >= Duration::from_secs(40), "waited {waited:?}");
        assert!(waited <= Duration::from_secs(60), "waited {waited:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn acquire_resets_immediately_after_window_elapses() {
        let limiter = FixedWindowLimiter::per_minute(3);

        for _ in 0..3 {
            limiter.acquire().await;
        }

        tokio::time::advance(Duration::from_secs(61)).await;

        let start = Instant::now();
        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn window_resets_counter_after_wait() {
        let limiter = FixedWindowLimiter::new(2, Duration::from_secs(10));

        limiter.acquire().await;
        limiter.acquire().await;

        // Waits out the window and opens a fresh one.
        limiter.acquire().await;

        // The fresh window has one slot used; the next call is immediate.
        let start = Instant::now();
        limiter.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
