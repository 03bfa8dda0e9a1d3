//! Token-bucket rate limiting.
//!
//! The Decision Engine's remote-enrichment budget (spec §4.11, default 5
//! requests/min) and the Message Queue's dispatch cadence (spec §4.14,
//! default 1 message/2s with a burst of 3) are the same primitive at
//! different rates, so both are built on one `TokenBucket`.

use std::time::{Duration, Instant};

/// A token bucket: `capacity` tokens refill continuously at `rate_per_s`,
/// up to `capacity`. `try_acquire` is the non-blocking path used on the
/// data path; `acquire` is the async path used where the caller already
/// tolerates waiting (dispatch loops, not per-tick analyzers).
pub struct TokenBucket {
    capacity: f64,
    tokens: f64,
    rate_per_s: f64,
    last_refill: Instant,
    dropped_count: u64,
    acquired_count: u64,
}

impl TokenBucket {
    /// `capacity` is the maximum burst; `rate_per_s` is the steady-state
    /// refill rate. A bucket starts full.
    pub fn new(capacity: u32, rate_per_s: f64) -> Self {
        let capacity = capacity.max(1) as f64;
        Self {
            capacity,
            tokens: capacity,
            rate_per_s: rate_per_s.max(f64::MIN_POSITIVE),
            last_refill: Instant::now(),
            dropped_count: 0,
            acquired_count: 0,
        }
    }

    /// Convenience constructor for an N-per-minute budget with no burst
    /// beyond one token (the Decision Engine's remote budget).
    pub fn per_minute(requests_per_minute: u32) -> Self {
        Self::new(1, requests_per_minute as f64 / 60.0)
    }

    fn refill(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * self.rate_per_s).min(self.capacity);
        self.last_refill = now;
    }

    /// Non-blocking: consumes a token if one is available, otherwise
    /// records a drop and returns false. Matches the "insight is passed
    /// through unchanged when the bucket is empty" failure mode (spec
    /// §4.11).
    pub fn try_acquire(&mut self) -> bool {
        self.refill();
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            self.acquired_count += 1;
            true
        } else {
            self.dropped_count += 1;
            false
        }
    }

    /// Async variant: waits until a token is available, then consumes it.
    pub async fn acquire(&mut self) {
        loop {
            self.refill();
            if self.tokens >= 1.0 {
                self.tokens -= 1.0;
                self.acquired_count += 1;
                return;
            }
            let deficit = 1.0 - self.tokens;
            let wait = Duration::from_secs_f64((deficit / self.rate_per_s).max(0.0));
            tokio::time::sleep(wait).await;
        }
    }

    pub fn dropped_count(&self) -> u64 {
        self.dropped_count
    }

    pub fn acquired_count(&self) -> u64 {
        self.acquired_count
    }

    pub fn reset_stats(&mut self) {
        self.dropped_count = 0;
        self.acquired_count = 0;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn bucket_starts_full_and_allows_burst() {
        let mut bucket = TokenBucket::new(3, 1.0);
        assert!(bucket.try_acquire());
        assert!(bucket.try_acquire());
        assert!(bucket.try_acquire());
        assert!(!bucket.try_acquire());
        assert_eq!(bucket.acquired_count(), 3);
        assert_eq!(bucket.dropped_count(), 1);
    }

    #[test]
    fn per_minute_budget_has_no_burst() {
        let mut bucket = TokenBucket::per_minute(5);
        assert!(bucket.try_acquire());
        assert!(!bucket.try_acquire());
    }

    #[tokio::test]
    async fn acquire_waits_for_refill() {
        let mut bucket = TokenBucket::new(1, 50.0);
        bucket.acquire().await;
        let start = Instant::now();
        bucket.acquire().await;
        assert!(start.elapsed() >= Duration::from_millis(15));
    }
}
