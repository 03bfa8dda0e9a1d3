use std::time::Duration;

/// Jittered exponential backoff for simulator reconnect attempts (spec
/// §4.1: base 1s, cap 10s, jittered). Doubles on every failed attempt and
/// resets once a connection succeeds.
#[derive(Debug, Clone)]
pub struct ReconnectBackoff {
    base: Duration,
    cap: Duration,
    attempt: u32,
}

impl ReconnectBackoff {
    pub fn new(base: Duration, cap: Duration) -> Self {
        Self {
            base,
            cap,
            attempt: 0,
        }
    }

    pub fn next_delay(&mut self) -> Duration {
        let exp = self.base.saturating_mul(1u32 << self.attempt.min(16));
        let capped = exp.min(self.cap);
        self.attempt += 1;
        jittered(capped)
    }

    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

impl Default for ReconnectBackoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(10))
    }
}

/// Multiply `delay` by a random factor in `[0.5, 1.0]` so many adapters
/// reconnecting simultaneously don't hammer the same source in lockstep.
fn jittered(delay: Duration) -> Duration {
    let factor = 0.5 + rand::random::<f64>() * 0.5;
    Duration::from_secs_f64(delay.as_secs_f64() * factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_grows_and_is_capped() {
        let mut backoff = ReconnectBackoff::new(Duration::from_secs(1), Duration::from_secs(10));
        let mut previous = Duration::ZERO;
        for _ in 0..10 {
            let delay = backoff.next_delay();
            assert!(delay <= Duration::from_secs(10));
            previous = delay;
        }
        let _ = previous;
    }

    #[test]
    fn reset_restarts_from_base() {
        let mut backoff = ReconnectBackoff::new(Duration::from_secs(1), Duration::from_secs(10));
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        let delay = backoff.next_delay();
        assert!(delay <= Duration::from_secs(1));
    }
}
