/// Detects session end either by an explicit disconnect signal or by a
/// sustained gap with no telemetry samples (spec §4.17).
pub const NO_SAMPLE_TIMEOUT_S: f64 = 60.0;

pub struct SessionEndDetector {
    last_sample_s: Option<f64>,
    disconnected: bool,
}

impl SessionEndDetector {
    pub fn new() -> Self {
        Self {
            last_sample_s: None,
            disconnected: false,
        }
    }

    pub fn on_sample(&mut self, timestamp_s: f64) {
        self.last_sample_s = Some(timestamp_s);
    }

    pub fn on_disconnect(&mut self) {
        self.disconnected = true;
    }

    /// Call periodically (e.g. alongside the session poll) with the
    /// current clock reading.
    pub fn session_ended(&self, now_s: f64) -> bool {
        if self.disconnected {
            return true;
        }
        match self.last_sample_s {
            Some(last) => now_s - last >= NO_SAMPLE_TIMEOUT_S,
            None => false,
        }
    }
}

impl Default for SessionEndDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_end_while_samples_keep_arriving() {
        let mut detector = SessionEndDetector::new();
        detector.on_sample(0.0);
        detector.on_sample(30.0);
        assert!(!detector.session_ended(59.0));
    }

    #[test]
    fn timeout_after_sixty_seconds_of_silence() {
        let mut detector = SessionEndDetector::new();
        detector.on_sample(0.0);
        assert!(detector.session_ended(60.0));
    }

    #[test]
    fn explicit_disconnect_ends_immediately() {
        let mut detector = SessionEndDetector::new();
        detector.on_sample(0.0);
        detector.on_disconnect();
        assert!(detector.session_ended(1.0));
    }
}
