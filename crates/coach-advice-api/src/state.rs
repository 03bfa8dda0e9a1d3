use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use racing_coach_contracts::LapRecord;
use racing_coach_mistake_tracker::MistakeTracker;

/// Shared read-side state for the query endpoints. The Mistake Tracker is
/// owned elsewhere (its single serializing task, per spec §5); this holds
/// only the lock queries take to read a consistent snapshot.
pub struct AdviceState {
    session_id: String,
    tracker: Arc<RwLock<MistakeTracker>>,
    laps: Arc<RwLock<Vec<LapRecord>>>,
    session_start_s: f64,
    clock_s: AtomicU64,
}

impl AdviceState {
    pub fn new(
        session_id: impl Into<String>,
        tracker: Arc<RwLock<MistakeTracker>>,
        laps: Arc<RwLock<Vec<LapRecord>>>,
        session_start_s: f64,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            tracker,
            laps,
            session_start_s,
            clock_s: AtomicU64::new(session_start_s.to_bits()),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn tracker(&self) -> &RwLock<MistakeTracker> {
        &self.tracker
    }

    pub fn laps(&self) -> &RwLock<Vec<LapRecord>> {
        &self.laps
    }

    /// The supervisor calls this on every sample so queries can compute
    /// "now" without each endpoint needing its own clock source.
    pub fn advance_clock(&self, timestamp_s: f64) {
        self.clock_s.store(timestamp_s.to_bits(), Ordering::Relaxed);
    }

    pub fn now_s(&self) -> f64 {
        f64::from_bits(self.clock_s.load(Ordering::Relaxed))
    }

    pub fn duration_s(&self) -> f64 {
        (self.now_s() - self.session_start_s).max(0.0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn duration_tracks_the_advanced_clock() {
        let state = AdviceState::new(
            "session-1",
            Arc::new(RwLock::new(MistakeTracker::new(10))),
            Arc::new(RwLock::new(Vec::new())),
            100.0,
        );
        state.advance_clock(130.0);
        assert_eq!(state.duration_s(), 30.0);
    }
}
