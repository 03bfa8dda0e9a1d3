use async_trait::async_trait;
use racing_coach_contracts::SessionDescriptor;
use racing_coach_errors::{CoachError, Result};

use crate::adapter::{RawSample, SimulatorAdapter};

/// Adapter that replays a fixed sequence of raw samples, for tests and for
/// running the pipeline without a live simulator (spec §4.1: "Adapter is
/// replaceable, e.g. with a mock that replays recorded samples").
pub struct MockReplayAdapter {
    game_id: String,
    samples: Vec<RawSample>,
    session: SessionDescriptor,
    cursor: usize,
    connected: bool,
}

impl MockReplayAdapter {
    pub fn new(game_id: impl Into<String>, session: SessionDescriptor, samples: Vec<RawSample>) -> Self {
        Self {
            game_id: game_id.into(),
            samples,
            session,
            cursor: 0,
            connected: false,
        }
    }
}

#[async_trait]
impl SimulatorAdapter for MockReplayAdapter {
    fn game_id(&self) -> &str {
        &self.game_id
    }

    async fn connect(&mut self) -> Result<()> {
        self.connected = true;
        Ok(())
    }

    async fn poll_telemetry(&mut self) -> Result<RawSample> {
        if !self.connected {
            return Err(CoachError::transient_io("mock adapter not connected"));
        }
        if self.cursor >= self.samples.len() {
            return Err(CoachError::transient_io("recording exhausted"));
        }
        let sample = self.samples[self.cursor].clone();
        self.cursor += 1;
        Ok(sample)
    }

    async fn poll_session(&mut self) -> Result<SessionDescriptor> {
        if !self.connected {
            return Err(CoachError::transient_io("mock adapter not connected"));
        }
        Ok(self.session.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use racing_coach_contracts::SessionKind;
    use serde_json::json;

    fn session() -> SessionDescriptor {
        SessionDescriptor {
            track_display_name: "Spa".into(),
            track_config_name: "spa_gp".into(),
            car_screen_name: "gt3".into(),
            driver_identity: "driver1".into(),
            session_kind: SessionKind::Practice,
            weather: "clear".into(),
            session_start_timestamp_s: 0.0,
        }
    }

    fn sample(lap_distance: f64) -> RawSample {
        json!({ "lap_distance_fraction": lap_distance })
            .as_object()
            .unwrap()
            .clone()
            .into_iter()
            .collect()
    }

    #[tokio::test]
    async fn replays_samples_in_order_then_errors() {
        let mut adapter = MockReplayAdapter::new("mock", session(), vec![sample(0.1), sample(0.2)]);
        adapter.connect().await.unwrap();

        let first = adapter.poll_telemetry().await.unwrap();
        assert_eq!(first.get("lap_distance_fraction").unwrap(), &json!(0.1));
        let second = adapter.poll_telemetry().await.unwrap();
        assert_eq!(second.get("lap_distance_fraction").unwrap(), &json!(0.2));
        assert!(adapter.poll_telemetry().await.is_err());
    }

    #[tokio::test]
    async fn polling_before_connect_fails() {
        let mut adapter = MockReplayAdapter::new("mock", session(), vec![sample(0.1)]);
        assert!(adapter.poll_telemetry().await.is_err());
    }
}
