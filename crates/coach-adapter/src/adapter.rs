use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use racing_coach_contracts::SessionDescriptor;
use racing_coach_errors::Result;
use serde_json::Value;

/// A telemetry tick as reported by the simulator, before schema
/// validation, arbitrary JSON keys, possibly using the simulator's own
/// field names (spec §4.3's rename map operates on exactly this).
pub type RawSample = HashMap<String, Value>;

/// Normalizes one simulator's native telemetry API into the canonical
/// streams. Implementations are swappable, including a mock that replays
/// recorded samples for tests (spec §4.1).
#[async_trait]
pub trait SimulatorAdapter: Send + Sync {
    fn game_id(&self) -> &str;

    /// Establish or re-establish the connection. Called once up front and
    /// again after every reconnect backoff.
    async fn connect(&mut self) -> Result<()>;

    /// Poll one telemetry tick. Errors are treated as a connection loss by
    /// the runner driving this adapter.
    async fn poll_telemetry(&mut self) -> Result<RawSample>;

    /// Poll the current session descriptor.
    async fn poll_session(&mut self) -> Result<SessionDescriptor>;

    /// Telemetry poll period; default matches spec §4.1's ~60Hz.
    fn telemetry_poll_interval(&self) -> Duration {
        Duration::from_micros(16_667)
    }

    /// Session descriptor poll period; default matches spec §4.1's 5s.
    fn session_poll_interval(&self) -> Duration {
        Duration::from_secs(5)
    }
}
