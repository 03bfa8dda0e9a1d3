use std::time::Duration;

use racing_coach_contracts::SessionDescriptor;
use racing_coach_tracing::{report_error, ComponentCounters};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use crate::adapter::{RawSample, SimulatorAdapter};
use crate::backoff::ReconnectBackoff;
use crate::connection::{ConnectionEvent, ConnectionState};

/// Drives a [`SimulatorAdapter`], publishing raw telemetry ticks,
/// connection transitions, and reconnecting with jittered backoff on
/// failure (spec §4.1).
pub struct AdapterRunner {
    counters: ComponentCounters,
}

impl AdapterRunner {
    pub fn new() -> Self {
        Self {
            counters: ComponentCounters::new(),
        }
    }

    pub fn counters(&self) -> &ComponentCounters {
        &self.counters
    }

    /// Runs until `raw_tx` or `connection_tx` is dropped. On a
    /// `poll_telemetry` error, emits a disconnect event and retries
    /// `connect()` with [`ReconnectBackoff`] rather than returning.
    /// `session_tx` is polled on its own, slower cadence alongside
    /// telemetry (spec §4.1's two independent poll loops).
    pub async fn run(
        &self,
        mut adapter: Box<dyn SimulatorAdapter>,
        raw_tx: mpsc::Sender<RawSample>,
        connection_tx: mpsc::Sender<ConnectionEvent>,
        session_tx: mpsc::UnboundedSender<SessionDescriptor>,
    ) {
        let mut backoff = ReconnectBackoff::default();
        let mut state = ConnectionState::Disconnected;

        loop {
            if connection_tx
                .send(ConnectionEvent::new(state, ConnectionState::Connecting, None))
                .await
                .is_err()
            {
                return;
            }
            state = ConnectionState::Connecting;

            if let Err(err) = adapter.connect().await {
                report_error!(self.counters, err);
                let delay = backoff.next_delay();
                tokio::time::sleep(delay).await;
                continue;
            }

            if connection_tx
                .send(ConnectionEvent::new(state, ConnectionState::Connected, None))
                .await
                .is_err()
            {
                return;
            }
            state = ConnectionState::Connected;
            backoff.reset();

            let mut ticker = tokio::time::interval(adapter.telemetry_poll_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut session_ticker = tokio::time::interval(adapter.session_poll_interval());
            session_ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        match adapter.poll_telemetry().await {
                            Ok(sample) => {
                                self.counters.record_processed();
                                if raw_tx.send(sample).await.is_err() {
                                    return;
                                }
                            }
                            Err(err) => {
                                report_error!(self.counters, err);
                                let reason = Some(err.to_string());
                                if connection_tx
                                    .send(ConnectionEvent::new(state, ConnectionState::Reconnecting, reason))
                                    .await
                                    .is_err()
                                {
                                    return;
                                }
                                state = ConnectionState::Reconnecting;
                                break;
                            }
                        }
                    }
                    _ = session_ticker.tick() => {
                        if let Ok(descriptor) = adapter.poll_session().await {
                            if session_tx.send(descriptor).is_err() {
                                return;
                            }
                        }
                    }
                }
            }
        }
    }
}

impl Default for AdapterRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience for callers that just want a sane default session-poll
/// cadence without pulling in a full scheduler (spec §4.1's 5s default).
pub const DEFAULT_SESSION_POLL_INTERVAL: Duration = Duration::from_secs(5);
