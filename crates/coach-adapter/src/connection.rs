use serde::{Deserialize, Serialize};

/// Connection lifecycle state of a Simulator Adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connecting,
    Connected,
    Reconnecting,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}

/// A connection state transition, surfaced to the UI Transport's
/// `get_status()` and connection indicator (spec §4.15, §7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionEvent {
    pub previous: ConnectionState,
    pub current: ConnectionState,
    pub reason: Option<String>,
}

impl ConnectionEvent {
    pub fn new(previous: ConnectionState, current: ConnectionState, reason: Option<String>) -> Self {
        Self {
            previous,
            current,
            reason,
        }
    }

    /// True when this transition marks the connection being lost, which
    /// per spec §4.1's contract is a hard session boundary downstream.
    pub fn is_disconnection(&self) -> bool {
        self.previous.is_connected() && !self.current.is_connected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_from_connected_is_a_disconnection() {
        let event = ConnectionEvent::new(
            ConnectionState::Connected,
            ConnectionState::Reconnecting,
            Some("timeout".into()),
        );
        assert!(event.is_disconnection());
    }

    #[test]
    fn transition_between_non_connected_states_is_not_a_disconnection() {
        let event = ConnectionEvent::new(ConnectionState::Connecting, ConnectionState::Reconnecting, None);
        assert!(!event.is_disconnection());
    }
}
