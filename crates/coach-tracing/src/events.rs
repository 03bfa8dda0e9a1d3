//! Observability event types surfaced on the status/admin path.
//!
//! These are distinct from `CoachingMessage` (which is UI-visible coaching
//! content): an `ObservabilityEvent` is for operators/diagnostics, matching
//! spec §7's statement that UI-visible failures are limited to the status
//! endpoint and the connection indicator.

use std::fmt;

/// A single observability event, as reported by `report_error!` or emitted
/// directly by a component reaching a noteworthy state (reconnect,
/// quarantine, degraded mode).
#[derive(Debug, Clone)]
pub struct ObservabilityEvent {
    pub component: &'static str,
    pub message: String,
}

impl ObservabilityEvent {
    pub fn new(component: &'static str, message: impl Into<String>) -> Self {
        Self {
            component,
            message: message.into(),
        }
    }
}

impl fmt::Display for ObservabilityEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.component, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_component() {
        let event = ObservabilityEvent::new("fanout", "subscriber dropped");
        assert_eq!(event.to_string(), "[fanout] subscriber dropped");
    }
}
