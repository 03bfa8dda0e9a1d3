use std::sync::Mutex;

use racing_coach_contracts::SessionDescriptor;
use tokio::sync::mpsc;

/// Session descriptor change fan-out. Events are rare (spec §4.2: one per
/// simulator connection attempt, not per tick), so this channel never
/// drops, each subscriber gets an unbounded queue instead of the
/// drop-oldest ring used for telemetry.
pub struct SessionFanout {
    subscribers: Mutex<Vec<mpsc::UnboundedSender<SessionDescriptor>>>,
}

impl SessionFanout {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<SessionDescriptor> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .push(tx);
        rx
    }

    /// Publish to every live subscriber; a subscriber whose receiving side
    /// closed is dropped silently (spec §4.2's failure policy).
    pub fn publish(&self, descriptor: SessionDescriptor) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());
        subscribers.retain(|tx| tx.send(descriptor.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .len()
    }
}

impl Default for SessionFanout {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use racing_coach_contracts::SessionKind;

    fn descriptor() -> SessionDescriptor {
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

    #[tokio::test]
    async fn every_subscriber_receives_every_event() {
        let fanout = SessionFanout::new();
        let mut a = fanout.subscribe();
        let mut b = fanout.subscribe();
        fanout.publish(descriptor());
        assert!(a.recv().await.is_some());
        assert!(b.recv().await.is_some());
    }

    #[tokio::test]
    async fn closed_subscriber_is_dropped_silently() {
        let fanout = SessionFanout::new();
        let rx = fanout.subscribe();
        drop(rx);
        fanout.publish(descriptor());
        assert_eq!(fanout.subscriber_count(), 0);
    }
}
