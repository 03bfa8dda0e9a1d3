use racing_coach_contracts::TelemetrySample;
use racing_coach_tracing::ComponentCounters;
use tokio::sync::broadcast;

/// Default per-subscriber queue depth (spec §5's resource policy: 256).
pub const DEFAULT_CAPACITY: usize = 256;

/// High-frequency telemetry fan-out. `tokio::sync::broadcast` already
/// gives us exactly the policy spec §4.2 asks for: publish never blocks,
/// a lagging subscriber silently drops its oldest unread samples rather
/// than slow the producer, and a subscriber that drops its receiver is
/// forgotten with no special-casing.
pub struct TelemetryFanout {
    sender: broadcast::Sender<TelemetrySample>,
    counters: ComponentCounters,
}

impl TelemetryFanout {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            counters: ComponentCounters::new(),
        }
    }

    pub fn counters(&self) -> &ComponentCounters {
        &self.counters
    }

    /// Publish one sample. Non-blocking: if there are no subscribers this
    /// is a no-op rather than an error, since the pipeline runs fine with
    /// zero UI clients attached.
    pub fn publish(&self, sample: TelemetrySample) {
        if self.sender.send(sample).is_ok() {
            self.counters.record_processed();
        }
    }

    pub fn subscribe(&self) -> TelemetrySubscriber {
        TelemetrySubscriber {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for TelemetryFanout {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// One subscriber's view of the telemetry stream. Samples are delivered
/// in production order (spec §4.2's ordering guarantee); a gap surfaces as
/// `dropped` on the next successful `recv`.
pub struct TelemetrySubscriber {
    receiver: broadcast::Receiver<TelemetrySample>,
}

/// One received item, annotated with how many samples this subscriber
/// missed immediately before it (0 when it kept up).
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery<T> {
    pub item: T,
    pub dropped: u64,
}

impl TelemetrySubscriber {
    /// Awaits the next sample, transparently absorbing lag: a lagged
    /// receiver resumes at the oldest sample still buffered and reports
    /// how many it missed, rather than erroring the caller.
    pub async fn recv(&mut self) -> Option<Delivery<TelemetrySample>> {
        let mut dropped = 0u64;
        loop {
            match self.receiver.recv().await {
                Ok(item) => return Some(Delivery { item, dropped }),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    dropped += n;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use racing_coach_contracts::SessionKind;

    fn sample(lap: u32) -> TelemetrySample {
        TelemetrySample {
            timestamp_s: lap as f64,
            lap_number: lap,
            lap_distance_fraction: 0.0,
            speed_kmh: 0.0,
            rpm: 0.0,
            gear: 1,
            throttle: 0.0,
            brake: 0.0,
            steering_rad: 0.0,
            lateral_accel_ms2: 0.0,
            longitudinal_accel_ms2: 0.0,
            fuel_liters: 0.0,
            lap_current_s: None,
            lap_last_s: None,
            lap_best_s: None,
            on_pit_road: false,
            track_name: "spa".into(),
            car_name: "gt3".into(),
            session_kind: SessionKind::Practice,
            tires: None,
        }
    }

    #[tokio::test]
    async fn subscriber_receives_in_order() {
        let fanout = TelemetryFanout::new(16);
        let mut sub = fanout.subscribe();
        fanout.publish(sample(1));
        fanout.publish(sample(2));

        let first = sub.recv().await.unwrap();
        let second = sub.recv().await.unwrap();
        assert_eq!(first.item.lap_number, 1);
        assert_eq!(second.item.lap_number, 2);
        assert_eq!(first.dropped, 0);
    }

    #[tokio::test]
    async fn publish_never_blocks_with_no_subscribers() {
        let fanout = TelemetryFanout::new(16);
        fanout.publish(sample(1));
        assert_eq!(fanout.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn slow_subscriber_drops_oldest_and_reports_lag() {
        let fanout = TelemetryFanout::new(2);
        let mut sub = fanout.subscribe();
        for lap in 1..=5 {
            fanout.publish(sample(lap));
        }
        // After lagging, the receiver resumes at the oldest value still
        // retained in the ring, not the newest.
        let delivery = sub.recv().await.unwrap();
        assert_eq!(delivery.item.lap_number, 4);
        assert!(delivery.dropped > 0);
    }
}
