use racing_coach_contracts::{SessionDescriptor, TelemetrySample};
use racing_coach_ring_buffer::RingBuffer;

use crate::snapshot::{ClassifiedEvent, ContextSnapshot, ReferenceSummary, SessionHeader};

/// How many classified events the recent-history ring retains.
const EVENT_HISTORY_CAPACITY: usize = 50;

/// Maintains the 30 s sliding telemetry window and recent event
/// history, and answers structured snapshot queries (spec §4.8).
pub struct ContextBuilder {
    samples: RingBuffer<TelemetrySample>,
    events: RingBuffer<ClassifiedEvent>,
    session: Option<SessionDescriptor>,
}

impl ContextBuilder {
    /// `sample_capacity` should be sized for `buffer_duration_s *
    /// telemetry_poll_hz` at the configured poll rate.
    pub fn new(sample_capacity: usize) -> Self {
        Self {
            samples: RingBuffer::new(sample_capacity.max(1)),
            events: RingBuffer::new(EVENT_HISTORY_CAPACITY),
            session: None,
        }
    }

    pub fn set_session(&mut self, descriptor: SessionDescriptor) {
        self.session = Some(descriptor);
    }

    pub fn push_sample(&mut self, sample: TelemetrySample) {
        self.samples.push(sample);
    }

    pub fn push_event(&mut self, event: ClassifiedEvent) {
        self.events.push(event);
    }

    /// Returns every retained sample within `[event_time - pre_s,
    /// event_time + post_s]`, the full retained event history, and the
    /// given reference summary (computed by the caller, who knows the
    /// current corner's reference apex speed).
    pub fn snapshot(
        &self,
        event_time_s: f64,
        pre_s: f64,
        post_s: f64,
        reference_summary: Option<ReferenceSummary>,
    ) -> ContextSnapshot {
        let window_start = event_time_s - pre_s;
        let window_end = event_time_s + post_s;

        let samples: Vec<TelemetrySample> = self
            .samples
            .iter()
            .filter(|s| s.timestamp_s >= window_start && s.timestamp_s <= window_end)
            .cloned()
            .collect();

        let recent_events: Vec<ClassifiedEvent> = self.events.iter().cloned().collect();

        ContextSnapshot {
            session: self.session.as_ref().map(SessionHeader::from),
            samples,
            recent_events,
            reference_summary,
        }
    }
}
