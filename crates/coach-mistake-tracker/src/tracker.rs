use std::collections::{HashMap, VecDeque};

use racing_coach_contracts::{MicroAnalysis, MistakeEvent, MistakePattern, MistakeType, Trend};
use uuid::Uuid;

use crate::summary::{self, SessionSummary};

/// Default bound on the event log (spec §4.13).
pub const DEFAULT_EVENT_LOG_CAPACITY: usize = 10_000;

/// A pattern is "persistent" once it has recurred at least this often.
const PERSISTENT_FREQUENCY_THRESHOLD: u32 = 2;

/// Trend comparison windows (spec §4.13: "last 600s" vs "those before").
const TREND_WINDOW_S: f64 = 600.0;
const TREND_CHANGE_THRESHOLD: f64 = 0.20;

/// Consumes [`MicroAnalysis`] output, splitting it into zero or more
/// [`MistakeEvent`]s and maintaining per-(corner, mistake-type)
/// aggregates (spec §4.13).
pub struct MistakeTracker {
    capacity: usize,
    events: VecDeque<MistakeEvent>,
    patterns: HashMap<(String, MistakeType), MistakePattern>,
}

impl MistakeTracker {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            events: VecDeque::new(),
            patterns: HashMap::new(),
        }
    }

    /// Records one corner's analysis, emitting an event per detected
    /// pattern and updating that pattern's aggregate.
    pub fn record(&mut self, analysis: &MicroAnalysis, now_s: f64) -> Vec<MistakeEvent> {
        let mut emitted = Vec::with_capacity(analysis.patterns.len());

        for mistake_type in &analysis.patterns {
            let severity = analysis
                .pattern_confidence
                .get(mistake_type)
                .copied()
                .unwrap_or(0.5)
                .clamp(0.0, 1.0);

            let event = MistakeEvent {
                id: Uuid::new_v4().to_string(),
                timestamp_s: now_s,
                corner_name: analysis.corner_name.clone(),
                mistake_type: *mistake_type,
                severity,
                estimated_time_loss_s: analysis.total_time_loss_s,
                gear: 0,
                entry_speed_kmh: 0.0,
                delta: analysis.brake_timing_delta_s,
            };

            self.push_event(event.clone());
            self.update_pattern(&event, now_s);
            emitted.push(event);
        }

        emitted
    }

    fn push_event(&mut self, event: MistakeEvent) {
        if self.events.len() >= self.capacity {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    fn update_pattern(&mut self, event: &MistakeEvent, now_s: f64) {
        let key = (event.corner_name.clone(), event.mistake_type);

        let recent_events: Vec<&MistakeEvent> = self
            .events
            .iter()
            .filter(|e| e.corner_name == event.corner_name && e.mistake_type == event.mistake_type)
            .collect();

        let frequency = recent_events.len() as u32;
        let total_time_loss_s: f64 = recent_events.iter().map(|e| e.estimated_time_loss_s).sum();
        let mean_time_loss_s = total_time_loss_s / frequency.max(1) as f64;

        let last_window_count = recent_events
            .iter()
            .filter(|e| now_s - e.timestamp_s <= TREND_WINDOW_S)
            .count() as u32;
        let prior_window_count = recent_events
            .iter()
            .filter(|e| {
                let age = now_s - e.timestamp_s;
                age > TREND_WINDOW_S && age <= 2.0 * TREND_WINDOW_S
            })
            .count() as u32;

        let trend = classify_trend(last_window_count, prior_window_count);
        let priority = MistakePattern::classify_priority(frequency, mean_time_loss_s);

        self.patterns.insert(
            key,
            MistakePattern {
                corner_name: event.corner_name.clone(),
                mistake_type: event.mistake_type,
                frequency,
                recent_frequency: last_window_count,
                total_time_loss_s,
                mean_time_loss_s,
                last_occurrence_s: event.timestamp_s,
                trend,
                priority,
                description: format!("{:?} at {}", event.mistake_type, event.corner_name),
            },
        );
    }

    pub fn session_summary(&self) -> SessionSummary {
        let mut persistent = self.persistent_mistakes();
        persistent.truncate(3);
        let top_focus_areas = persistent.into_iter().map(|p| p.description).collect();

        let events: Vec<MistakeEvent> = self.events.iter().cloned().collect();
        summary::build(&events, top_focus_areas)
    }

    /// Patterns with frequency ≥ 2, sorted by (priority desc, total
    /// time loss desc).
    pub fn persistent_mistakes(&self) -> Vec<MistakePattern> {
        let mut patterns: Vec<MistakePattern> = self
            .patterns
            .values()
            .filter(|p| p.frequency >= PERSISTENT_FREQUENCY_THRESHOLD)
            .cloned()
            .collect();
        patterns.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(b.total_time_loss_s.partial_cmp(&a.total_time_loss_s).unwrap_or(std::cmp::Ordering::Equal))
        });
        patterns
    }

    pub fn recent(&self, window_s: f64, now_s: f64) -> Vec<MistakeEvent> {
        self.events
            .iter()
            .filter(|e| now_s - e.timestamp_s <= window_s)
            .cloned()
            .collect()
    }

    pub fn by_corner(&self, corner_name: &str) -> Vec<MistakePattern> {
        self.patterns
            .values()
            .filter(|p| p.corner_name == corner_name)
            .cloned()
            .collect()
    }
}

fn classify_trend(last_window_count: u32, prior_window_count: u32) -> Trend {
    if prior_window_count == 0 {
        return if last_window_count == 0 { Trend::Stable } else { Trend::Worsening };
    }
    let last = last_window_count as f64;
    let prior = prior_window_count as f64;
    let change = (last - prior) / prior;

    if change <= -TREND_CHANGE_THRESHOLD {
        Trend::Improving
    } else if change >= TREND_CHANGE_THRESHOLD {
        Trend::Worsening
    } else {
        Trend::Stable
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::collections::HashMap as Map;

    fn analysis(corner: &str, pattern: MistakeType, time_loss: f64) -> MicroAnalysis {
        let mut pattern_confidence = Map::new();
        pattern_confidence.insert(pattern, 0.8);
        MicroAnalysis {
            corner_name: corner.to_string(),
            lap_number: 1,
            brake_timing_delta_s: 0.3,
            throttle_timing_delta_s: 0.0,
            entry_speed_delta_kmh: 0.0,
            apex_speed_delta_kmh: 0.0,
            exit_speed_delta_kmh: 0.0,
            peak_brake_delta_pct: 0.0,
            peak_throttle_delta_pct: 0.0,
            peak_steering_delta_deg: 0.0,
            total_time_loss_s: time_loss,
            time_loss_breakdown: Map::new(),
            patterns: vec![pattern],
            pattern_confidence,
            priority: racing_coach_contracts::Priority::Medium,
            feedback: vec![],
        }
    }

    #[test]
    fn repeated_pattern_becomes_persistent() {
        let mut tracker = MistakeTracker::new(DEFAULT_EVENT_LOG_CAPACITY);
        tracker.record(&analysis("turn_1", MistakeType::LateBrake, 0.15), 0.0);
        tracker.record(&analysis("turn_1", MistakeType::LateBrake, 0.15), 10.0);

        let persistent = tracker.persistent_mistakes();
        assert_eq!(persistent.len(), 1);
        assert_eq!(persistent[0].frequency, 2);
    }

    #[test]
    fn recent_filters_by_window() {
        let mut tracker = MistakeTracker::new(DEFAULT_EVENT_LOG_CAPACITY);
        tracker.record(&analysis("turn_1", MistakeType::LateBrake, 0.15), 0.0);
        tracker.record(&analysis("turn_1", MistakeType::LateBrake, 0.15), 100.0);

        let recent = tracker.recent(50.0, 100.0);
        assert_eq!(recent.len(), 1);
    }

    #[test]
    fn worsening_trend_when_recent_rate_rises() {
        let mut tracker = MistakeTracker::new(DEFAULT_EVENT_LOG_CAPACITY);
        // prior window: 1 occurrence around t=-700
        tracker.record(&analysis("turn_1", MistakeType::LateBrake, 0.15), 50.0);
        // last window: 3 occurrences near "now"
        tracker.record(&analysis("turn_1", MistakeType::LateBrake, 0.15), 700.0);
        tracker.record(&analysis("turn_1", MistakeType::LateBrake, 0.15), 710.0);
        tracker.record(&analysis("turn_1", MistakeType::LateBrake, 0.15), 720.0);

        let patterns = tracker.by_corner("turn_1");
        assert_eq!(patterns.len(), 1);
        assert_eq!(patterns[0].trend, Trend::Worsening);
    }

    #[test]
    fn event_log_is_bounded() {
        let mut tracker = MistakeTracker::new(2);
        tracker.record(&analysis("turn_1", MistakeType::LateBrake, 0.1), 0.0);
        tracker.record(&analysis("turn_2", MistakeType::EarlyBrake, 0.1), 1.0);
        tracker.record(&analysis("turn_3", MistakeType::Understeer, 0.1), 2.0);

        assert_eq!(tracker.recent(100.0, 2.0).len(), 2);
    }
}
