use racing_coach_contracts::{MicroAnalysis, SegmentReference, TelemetrySample, TrackSegment};

use crate::analyze::analyze_corner;

/// Buffers samples while the driver is inside a corner segment and
/// produces a [`MicroAnalysis`] synchronously on exit (spec §4.9).
pub struct CornerWindow {
    segment: TrackSegment,
    active: Vec<TelemetrySample>,
}

impl CornerWindow {
    pub fn new(segment: TrackSegment) -> Self {
        Self {
            segment,
            active: Vec::new(),
        }
    }

    pub fn segment(&self) -> &TrackSegment {
        &self.segment
    }

    /// Feed one sample. Returns a [`MicroAnalysis`] the moment the
    /// sample leaves the segment, provided the window held at least two
    /// samples.
    pub fn process_sample(
        &mut self,
        sample: TelemetrySample,
        reference: Option<&SegmentReference>,
    ) -> Option<MicroAnalysis> {
        let inside = self.segment.contains(sample.lap_distance_fraction);

        if inside {
            self.active.push(sample);
            return None;
        }

        if self.active.is_empty() {
            return None;
        }

        let lap_number = self.active.first().map(|s| s.lap_number).unwrap_or(sample.lap_number);
        let analysis = analyze_corner(&self.segment.name, lap_number, &self.active, reference);
        self.active.clear();
        analysis
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use racing_coach_contracts::{SegmentKind, SessionKind};

    fn sample(frac: f32, speed: f32) -> TelemetrySample {
        TelemetrySample {
            timestamp_s: frac as f64 * 10.0,
            lap_number: 1,
            lap_distance_fraction: frac,
            speed_kmh: speed,
            rpm: 6000.0,
            gear: 3,
            throttle: 0.5,
            brake: 0.0,
            steering_rad: 0.1,
            lateral_accel_ms2: 0.0,
            longitudinal_accel_ms2: 0.0,
            fuel_liters: 50.0,
            lap_current_s: None,
            lap_last_s: None,
            lap_best_s: None,
            on_pit_road: false,
            track_name: "monza".into(),
            car_name: "bmw_m4_gt3".into(),
            session_kind: SessionKind::Practice,
            tires: None,
        }
    }

    #[test]
    fn analysis_emitted_only_on_segment_exit() {
        let segment = TrackSegment {
            name: "turn_1".to_string(),
            start_fraction: 0.1,
            end_fraction: 0.2,
            kind: SegmentKind::Corner,
            description: String::new(),
        };
        let mut window = CornerWindow::new(segment);

        assert!(window.process_sample(sample(0.05, 200.0), None).is_none());
        assert!(window.process_sample(sample(0.12, 150.0), None).is_none());
        assert!(window.process_sample(sample(0.18, 160.0), None).is_none());
        let analysis = window.process_sample(sample(0.25, 190.0), None);
        assert!(analysis.is_some());
    }
}
