use std::collections::HashMap;

use racing_coach_contracts::{ReferenceLap, ReferenceRole, SegmentKind, SessionDescriptor, TrackSegment};
use racing_coach_lap_buffer::LapBufferManager;
use racing_coach_micro_analyzer::CornerWindow;
use racing_coach_segment_analyzer::SegmentAnalyzer;

/// Everything that resets when the driver changes track, car, or gets a
/// fresh session from the simulator (spec §3's session-change contract).
/// Owned exclusively by the pipeline task, no locking needed.
pub struct ActiveSession {
    pub descriptor: SessionDescriptor,
    pub lap_buffer: LapBufferManager,
    pub segment_analyzer: SegmentAnalyzer,
    pub corner_windows: HashMap<String, CornerWindow>,
    pub references: HashMap<ReferenceRole, ReferenceLap>,
}

impl ActiveSession {
    pub fn new(
        descriptor: SessionDescriptor,
        sector_boundaries: Vec<f32>,
        segments: Vec<TrackSegment>,
        references: HashMap<ReferenceRole, ReferenceLap>,
    ) -> Self {
        let personal_best_s = references.get(&ReferenceRole::PersonalBest).map(|r| r.lap_time_s);

        let corner_windows = segments
            .iter()
            .filter(|s| matches!(s.kind, SegmentKind::Corner | SegmentKind::Chicane))
            .map(|s| (s.name.clone(), CornerWindow::new(s.clone())))
            .collect();

        Self {
            lap_buffer: LapBufferManager::new(
                descriptor.track_config_name.clone(),
                descriptor.car_screen_name.clone(),
                sector_boundaries,
                personal_best_s,
                None,
            ),
            segment_analyzer: SegmentAnalyzer::new(segments),
            corner_windows,
            references,
            descriptor,
        }
    }

    /// Identity this session's analysis state was built for, used to
    /// decide whether an incoming descriptor is a genuine session change
    /// or just a weather/session-kind update within the same session.
    pub fn identity(&self) -> (&str, &str, &str) {
        self.descriptor.identity()
    }

    pub fn segment_reference(&self, role: ReferenceRole, segment_name: &str) -> Option<&racing_coach_contracts::SegmentReference> {
        self.references.get(&role)?.segment_reference(segment_name)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use racing_coach_contracts::SessionKind;

    fn descriptor() -> SessionDescriptor {
        SessionDescriptor {
            track_display_name: "Monza".into(),
            track_config_name: "monza".into(),
            car_screen_name: "bmw_m4_gt3".into(),
            driver_identity: "driver1".into(),
            session_kind: SessionKind::Practice,
            weather: "clear".into(),
            session_start_timestamp_s: 0.0,
        }
    }

    #[test]
    fn corner_windows_are_built_only_for_corner_and_chicane_segments() {
        let segments = vec![
            TrackSegment {
                name: "turn_1".into(),
                start_fraction: 0.0,
                end_fraction: 0.1,
                kind: SegmentKind::Corner,
                description: String::new(),
            },
            TrackSegment {
                name: "main_straight".into(),
                start_fraction: 0.1,
                end_fraction: 0.5,
                kind: SegmentKind::Straight,
                description: String::new(),
            },
        ];
        let session = ActiveSession::new(descriptor(), vec![0.0, 0.5], segments, HashMap::new());
        assert_eq!(session.corner_windows.len(), 1);
        assert!(session.corner_windows.contains_key("turn_1"));
    }
}
