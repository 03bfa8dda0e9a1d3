use serde::{Deserialize, Serialize};

/// Role a `ReferenceLap` plays for its (track, car) key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceRole {
    PersonalBest,
    SessionBest,
    Optimal,
    Engineer,
}

/// Per-segment reference metrics the Micro-Analyzer diffs the driver's
/// inputs against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentReference {
    pub entry_speed_kmh: f32,
    pub apex_speed_kmh: f32,
    pub exit_speed_kmh: f32,
    pub optimal_brake_point_fraction: f32,
    pub optimal_throttle_point_fraction: f32,
    pub reference_gear: i8,
    pub reference_steering_peak_rad: f32,
    pub reference_corner_time_s: f64,
}

/// Canonical comparator for a (track, car, role) triple, persisted
/// atomically by `coach-reference-store` and loaded at session start for
/// the active (track, car) (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLap {
    pub track_name: String,
    pub car_name: String,
    pub role: ReferenceRole,
    pub lap_time_s: f64,
    pub sector_times_s: Vec<f64>,
    pub segment_references: Vec<(String, SegmentReference)>,
    /// Lap number of the `LapRecord` this reference was promoted from.
    pub source_lap_number: u32,
    pub updated_at_s: f64,
}

impl ReferenceLap {
    pub fn segment_reference(&self, segment_name: &str) -> Option<&SegmentReference> {
        self.segment_references
            .iter()
            .find(|(name, _)| name == segment_name)
            .map(|(_, reference)| reference)
    }

    /// Whether `candidate_time_s` would improve this reference's role
    /// criterion. `personal_best`/`session_best` improve on a strictly
    /// lower lap time (spec §3's "decreases monotonically" invariant);
    /// `optimal`/`engineer` references are rebuilt per-sector elsewhere and
    /// always accept an explicit replacement.
    pub fn improved_by(&self, candidate_time_s: f64) -> bool {
        match self.role {
            ReferenceRole::PersonalBest | ReferenceRole::SessionBest => {
                candidate_time_s < self.lap_time_s
            }
            ReferenceRole::Optimal | ReferenceRole::Engineer => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(time: f64, role: ReferenceRole) -> ReferenceLap {
        ReferenceLap {
            track_name: "spa".into(),
            car_name: "gt3".into(),
            role,
            lap_time_s: time,
            sector_times_s: vec![],
            segment_references: vec![],
            source_lap_number: 1,
            updated_at_s: 0.0,
        }
    }

    #[test]
    fn personal_best_only_improves_on_strictly_faster_lap() {
        let r = reference(120.0, ReferenceRole::PersonalBest);
        assert!(r.improved_by(119.999));
        assert!(!r.improved_by(120.0));
        assert!(!r.improved_by(120.001));
    }
}
