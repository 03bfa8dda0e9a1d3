use serde::{Deserialize, Serialize};

/// Metrics captured for one `TrackSegment` occurrence within a lap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentMetric {
    pub time_s: f64,
    pub entry_speed_kmh: f32,
    pub apex_speed_kmh: f32,
    pub exit_speed_kmh: f32,
}

/// A completed lap, with per-sector times and per-segment metrics.
///
/// Raw samples are referenced, not embedded: the Lap/Sector Buffer Manager
/// owns the sample window this lap was built from until it is exported or
/// the session ends (spec §3's Ownership paragraph).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LapRecord {
    pub lap_number: u32,
    pub track_name: String,
    pub car_name: String,
    pub total_time_s: f64,
    pub sector_times_s: Vec<f64>,
    pub segment_metrics: Vec<(String, SegmentMetric)>,
    /// False when the lap was off-track or had mid-lap pit entry; invalid
    /// laps never update a `ReferenceLap` (spec §3 invariant).
    pub valid: bool,
    pub created_at_s: f64,
}

impl LapRecord {
    /// Sum of sector times, for the "sector times sum to total within
    /// tolerance" invariant.
    pub fn sector_sum_s(&self) -> f64 {
        self.sector_times_s.iter().sum()
    }

    /// True if sector times reconcile with the total within `tolerance_s`.
    pub fn sectors_consistent(&self, tolerance_s: f64) -> bool {
        (self.sector_sum_s() - self.total_time_s).abs() <= tolerance_s
    }

    pub fn metric_for(&self, segment_name: &str) -> Option<&SegmentMetric> {
        self.segment_metrics
            .iter()
            .find(|(name, _)| name == segment_name)
            .map(|(_, metric)| metric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lap(total: f64, sectors: Vec<f64>) -> LapRecord {
        LapRecord {
            lap_number: 1,
            track_name: "spa".into(),
            car_name: "gt3".into(),
            total_time_s: total,
            sector_times_s: sectors,
            segment_metrics: Vec::new(),
            valid: true,
            created_at_s: 0.0,
        }
    }

    #[test]
    fn sectors_consistent_within_tolerance() {
        let l = lap(120.05, vec![40.0, 40.0, 40.0]);
        assert!(l.sectors_consistent(0.1));
    }

    #[test]
    fn sectors_inconsistent_beyond_tolerance() {
        let l = lap(125.0, vec![40.0, 40.0, 40.0]);
        assert!(!l.sectors_consistent(0.1));
    }
}
