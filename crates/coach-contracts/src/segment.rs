use serde::{Deserialize, Serialize};

/// The fixed set of segment kinds a track layout is decomposed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Corner,
    Straight,
    Chicane,
}

/// A named portion of a lap, expressed as a lap-distance-fraction range.
/// Loaded once per track from the Track Metadata Store and immutable
/// thereafter (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSegment {
    pub name: String,
    pub start_fraction: f32,
    pub end_fraction: f32,
    pub kind: SegmentKind,
    pub description: String,
}

impl TrackSegment {
    /// Whether `fraction` falls inside `[start, end)`, accounting for a
    /// segment that wraps across the start/finish line (`start > end`).
    pub fn contains(&self, fraction: f32) -> bool {
        if self.start_fraction <= self.end_fraction {
            fraction >= self.start_fraction && fraction < self.end_fraction
        } else {
            fraction >= self.start_fraction || fraction < self.end_fraction
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(start: f32, end: f32) -> TrackSegment {
        TrackSegment {
            name: "turn1".into(),
            start_fraction: start,
            end_fraction: end,
            kind: SegmentKind::Corner,
            description: String::new(),
        }
    }

    #[test]
    fn contains_within_non_wrapping_range() {
        let s = seg(0.1, 0.2);
        assert!(s.contains(0.15));
        assert!(!s.contains(0.25));
    }

    #[test]
    fn contains_across_wrap() {
        let s = seg(0.95, 0.02);
        assert!(s.contains(0.98));
        assert!(s.contains(0.01));
        assert!(!s.contains(0.5));
    }
}
