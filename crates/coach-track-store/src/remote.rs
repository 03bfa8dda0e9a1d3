use async_trait::async_trait;
use racing_coach_contracts::TrackSegment;

/// A remote track-metadata generator (spec §4.6's "optional remote
/// source, e.g. a language-model-backed generator"). Its output is
/// validated against [`TrackSegment`] invariants before caching; a
/// failure here is soft, the store falls back to degenerate metadata.
#[async_trait]
pub trait RemoteTrackSource: Send + Sync {
    async fn fetch_segments(&self, track_name: &str) -> anyhow::Result<Vec<TrackSegment>>;
}

/// Checks the invariants segments must hold before they're trusted: at
/// least one segment, fractions within `[0, 1]`, and `start_fraction !=
/// end_fraction` for each entry.
pub fn validate_segments(segments: &[TrackSegment]) -> Result<(), String> {
    if segments.is_empty() {
        return Err("track metadata must contain at least one segment".to_string());
    }
    for segment in segments {
        let in_range = |f: f32| (0.0..=1.0).contains(&f);
        if !in_range(segment.start_fraction) || !in_range(segment.end_fraction) {
            return Err(format!(
                "segment {:?} has an out-of-range fraction",
                segment.name
            ));
        }
        if (segment.start_fraction - segment.end_fraction).abs() < f32::EPSILON {
            return Err(format!("segment {:?} has zero length", segment.name));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use racing_coach_contracts::SegmentKind;

    fn segment(name: &str, start: f32, end: f32) -> TrackSegment {
        TrackSegment {
            name: name.to_string(),
            start_fraction: start,
            end_fraction: end,
            kind: SegmentKind::Corner,
            description: String::new(),
        }
    }

    #[test]
    fn empty_segment_list_fails_validation() {
        assert!(validate_segments(&[]).is_err());
    }

    #[test]
    fn out_of_range_fraction_fails_validation() {
        assert!(validate_segments(&[segment("t1", -0.1, 0.2)]).is_err());
    }

    #[test]
    fn well_formed_segments_pass() {
        assert!(validate_segments(&[segment("t1", 0.0, 0.2), segment("main_straight", 0.2, 0.9)]).is_ok());
    }
}
