use racing_coach_contracts::{SegmentMetric, SegmentReference, TelemetrySample};

/// Brake input at or above this fraction marks the brake point, mirroring
/// the Micro-Analyzer's own threshold so a freshly promoted reference is
/// measured the same way it will later be diffed against.
const BRAKE_POINT_THRESHOLD: f32 = 0.05;

/// Builds the [`SegmentReference`] promoted alongside a personal-best lap.
/// `samples` must span one segment traversal, in time order. Apex is taken
/// as the minimum-speed sample, the same heuristic `analyze_corner` uses.
pub fn build_segment_reference(samples: &[TelemetrySample]) -> Option<SegmentReference> {
    let first = samples.first()?;
    let last = samples.last()?;

    let (_, apex_sample) = samples
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.speed_kmh.partial_cmp(&b.1.speed_kmh).unwrap_or(std::cmp::Ordering::Equal))?;

    let corner_start_s = first.timestamp_s;
    let corner_duration_s = (last.timestamp_s - first.timestamp_s).max(1e-6);

    let brake_point = samples.iter().find(|s| s.brake >= BRAKE_POINT_THRESHOLD);
    let throttle_point = samples.iter().find(|s| s.speed_kmh >= apex_sample.speed_kmh && s.throttle >= 0.5);

    let optimal_brake_point_fraction = brake_point
        .map(|s| ((s.timestamp_s - corner_start_s) / corner_duration_s) as f32)
        .unwrap_or(0.0);
    let optimal_throttle_point_fraction = throttle_point
        .map(|s| ((s.timestamp_s - corner_start_s) / corner_duration_s) as f32)
        .unwrap_or(0.0);

    let reference_steering_peak_rad = samples.iter().map(|s| s.steering_rad.abs()).fold(0.0_f32, f32::max);
    let reference_gear = samples.get(samples.len() / 2).map(|s| s.gear).unwrap_or(first.gear);

    Some(SegmentReference {
        entry_speed_kmh: first.speed_kmh,
        apex_speed_kmh: apex_sample.speed_kmh,
        exit_speed_kmh: last.speed_kmh,
        optimal_brake_point_fraction,
        optimal_throttle_point_fraction,
        reference_gear,
        reference_steering_peak_rad,
        reference_corner_time_s: corner_duration_s,
    })
}

/// Converts a `SegmentAnalyzer`-computed [`SegmentMetric`] pair into the
/// `(name, metric)` shape `LapRecord::segment_metrics` expects; the Lap
/// Buffer Manager itself never sees per-segment numbers, so this is where
/// the two analyses are reunited for one completed lap.
pub fn merge_segment_metrics(
    segment_name: &str,
    metrics: &racing_coach_segment_analyzer::SegmentMetrics,
) -> (String, SegmentMetric) {
    (
        segment_name.to_string(),
        SegmentMetric {
            time_s: metrics.time_s,
            entry_speed_kmh: metrics.entry_speed_kmh,
            apex_speed_kmh: metrics.entry_speed_kmh.min(metrics.exit_speed_kmh),
            exit_speed_kmh: metrics.exit_speed_kmh,
        },
    )
}

/// Builds a [`SegmentReference`] straight from a `SegmentAnalyzer`
/// aggregate, for promotion on a personal-best lap. The Segment Analyzer
/// only ever sees per-sample aggregates, not the absolute brake/throttle
/// timing `build_segment_reference` derives from raw samples, so these
/// points are approximated from the mean input level instead.
pub fn segment_reference_from_metrics(metrics: &racing_coach_segment_analyzer::SegmentMetrics) -> SegmentReference {
    SegmentReference {
        entry_speed_kmh: metrics.entry_speed_kmh,
        apex_speed_kmh: metrics.entry_speed_kmh.min(metrics.exit_speed_kmh),
        exit_speed_kmh: metrics.exit_speed_kmh,
        optimal_brake_point_fraction: metrics.mean_brake.clamp(0.0, 1.0),
        optimal_throttle_point_fraction: (1.0 - metrics.mean_throttle).clamp(0.0, 1.0),
        reference_gear: 0,
        reference_steering_peak_rad: metrics.max_abs_steering_rad,
        reference_corner_time_s: metrics.time_s,
    }
}
