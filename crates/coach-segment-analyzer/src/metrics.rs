use racing_coach_contracts::TelemetrySample;

/// Per-segment numbers computed once a lap's samples for that segment
/// are all in (spec §4.7).
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentMetrics {
    pub segment_name: String,
    pub time_s: f64,
    pub entry_speed_kmh: f32,
    pub exit_speed_kmh: f32,
    pub mean_throttle: f32,
    pub mean_brake: f32,
    pub max_abs_steering_rad: f32,
    pub speed_variance: f32,
    pub throttle_smoothness: f32,
    pub brake_smoothness: f32,
}

pub(crate) fn compute(segment_name: &str, samples: &[TelemetrySample]) -> Option<SegmentMetrics> {
    let first = samples.first()?;
    let last = samples.last()?;

    let n = samples.len() as f32;
    let mean_throttle = samples.iter().map(|s| s.throttle).sum::<f32>() / n;
    let mean_brake = samples.iter().map(|s| s.brake).sum::<f32>() / n;
    let max_abs_steering_rad = samples
        .iter()
        .map(|s| s.steering_rad.abs())
        .fold(0.0_f32, f32::max);

    let mean_speed = samples.iter().map(|s| s.speed_kmh).sum::<f32>() / n;
    let speed_variance = samples
        .iter()
        .map(|s| (s.speed_kmh - mean_speed).powi(2))
        .sum::<f32>()
        / n;

    Some(SegmentMetrics {
        segment_name: segment_name.to_string(),
        time_s: last.timestamp_s - first.timestamp_s,
        entry_speed_kmh: first.speed_kmh,
        exit_speed_kmh: last.speed_kmh,
        mean_throttle,
        mean_brake,
        max_abs_steering_rad,
        speed_variance,
        throttle_smoothness: running_stddev(samples.iter().map(|s| s.throttle)),
        brake_smoothness: running_stddev(samples.iter().map(|s| s.brake)),
    })
}

/// Standard deviation of consecutive-sample deltas, a proxy for input
/// smoothness (spec §4.7: "running standard deviation of each input").
fn running_stddev(values: impl Iterator<Item = f32>) -> f32 {
    let deltas: Vec<f32> = values.collect::<Vec<_>>().windows(2).map(|w| {
        let a = w.first().copied().unwrap_or(0.0);
        let b = w.get(1).copied().unwrap_or(0.0);
        b - a
    }).collect();

    if deltas.is_empty() {
        return 0.0;
    }
    let mean = deltas.iter().sum::<f32>() / deltas.len() as f32;
    let variance = deltas.iter().map(|d| (d - mean).powi(2)).sum::<f32>() / deltas.len() as f32;
    variance.sqrt()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use racing_coach_contracts::SessionKind;

    fn sample(speed: f32, throttle: f32) -> TelemetrySample {
        TelemetrySample {
            timestamp_s: 0.0,
            lap_number: 1,
            lap_distance_fraction: 0.0,
            speed_kmh: speed,
            rpm: 6000.0,
            gear: 3,
            throttle,
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
    fn entry_and_exit_speed_come_from_first_and_last_sample() {
        let samples = vec![sample(100.0, 0.5), sample(150.0, 0.8), sample(180.0, 1.0)];
        let metrics = compute("main_straight", &samples).unwrap();
        assert!((metrics.entry_speed_kmh - 100.0).abs() < 1e-6);
        assert!((metrics.exit_speed_kmh - 180.0).abs() < 1e-6);
    }

    #[test]
    fn empty_bucket_yields_no_metrics() {
        assert!(compute("turn_1", &[]).is_none());
    }
}
