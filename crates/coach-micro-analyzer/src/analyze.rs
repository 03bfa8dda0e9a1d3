use std::collections::HashMap;

use racing_coach_contracts::{MicroAnalysis, MistakeType, SegmentReference, TelemetrySample};

/// Brake input at or above this fraction marks the "brake point" (spec
/// §4.9).
const BRAKE_POINT_THRESHOLD: f32 = 0.05;
/// Throttle input at or above this fraction, after the apex, marks the
/// "throttle point".
const THROTTLE_POINT_THRESHOLD: f32 = 0.5;

const LATE_APEX_FRACTION: f32 = 0.55;
const EARLY_APEX_FRACTION: f32 = 0.45;
const EARLY_THROTTLE_LEVEL: f32 = 0.5;
const EARLY_THROTTLE_FRACTION: f32 = 0.55;
const LATE_THROTTLE_LEVEL: f32 = 0.3;
const LATE_THROTTLE_FRACTION: f32 = 0.65;
const TRAIL_BRAKE_MIN_DURATION_S: f64 = 0.3;
const INCONSISTENT_INPUT_STDDEV_BOUND: f32 = 0.25;

/// Since `SegmentReference` carries no peak-input figures, a full
/// (100%) input is assumed to be the reference peak, the delta is
/// then simply how far the driver's own peak falls short or over.
const ASSUMED_REFERENCE_PEAK_PCT: f32 = 100.0;

/// Computes a [`MicroAnalysis`] for one corner traversal. `samples` must
/// span the corner entry to exit, in time order. `reference` is `None`
/// when no reference lap has a record for this segment yet, in which
/// case deltas are reported against the driver's own data (zero delta).
pub fn analyze_corner(
    corner_name: &str,
    lap_number: u32,
    samples: &[TelemetrySample],
    reference: Option<&SegmentReference>,
) -> Option<MicroAnalysis> {
    let first = samples.first()?;
    let last = samples.last()?;

    let (apex_index, apex_sample) = samples
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.speed_kmh.partial_cmp(&b.1.speed_kmh).unwrap_or(std::cmp::Ordering::Equal))?;

    let corner_start_s = first.timestamp_s;
    let corner_duration_s = (last.timestamp_s - first.timestamp_s).max(1e-6);

    let brake_point = samples.iter().find(|s| s.brake >= BRAKE_POINT_THRESHOLD);
    let throttle_point = samples
        .iter()
        .skip(apex_index)
        .find(|s| s.throttle >= THROTTLE_POINT_THRESHOLD);

    let driver_brake_time_s = brake_point.map(|s| s.timestamp_s - corner_start_s);
    let driver_throttle_time_s = throttle_point.map(|s| s.timestamp_s - corner_start_s);

    let reference_brake_time_s = reference.map(|r| (r.optimal_brake_point_fraction as f64) * r.reference_corner_time_s);
    let reference_throttle_time_s =
        reference.map(|r| (r.optimal_throttle_point_fraction as f64) * r.reference_corner_time_s);

    let brake_timing_delta_s = match (driver_brake_time_s, reference_brake_time_s) {
        (Some(driver), Some(reference)) => driver - reference,
        _ => 0.0,
    };
    let throttle_timing_delta_s = match (driver_throttle_time_s, reference_throttle_time_s) {
        (Some(driver), Some(reference)) => driver - reference,
        _ => 0.0,
    };

    let entry_speed_delta_kmh = first.speed_kmh - reference.map_or(first.speed_kmh, |r| r.entry_speed_kmh);
    let apex_speed_delta_kmh = apex_sample.speed_kmh - reference.map_or(apex_sample.speed_kmh, |r| r.apex_speed_kmh);
    let exit_speed_delta_kmh = last.speed_kmh - reference.map_or(last.speed_kmh, |r| r.exit_speed_kmh);

    let peak_brake_pct = samples.iter().map(|s| s.brake * 100.0).fold(0.0_f32, f32::max);
    let peak_throttle_pct = samples.iter().map(|s| s.throttle * 100.0).fold(0.0_f32, f32::max);
    let peak_steering_rad = samples.iter().map(|s| s.steering_rad.abs()).fold(0.0_f32, f32::max);

    let peak_brake_delta_pct = peak_brake_pct - ASSUMED_REFERENCE_PEAK_PCT;
    let peak_throttle_delta_pct = peak_throttle_pct - ASSUMED_REFERENCE_PEAK_PCT;
    let peak_steering_delta_deg =
        (peak_steering_rad - reference.map_or(peak_steering_rad, |r| r.reference_steering_peak_rad)).to_degrees();

    let total_time_loss_s = MicroAnalysis::estimate_time_loss_s(
        brake_timing_delta_s,
        throttle_timing_delta_s,
        entry_speed_delta_kmh,
        apex_speed_delta_kmh,
        exit_speed_delta_kmh,
    );

    let mut time_loss_breakdown = HashMap::new();
    time_loss_breakdown.insert("brake_timing".to_string(), 0.1 * brake_timing_delta_s.abs());
    time_loss_breakdown.insert("throttle_timing".to_string(), 0.1 * throttle_timing_delta_s.abs());
    time_loss_breakdown.insert("entry_speed".to_string(), 0.01 * entry_speed_delta_kmh.abs() as f64);
    time_loss_breakdown.insert("apex_speed".to_string(), 0.02 * apex_speed_delta_kmh.abs() as f64);
    time_loss_breakdown.insert("exit_speed".to_string(), 0.01 * exit_speed_delta_kmh.abs() as f64);

    let apex_fraction = if corner_duration_s > 0.0 {
        ((apex_sample.timestamp_s - corner_start_s) / corner_duration_s) as f32
    } else {
        0.0
    };

    let mut patterns = Vec::new();
    let mut pattern_confidence = HashMap::new();
    let mut feedback = Vec::new();
    let mut safety_pattern_with_large_delta = false;

    if apex_fraction > LATE_APEX_FRACTION {
        patterns.push(MistakeType::LateApex);
        pattern_confidence.insert(MistakeType::LateApex, 0.7);
        feedback.push(format!("{corner_name}: apex taken later than ideal"));
    } else if apex_fraction < EARLY_APEX_FRACTION {
        patterns.push(MistakeType::EarlyApex);
        pattern_confidence.insert(MistakeType::EarlyApex, 0.7);
        feedback.push(format!("{corner_name}: apex taken earlier than ideal"));
    }

    let off_throttle_oversteer = samples.iter().any(|s| {
        let yaw_proxy = if s.speed_kmh > 1.0 {
            s.lateral_accel_ms2.abs() / (s.speed_kmh * s.speed_kmh)
        } else {
            0.0
        };
        yaw_proxy > 0.002 && s.throttle < 0.1
    });
    if off_throttle_oversteer {
        patterns.push(MistakeType::OffThrottleOversteer);
        pattern_confidence.insert(MistakeType::OffThrottleOversteer, 0.6);
        feedback.push(format!("{corner_name}: oversteer lifting off throttle"));
        if apex_speed_delta_kmh.abs() > 10.0 {
            safety_pattern_with_large_delta = true;
        }
    }

    let median_yaw_ratio = median(
        samples
            .iter()
            .filter(|s| s.steering_rad.abs() > 1e-3)
            .map(|s| s.lateral_accel_ms2.abs() / s.steering_rad.abs())
            .collect(),
    );
    let understeer = peak_steering_rad > 0.9 * reference.map_or(peak_steering_rad, |r| r.reference_steering_peak_rad)
        && samples.iter().any(|s| {
            s.steering_rad.abs() > 1e-3
                && (s.lateral_accel_ms2.abs() / s.steering_rad.abs()) < 0.5 * median_yaw_ratio
        });
    if understeer {
        patterns.push(MistakeType::Understeer);
        pattern_confidence.insert(MistakeType::Understeer, 0.55);
        feedback.push(format!("{corner_name}: understeer near the limit"));
        if apex_speed_delta_kmh.abs() > 10.0 {
            safety_pattern_with_large_delta = true;
        }
    }

    if trail_braking_detected(samples, peak_steering_rad) {
        patterns.push(MistakeType::TrailBrakingPoor);
        pattern_confidence.insert(MistakeType::TrailBrakingPoor, 0.5);
    }

    if let Some(point) = samples.iter().find(|s| s.throttle > EARLY_THROTTLE_LEVEL) {
        let fraction = ((point.timestamp_s - corner_start_s) / corner_duration_s) as f32;
        if fraction < EARLY_THROTTLE_FRACTION {
            patterns.push(MistakeType::EarlyThrottle);
            pattern_confidence.insert(MistakeType::EarlyThrottle, 0.5);
        }
    }
    if let Some(point) = samples.iter().rev().find(|s| s.throttle < LATE_THROTTLE_LEVEL) {
        let fraction = ((point.timestamp_s - corner_start_s) / corner_duration_s) as f32;
        if fraction > LATE_THROTTLE_FRACTION {
            patterns.push(MistakeType::LateThrottle);
            pattern_confidence.insert(MistakeType::LateThrottle, 0.5);
            feedback.push(format!("{corner_name}: throttle applied later than ideal"));
        }
    }

    let steering_stddev = stddev(samples.iter().map(|s| s.steering_rad).collect());
    if steering_stddev > INCONSISTENT_INPUT_STDDEV_BOUND {
        patterns.push(MistakeType::InconsistentInputs);
        pattern_confidence.insert(MistakeType::InconsistentInputs, 0.4);
    }

    let priority = MicroAnalysis::classify_priority(total_time_loss_s, safety_pattern_with_large_delta);

    Some(MicroAnalysis {
        corner_name: corner_name.to_string(),
        lap_number,
        brake_timing_delta_s,
        throttle_timing_delta_s,
        entry_speed_delta_kmh,
        apex_speed_delta_kmh,
        exit_speed_delta_kmh,
        peak_brake_delta_pct,
        peak_throttle_delta_pct,
        peak_steering_delta_deg,
        total_time_loss_s,
        time_loss_breakdown,
        patterns,
        pattern_confidence,
        priority,
        feedback,
    })
}

fn trail_braking_detected(samples: &[TelemetrySample], peak_steering_rad: f32) -> bool {
    if peak_steering_rad <= 0.0 {
        return false;
    }
    let mut run_start: Option<f64> = None;
    for sample in samples {
        let trail = sample.brake > 0.1 && sample.steering_rad.abs() > 0.2 * peak_steering_rad;
        match (trail, run_start) {
            (true, None) => run_start = Some(sample.timestamp_s),
            (true, Some(start)) => {
                if sample.timestamp_s - start >= TRAIL_BRAKE_MIN_DURATION_S {
                    return true;
                }
            }
            (false, _) => run_start = None,
        }
    }
    false
}

fn median(mut values: Vec<f32>) -> f32 {
    if values.is_empty() {
        return 1.0;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        let a = values.get(mid.saturating_sub(1)).copied().unwrap_or(0.0);
        let b = values.get(mid).copied().unwrap_or(0.0);
        (a + b) / 2.0
    } else {
        values.get(mid).copied().unwrap_or(0.0)
    }
}

fn stddev(values: Vec<f32>) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f32>() / values.len() as f32;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / values.len() as f32;
    variance.sqrt()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use racing_coach_contracts::SessionKind;

    fn sample(ts: f64, speed: f32, brake: f32, throttle: f32, steering: f32) -> TelemetrySample {
        TelemetrySample {
            timestamp_s: ts,
            lap_number: 1,
            lap_distance_fraction: 0.1,
            speed_kmh: speed,
            rpm: 6000.0,
            gear: 3,
            throttle,
            brake,
            steering_rad: steering,
            lateral_accel_ms2: 5.0,
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

    /// Scenario 3 (spec §8): a corner where the driver brakes 0.3s later
    /// than the reference should report a positive brake_timing_delta_s
    /// and a corresponding contribution to total_time_loss_s.
    #[test]
    fn late_braking_reports_positive_timing_delta() {
        let samples = vec![
            sample(0.0, 200.0, 0.0, 1.0, 0.0),
            sample(0.2, 180.0, 0.0, 0.0, 0.1),
            sample(0.5, 150.0, 0.8, 0.0, 0.2),
            sample(1.0, 90.0, 0.9, 0.0, 0.3),
            sample(1.5, 95.0, 0.0, 0.6, 0.1),
            sample(2.0, 130.0, 0.0, 1.0, 0.0),
        ];
        let reference = SegmentReference {
            entry_speed_kmh: 200.0,
            apex_speed_kmh: 90.0,
            exit_speed_kmh: 130.0,
            optimal_brake_point_fraction: 0.1,
            optimal_throttle_point_fraction: 0.6,
            reference_gear: 3,
            reference_steering_peak_rad: 0.3,
            reference_corner_time_s: 2.0,
        };

        let analysis = analyze_corner("turn_1", 5, &samples, Some(&reference)).unwrap();
        assert!(analysis.brake_timing_delta_s > 0.0);
        assert!(analysis.total_time_loss_s > 0.0);
    }

    #[test]
    fn no_reference_yields_zero_timing_deltas() {
        let samples = vec![sample(0.0, 200.0, 0.0, 1.0, 0.0), sample(1.0, 150.0, 0.5, 0.0, 0.1)];
        let analysis = analyze_corner("turn_2", 1, &samples, None).unwrap();
        assert!((analysis.brake_timing_delta_s).abs() < 1e-9);
        assert!((analysis.throttle_timing_delta_s).abs() < 1e-9);
    }
}
