use racing_coach_contracts::TelemetrySample;

use crate::wire::TelemetryProjection;

impl From<&TelemetrySample> for TelemetryProjection {
    fn from(sample: &TelemetrySample) -> Self {
        let delta_to_best = match (sample.lap_current_s, sample.lap_best_s) {
            (Some(current), Some(best)) => Some(current - best),
            _ => None,
        };
        Self {
            speed: sample.speed_kmh,
            rpm: sample.rpm,
            gear: sample.gear,
            throttle: sample.throttle,
            brake: sample.brake,
            steering: sample.steering_rad,
            lap: sample.lap_number,
            lap_distance_pct: sample.lap_distance_fraction,
            fuel_level: sample.fuel_liters,
            delta_to_best,
            on_pit_road: sample.on_pit_road,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use racing_coach_contracts::SessionKind;

    fn sample() -> TelemetrySample {
        TelemetrySample {
            timestamp_s: 1.0,
            lap_number: 2,
            lap_distance_fraction: 0.5,
            speed_kmh: 180.0,
            rpm: 6000.0,
            gear: 4,
            throttle: 1.0,
            brake: 0.0,
            steering_rad: 0.1,
            lateral_accel_ms2: 0.0,
            longitudinal_accel_ms2: 0.0,
            fuel_liters: 40.0,
            lap_current_s: Some(61.0),
            lap_last_s: None,
            lap_best_s: Some(60.0),
            on_pit_road: false,
            track_name: "spa".into(),
            car_name: "gt3".into(),
            session_kind: SessionKind::Practice,
            tires: None,
        }
    }

    #[test]
    fn delta_to_best_is_current_minus_best() {
        let projection = TelemetryProjection::from(&sample());
        assert_eq!(projection.delta_to_best, Some(1.0));
    }

    #[test]
    fn missing_best_yields_no_delta() {
        let mut s = sample();
        s.lap_best_s = None;
        let projection = TelemetryProjection::from(&s);
        assert_eq!(projection.delta_to_best, None);
    }
}
