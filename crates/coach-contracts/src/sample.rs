use serde::{Deserialize, Serialize};

use crate::session::SessionKind;

/// Per-corner tire pressure/temperature reading, present only when the
/// simulator exposes it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct TireCorner {
    pub pressure_kpa: Option<f32>,
    pub temp_celsius: Option<f32>,
}

/// One normalized simulator tick. Immutable once built; retained only by
/// the fan-out's ring buffers and whatever windowed buffer reads from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    /// Monotonic seconds since the adapter connected.
    pub timestamp_s: f64,
    pub lap_number: u32,
    /// Fraction of the lap completed, 0.0..=1.0 inclusive of the wrap tick.
    pub lap_distance_fraction: f32,
    pub speed_kmh: f32,
    pub rpm: f32,
    /// -1 = reverse, 0 = neutral, 1.. = forward gears.
    pub gear: i8,
    pub throttle: f32,
    pub brake: f32,
    /// Signed radians, positive = right lock.
    pub steering_rad: f32,
    pub lateral_accel_ms2: f32,
    pub longitudinal_accel_ms2: f32,
    pub fuel_liters: f32,
    pub lap_current_s: Option<f64>,
    pub lap_last_s: Option<f64>,
    pub lap_best_s: Option<f64>,
    pub on_pit_road: bool,
    pub track_name: String,
    pub car_name: String,
    pub session_kind: SessionKind,
    #[serde(default)]
    pub tires: Option<[TireCorner; 4]>,
}

impl TelemetrySample {
    /// Clamp throttle/brake into `[0, 1]` as required by spec §3's
    /// invariant; simulators occasionally report values fractionally
    /// outside that range due to FFB or telemetry API quirks.
    pub fn with_clamped_pedals(mut self) -> Self {
        self.throttle = self.throttle.clamp(0.0, 1.0);
        self.brake = self.brake.clamp(0.0, 1.0);
        self
    }

    /// True when `self` immediately follows a lap-distance wrap from
    /// `prev`: fraction near 1.0 followed by fraction near 0.0 with the lap
    /// number incremented (spec §3's `TelemetrySample` invariant).
    pub fn wraps_from(&self, prev: &TelemetrySample) -> bool {
        const WRAP_HIGH: f32 = 0.97;
        const WRAP_LOW: f32 = 0.03;
        prev.lap_distance_fraction >= WRAP_HIGH
            && self.lap_distance_fraction <= WRAP_LOW
            && self.lap_number == prev.lap_number + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(lap: u32, frac: f32) -> TelemetrySample {
        TelemetrySample {
            timestamp_s: 0.0,
            lap_number: lap,
            lap_distance_fraction: frac,
            speed_kmh: 0.0,
            rpm: 0.0,
            gear: 1,
            throttle: 0.0,
            brake: 0.0,
            steering_rad: 0.0,
            lateral_accel_ms2: 0.0,
            longitudinal_accel_ms2: 0.0,
            fuel_liters: 0.0,
            lap_current_s: None,
            lap_last_s: None,
            lap_best_s: None,
            on_pit_road: false,
            track_name: "test".into(),
            car_name: "test".into(),
            session_kind: SessionKind::Practice,
            tires: None,
        }
    }

    #[test]
    fn clamps_out_of_range_pedals() {
        let mut s = sample(0, 0.5);
        s.throttle = 1.2;
        s.brake = -0.1;
        let s = s.with_clamped_pedals();
        assert_eq!(s.throttle, 1.0);
        assert_eq!(s.brake, 0.0);
    }

    #[test]
    fn detects_wrap() {
        let prev = sample(0, 0.99);
        let next = sample(1, 0.01);
        assert!(next.wraps_from(&prev));
    }

    #[test]
    fn does_not_flag_mid_lap_as_wrap() {
        let prev = sample(0, 0.4);
        let next = sample(0, 0.5);
        assert!(!next.wraps_from(&prev));
    }
}
