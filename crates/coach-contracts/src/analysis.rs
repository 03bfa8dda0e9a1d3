use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::mistake::{MistakeType, Priority};

/// Output of analyzing one corner occurrence (spec §4.9). Produced
/// synchronously on corner-exit; never persisted directly, only fed
/// forward to the Mistake Tracker and Local Coach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MicroAnalysis {
    pub corner_name: String,
    pub lap_number: u32,
    /// Signed seconds, positive = later than reference.
    pub brake_timing_delta_s: f64,
    pub throttle_timing_delta_s: f64,
    /// Signed km/h, positive = faster than reference.
    pub entry_speed_delta_kmh: f32,
    pub apex_speed_delta_kmh: f32,
    pub exit_speed_delta_kmh: f32,
    pub peak_brake_delta_pct: f32,
    pub peak_throttle_delta_pct: f32,
    pub peak_steering_delta_deg: f32,
    pub total_time_loss_s: f64,
    pub time_loss_breakdown: HashMap<String, f64>,
    pub patterns: Vec<MistakeType>,
    pub pattern_confidence: HashMap<MistakeType, f32>,
    pub priority: Priority,
    pub feedback: Vec<String>,
}

impl MicroAnalysis {
    /// Time-loss estimate from spec §4.9's weighted formula. Apex speed
    /// carries double the weight of entry/exit because it is the most
    /// lap-time-sensitive measurement.
    pub fn estimate_time_loss_s(
        brake_timing_delta_s: f64,
        throttle_timing_delta_s: f64,
        entry_speed_delta_kmh: f32,
        apex_speed_delta_kmh: f32,
        exit_speed_delta_kmh: f32,
    ) -> f64 {
        0.1 * brake_timing_delta_s.abs()
            + 0.1 * throttle_timing_delta_s.abs()
            + 0.01 * entry_speed_delta_kmh.abs() as f64
            + 0.02 * apex_speed_delta_kmh.abs() as f64
            + 0.01 * exit_speed_delta_kmh.abs() as f64
    }

    /// Priority per spec §4.9: critical requires either a large time loss
    /// or a safety-relevant pattern with a large speed delta.
    pub fn classify_priority(total_time_loss_s: f64, safety_pattern_with_large_delta: bool) -> Priority {
        if total_time_loss_s >= 0.4 || safety_pattern_with_large_delta {
            Priority::Critical
        } else if total_time_loss_s >= 0.2 {
            Priority::High
        } else if total_time_loss_s >= 0.1 {
            Priority::Medium
        } else {
            Priority::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_loss_weights_apex_double() {
        let apex_only = MicroAnalysis::estimate_time_loss_s(0.0, 0.0, 0.0, 10.0, 0.0);
        let entry_only = MicroAnalysis::estimate_time_loss_s(0.0, 0.0, 10.0, 0.0, 0.0);
        assert!((apex_only - 2.0 * entry_only).abs() < 1e-9);
    }

    #[test]
    fn priority_thresholds_match_spec() {
        assert_eq!(MicroAnalysis::classify_priority(0.45, false), Priority::Critical);
        assert_eq!(MicroAnalysis::classify_priority(0.1, true), Priority::Critical);
        assert_eq!(MicroAnalysis::classify_priority(0.25, false), Priority::High);
        assert_eq!(MicroAnalysis::classify_priority(0.15, false), Priority::Medium);
        assert_eq!(MicroAnalysis::classify_priority(0.05, false), Priority::Low);
    }
}
