use serde::{Deserialize, Serialize};

/// Closed set of classified fault types (spec §4.13's mistake-type set).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MistakeType {
    LateBrake,
    EarlyBrake,
    LateThrottle,
    EarlyThrottle,
    LowEntrySpeed,
    HighEntrySpeed,
    LowApexSpeed,
    HighApexSpeed,
    LowExitSpeed,
    Understeer,
    Oversteer,
    OffThrottleOversteer,
    TrailBrakingPoor,
    InconsistentInputs,
    EarlyApex,
    LateApex,
    PoorRacingLine,
    LineDeviation,
    LapTimeVariance,
    SectorTimeVariance,
    InputVariance,
    PoorGearSelection,
}

/// Priority bucket shared by `MistakePattern`, `MicroAnalysis`, and
/// `CoachingMessage`'s severity ordering (critical outranks the rest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

/// Direction of change in a `MistakePattern`'s recent frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Improving,
    Stable,
    Worsening,
}

/// A single classified fault, derived from one `MicroAnalysis` (spec §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MistakeEvent {
    pub id: String,
    pub timestamp_s: f64,
    pub corner_name: String,
    pub mistake_type: MistakeType,
    /// Normalized 0..=1.
    pub severity: f32,
    pub estimated_time_loss_s: f64,
    pub gear: i8,
    pub entry_speed_kmh: f32,
    pub delta: f64,
}

/// Aggregate over a (corner, mistake-type) pair, maintained by the
/// Mistake Tracker (spec §4.13).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MistakePattern {
    pub corner_name: String,
    pub mistake_type: MistakeType,
    pub frequency: u32,
    pub recent_frequency: u32,
    pub total_time_loss_s: f64,
    pub mean_time_loss_s: f64,
    pub last_occurrence_s: f64,
    pub trend: Trend,
    pub priority: Priority,
    pub description: String,
}

impl MistakePattern {
    /// Priority thresholds from spec §4.13, evaluated strictly in order.
    pub fn classify_priority(frequency: u32, mean_time_loss_s: f64) -> Priority {
        if frequency >= 5 && mean_time_loss_s >= 0.3 {
            Priority::Critical
        } else if frequency >= 3 && mean_time_loss_s >= 0.2 {
            Priority::High
        } else if frequency >= 2 && mean_time_loss_s >= 0.1 {
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
    fn priority_thresholds_evaluated_in_order() {
        assert_eq!(MistakePattern::classify_priority(5, 0.3), Priority::Critical);
        assert_eq!(MistakePattern::classify_priority(5, 0.29), Priority::High);
        assert_eq!(MistakePattern::classify_priority(3, 0.2), Priority::High);
        assert_eq!(MistakePattern::classify_priority(2, 0.1), Priority::Medium);
        assert_eq!(MistakePattern::classify_priority(1, 10.0), Priority::Low);
    }

    #[test]
    fn priority_orders_critical_above_low() {
        assert!(Priority::Critical > Priority::Low);
    }
}
