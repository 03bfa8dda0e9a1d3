use racing_coach_contracts::LapRecord;

/// Emitted when a lap completes (spec §4.4's `lap_completed` event).
#[derive(Debug, Clone, PartialEq)]
pub struct LapCompletion {
    pub lap: LapRecord,
    pub is_personal_best: bool,
    pub is_session_best: bool,
    /// True when the lap exceeds 1.5x the rolling 5-lap median and is
    /// therefore excluded from reference promotion even if otherwise
    /// valid.
    pub is_outlier: bool,
}

/// Emitted when a sector boundary is crossed (spec §4.4's
/// `sector_completed` event).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SectorCompletion {
    pub sector_index: usize,
    pub time_s: f64,
}
