use std::time::Duration;

/// Admission/dispatch parameters (spec §4.14's defaults).
#[derive(Debug, Clone)]
pub struct QueueConfig {
    pub dedup_window_frontend_s: f64,
    pub dedup_window_backend_s: f64,
    pub combination_window_s: f64,
    pub default_category_cooldown_s: f64,
    pub capacity: usize,
    pub history_capacity: usize,
    pub dispatch_interval: Duration,
    pub dispatch_burst: u32,
    /// Priority at/above which cooldown and dedup suppression are bypassed.
    pub critical_priority: u8,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            dedup_window_frontend_s: 12.0,
            dedup_window_backend_s: 8.0,
            combination_window_s: 3.0,
            default_category_cooldown_s: 8.0,
            capacity: 64,
            history_capacity: 100,
            dispatch_interval: Duration::from_secs(2),
            dispatch_burst: 3,
            critical_priority: 8,
        }
    }
}

/// Where an admitted message originated, the two ends use different
/// duplicate-suppression windows (spec §4.14).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOrigin {
    Frontend,
    Backend,
}
