use racing_coach_contracts::{MistakeEvent, MistakePattern, MistakeType};
use serde::Serialize;

/// Response body for `GET /advice/session_summary` (spec §6.4).
#[derive(Debug, Clone, Serialize)]
pub struct SessionSummaryView {
    pub session_id: String,
    pub duration_s: f64,
    pub total_mistakes: usize,
    pub total_time_lost_s: f64,
    pub session_score: f32,
    pub most_common_mistakes: Vec<MistakeType>,
    pub most_costly_mistakes: Vec<MistakeType>,
    pub improvement_areas: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Response body for `GET /advice/focus_areas` (spec §6.4).
#[derive(Debug, Clone, Serialize)]
pub struct FocusAreasView {
    pub critical_focus_areas: Vec<String>,
    pub high_priority_areas: Vec<String>,
    pub session_score: f32,
    pub total_time_lost_s: f64,
    pub recommendations: Vec<String>,
}

/// Response body for `GET /advice/corner/{id}` (spec §6.4).
#[derive(Debug, Clone, Serialize)]
pub struct CornerView {
    pub corner_name: String,
    pub patterns: Vec<MistakePattern>,
    pub recent_deltas: Vec<f64>,
}

/// Response body for `GET /advice/recent_mistakes` (spec §6.4).
#[derive(Debug, Clone, Serialize)]
pub struct RecentMistakesView {
    pub window_s: f64,
    pub mistakes: Vec<MistakeEvent>,
}
