use racing_coach_contracts::{CoachingMessage, SessionDescriptor};
use serde::{Deserialize, Serialize};

/// Reduced per-sample projection sent to the UI (spec §6.3).
#[derive(Debug, Clone, Serialize)]
pub struct TelemetryProjection {
    pub speed: f32,
    pub rpm: f32,
    pub gear: i8,
    pub throttle: f32,
    pub brake: f32,
    pub steering: f32,
    pub lap: u32,
    pub lap_distance_pct: f32,
    pub fuel_level: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta_to_best: Option<f64>,
    pub on_pit_road: bool,
}

/// Self-describing outbound envelope (spec §6.3).
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundFrame {
    Telemetry {
        timestamp: f64,
        data: TelemetryProjection,
    },
    SessionInfo {
        timestamp: f64,
        data: SessionDescriptor,
    },
    Coaching {
        timestamp: f64,
        id: String,
        data: CoachingMessage,
    },
    History {
        timestamp: f64,
        messages: Vec<CoachingMessage>,
    },
    Status {
        timestamp: f64,
        data: StatusReport,
    },
}

/// Response to `get_status` (spec §4.15).
#[derive(Debug, Clone, Serialize, Default)]
pub struct StatusReport {
    pub connected: bool,
    pub samples_processed: u64,
    pub samples_dropped: u64,
    pub errors: u64,
}

/// Control request from the UI (spec §6.3).
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundRequest {
    GetHistory { count: usize },
    SetMode { mode: String },
    GetStatus,
}
