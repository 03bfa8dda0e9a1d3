use racing_coach_contracts::{MistakeType, SessionDescriptor, TelemetrySample};
use serde::Serialize;

/// One entry of the recent event history carried in a snapshot (spec
/// §4.8).
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedEvent {
    pub timestamp_s: f64,
    pub corner_name: String,
    pub mistake_type: MistakeType,
}

/// Best apex speed vs driver apex speed and the running sector delta,
/// the small reference summary named in §4.8.
#[derive(Debug, Clone, Serialize)]
pub struct ReferenceSummary {
    pub best_apex_speed_kmh: f32,
    pub driver_apex_speed_kmh: f32,
    pub sector_delta_s: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionHeader {
    pub track_name: String,
    pub car_name: String,
    pub session_kind: String,
    pub driver_identity: String,
}

impl From<&SessionDescriptor> for SessionHeader {
    fn from(descriptor: &SessionDescriptor) -> Self {
        Self {
            track_name: descriptor.track_config_name.clone(),
            car_name: descriptor.car_screen_name.clone(),
            session_kind: format!("{:?}", descriptor.session_kind),
            driver_identity: descriptor.driver_identity.clone(),
        }
    }
}

/// The structured object returned by [`crate::ContextBuilder::snapshot`],
/// what the Remote NL Coach Adapter consumes for "what was happening
/// before and after this event" (§4.8).
#[derive(Debug, Clone, Serialize)]
pub struct ContextSnapshot {
    pub session: Option<SessionHeader>,
    pub samples: Vec<TelemetrySample>,
    pub recent_events: Vec<ClassifiedEvent>,
    pub reference_summary: Option<ReferenceSummary>,
}
