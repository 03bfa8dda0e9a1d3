use racing_coach_contracts::{MistakeEvent, MistakeType};
use serde::Serialize;

/// Response shape for [`crate::MistakeTracker::session_summary`] (spec
/// §4.13).
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionSummary {
    pub total_events: usize,
    pub total_time_loss_s: f64,
    pub most_frequent: Option<MistakeType>,
    pub most_costly: Option<MistakeType>,
    pub top_focus_areas: Vec<String>,
}

pub(crate) fn build(events: &[MistakeEvent], top_focus_areas: Vec<String>) -> SessionSummary {
    if events.is_empty() {
        return SessionSummary {
            top_focus_areas,
            ..Default::default()
        };
    }

    let mut frequency: std::collections::HashMap<MistakeType, u32> = std::collections::HashMap::new();
    let mut cost: std::collections::HashMap<MistakeType, f64> = std::collections::HashMap::new();
    let mut total_time_loss_s = 0.0;

    for event in events {
        *frequency.entry(event.mistake_type).or_insert(0) += 1;
        *cost.entry(event.mistake_type).or_insert(0.0) += event.estimated_time_loss_s;
        total_time_loss_s += event.estimated_time_loss_s;
    }

    let most_frequent = frequency.iter().max_by_key(|(_, count)| **count).map(|(t, _)| *t);
    let most_costly = cost
        .iter()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(t, _)| *t);

    SessionSummary {
        total_events: events.len(),
        total_time_loss_s,
        most_frequent,
        most_costly,
        top_focus_areas,
    }
}
