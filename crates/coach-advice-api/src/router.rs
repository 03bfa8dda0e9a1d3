use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use racing_coach_contracts::{MistakePattern, Priority};
use serde::Deserialize;

use crate::recommend::recommendations_for;
use crate::score::session_score;
use crate::state::AdviceState;
use crate::views::{CornerView, FocusAreasView, RecentMistakesView, SessionSummaryView};

/// Builds the read-only advice router (spec §4.16, §6.4).
pub fn router(state: Arc<AdviceState>) -> Router {
    Router::new()
        .route("/advice/session_summary", get(session_summary))
        .route("/advice/persistent_mistakes", get(persistent_mistakes))
        .route("/advice/focus_areas", get(focus_areas))
        .route("/advice/corner/{id}", get(corner))
        .route("/advice/recent_mistakes", get(recent_mistakes))
        .with_state(state)
}

async fn session_summary(State(state): State<Arc<AdviceState>>) -> Json<SessionSummaryView> {
    let summary = state
        .tracker()
        .read()
        .unwrap_or_else(|poison| poison.into_inner())
        .session_summary();
    let duration_s = state.duration_s();
    let score = session_score(summary.total_time_loss_s, duration_s);

    Json(SessionSummaryView {
        session_id: state.session_id().to_string(),
        duration_s,
        total_mistakes: summary.total_events,
        total_time_lost_s: summary.total_time_loss_s,
        session_score: score,
        most_common_mistakes: summary.most_frequent.into_iter().collect(),
        most_costly_mistakes: summary.most_costly.into_iter().collect(),
        improvement_areas: summary.top_focus_areas.clone(),
        recommendations: recommendations_for(&summary.top_focus_areas),
    })
}

async fn persistent_mistakes(State(state): State<Arc<AdviceState>>) -> Json<Vec<MistakePattern>> {
    let patterns = state
        .tracker()
        .read()
        .unwrap_or_else(|poison| poison.into_inner())
        .persistent_mistakes();
    Json(patterns)
}

async fn focus_areas(State(state): State<Arc<AdviceState>>) -> Json<FocusAreasView> {
    let tracker = state.tracker().read().unwrap_or_else(|poison| poison.into_inner());
    let patterns = tracker.persistent_mistakes();
    let summary = tracker.session_summary();
    drop(tracker);

    let critical_focus_areas: Vec<String> = patterns
        .iter()
        .filter(|p| p.priority == Priority::Critical)
        .map(|p| p.description.clone())
        .collect();
    let high_priority_areas: Vec<String> = patterns
        .iter()
        .filter(|p| p.priority == Priority::High)
        .map(|p| p.description.clone())
        .collect();

    let duration_s = state.duration_s();
    let score = session_score(summary.total_time_loss_s, duration_s);

    Json(FocusAreasView {
        recommendations: recommendations_for(&critical_focus_areas),
        critical_focus_areas,
        high_priority_areas,
        session_score: score,
        total_time_lost_s: summary.total_time_loss_s,
    })
}

async fn corner(State(state): State<Arc<AdviceState>>, Path(id): Path<String>) -> Json<CornerView> {
    let tracker = state.tracker().read().unwrap_or_else(|poison| poison.into_inner());
    let patterns = tracker.by_corner(&id);
    let now_s = state.now_s();
    let recent_deltas: Vec<f64> = tracker
        .recent(f64::MAX / 2.0, now_s)
        .into_iter()
        .filter(|event| event.corner_name == id)
        .map(|event| event.delta)
        .collect();

    Json(CornerView {
        corner_name: id,
        patterns,
        recent_deltas,
    })
}

#[derive(Debug, Deserialize)]
struct RecentMistakesQuery {
    window_s: f64,
}

async fn recent_mistakes(
    State(state): State<Arc<AdviceState>>,
    Query(query): Query<RecentMistakesQuery>,
) -> Json<RecentMistakesView> {
    let now_s = state.now_s();
    let mistakes = state
        .tracker()
        .read()
        .unwrap_or_else(|poison| poison.into_inner())
        .recent(query.window_s, now_s);

    Json(RecentMistakesView {
        window_s: query.window_s,
        mistakes,
    })
}
