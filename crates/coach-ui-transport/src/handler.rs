use async_trait::async_trait;

use crate::wire::StatusReport;
use racing_coach_contracts::CoachingMessage;

/// Serves the control-plane requests a UI connection can make (spec
/// §4.15): history replay, coaching-mode changes, and status polling.
#[async_trait]
pub trait UiQueryHandler: Send + Sync {
    async fn get_history(&self, count: usize) -> Vec<CoachingMessage>;
    async fn set_mode(&self, mode: &str) -> Result<(), String>;
    async fn get_status(&self) -> StatusReport;
}
