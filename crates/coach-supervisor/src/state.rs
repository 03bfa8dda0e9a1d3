use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use racing_coach_config::CoachingMode;
use racing_coach_contracts::CoachingMessage;
use racing_coach_message_queue::MessageQueue;
use racing_coach_tracing::ComponentCounters;
use racing_coach_ui_transport::{StatusReport, UiQueryHandler};
use tokio::sync::Mutex;

/// Backs the UI Transport's control-plane requests (spec §4.15) with the
/// pipeline's own message queue, coaching-mode setting, and connection
/// counters.
pub struct PipelineQueryHandler {
    queue: Arc<Mutex<MessageQueue>>,
    coaching_mode: Arc<RwLock<CoachingMode>>,
    connected: Arc<AtomicBool>,
    counters: ComponentCounters,
}

impl PipelineQueryHandler {
    pub fn new(
        queue: Arc<Mutex<MessageQueue>>,
        coaching_mode: Arc<RwLock<CoachingMode>>,
        connected: Arc<AtomicBool>,
    ) -> Self {
        Self {
            queue,
            coaching_mode,
            connected,
            counters: ComponentCounters::new(),
        }
    }

    pub fn counters(&self) -> &ComponentCounters {
        &self.counters
    }

    pub fn mark_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Relaxed);
    }
}

fn parse_mode(mode: &str) -> Result<CoachingMode, String> {
    match mode {
        "beginner" => Ok(CoachingMode::Beginner),
        "intermediate" => Ok(CoachingMode::Intermediate),
        "advanced" => Ok(CoachingMode::Advanced),
        "race" => Ok(CoachingMode::Race),
        other => Err(format!("unknown coaching mode: {other}")),
    }
}

#[async_trait]
impl UiQueryHandler for PipelineQueryHandler {
    async fn get_history(&self, count: usize) -> Vec<CoachingMessage> {
        let history = self.queue.lock().await.recent_history();
        let skip = history.len().saturating_sub(count);
        history.into_iter().skip(skip).collect()
    }

    async fn set_mode(&self, mode: &str) -> Result<(), String> {
        let parsed = parse_mode(mode)?;
        *self
            .coaching_mode
            .write()
            .unwrap_or_else(|poison| poison.into_inner()) = parsed;
        Ok(())
    }

    async fn get_status(&self) -> StatusReport {
        let snapshot = self.counters.snapshot();
        StatusReport {
            connected: self.connected.load(Ordering::Relaxed),
            samples_processed: snapshot.processed,
            samples_dropped: snapshot.dropped,
            errors: snapshot.errors,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use racing_coach_message_queue::QueueConfig;

    #[tokio::test]
    async fn unknown_mode_is_rejected() {
        let handler = PipelineQueryHandler::new(
            Arc::new(Mutex::new(MessageQueue::new(QueueConfig::default()))),
            Arc::new(RwLock::new(CoachingMode::Intermediate)),
            Arc::new(AtomicBool::new(false)),
        );
        assert!(handler.set_mode("expert").await.is_err());
        assert!(handler.set_mode("race").await.is_ok());
    }

    #[tokio::test]
    async fn status_reflects_connection_flag() {
        let handler = PipelineQueryHandler::new(
            Arc::new(Mutex::new(MessageQueue::new(QueueConfig::default()))),
            Arc::new(RwLock::new(CoachingMode::Intermediate)),
            Arc::new(AtomicBool::new(false)),
        );
        handler.mark_connected(true);
        let status = handler.get_status().await;
        assert!(status.connected);
    }
}
