use std::time::Duration;

use async_trait::async_trait;
use racing_coach_contracts::{CoachingInsight, CoachingMessage};
use racing_coach_context::ContextSnapshot;
use racing_coach_tracing::{report_error, ComponentCounters};

/// Request timeout (spec §4.12).
pub const REMOTE_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Enriched response from a remote NL coach backend.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedAdvice {
    pub text: String,
    pub audio_payload_base64: Option<String>,
    pub confidence_hint: Option<f32>,
}

/// The only component permitted to reach network resources along the
/// coaching path (spec §4.12).
#[async_trait]
pub trait RemoteNlCoachAdapter: Send + Sync {
    async fn enrich(
        &self,
        insight: &CoachingInsight,
        context: &ContextSnapshot,
        coaching_mode: &str,
    ) -> anyhow::Result<EnrichedAdvice>;
}

/// Applies a remote adapter under §4.12's timeout and failure mode:
/// on timeout or error, the original insight is emitted unchanged.
pub async fn enrich_or_pass_through(
    adapter: &dyn RemoteNlCoachAdapter,
    insight: CoachingInsight,
    context: &ContextSnapshot,
    coaching_mode: &str,
    counters: &ComponentCounters,
) -> CoachingMessage {
    let result = tokio::time::timeout(
        REMOTE_REQUEST_TIMEOUT,
        adapter.enrich(&insight, context, coaching_mode),
    )
    .await;

    let (text, audio_payload_base64) = match result {
        Ok(Ok(advice)) => {
            counters.record_processed();
            (advice.text, advice.audio_payload_base64)
        }
        Ok(Err(err)) => {
            let err = racing_coach_errors::CoachError::transient_io(err.to_string());
            report_error!(counters, err);
            (insight.text.clone(), None)
        }
        Err(_timed_out) => {
            let err = racing_coach_errors::CoachError::transient_io("remote enrichment timed out");
            report_error!(counters, err);
            (insight.text.clone(), None)
        }
    };

    CoachingMessage {
        id: uuid::Uuid::new_v4().to_string(),
        text,
        category: insight.category,
        priority: insight.priority,
        confidence: insight.confidence,
        secondary: Vec::new(),
        improvement_potential_s: None,
        timestamp_s: 0.0,
        audio_payload_base64,
    }
}
