use racing_coach_contracts::CoachingInsight;
use racing_coach_rate_limiter::TokenBucket;

/// Outcome of [`DecisionEngine::decide`] (spec §4.11).
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    /// Deliver the insight as-is.
    Local(CoachingInsight),
    /// Send to the Remote NL Coach Adapter for enrichment.
    Remote(CoachingInsight),
}

/// Default remote enrichment budget (spec §4.11).
pub const DEFAULT_REMOTE_BUDGET_PER_MIN: u32 = 5;

/// Routes each `CoachingInsight` to local-only delivery or remote
/// enrichment, subject to a token-bucket budget (spec §4.11).
pub struct DecisionEngine {
    remote_budget: TokenBucket,
}

impl DecisionEngine {
    pub fn new(remote_budget: TokenBucket) -> Self {
        Self { remote_budget }
    }

    pub fn with_default_budget() -> Self {
        Self::new(TokenBucket::per_minute(DEFAULT_REMOTE_BUDGET_PER_MIN))
    }

    pub async fn decide(&mut self, insight: CoachingInsight) -> Decision {
        let wants_remote = insight.importance >= 0.7 || insight.confidence < 0.6;

        if wants_remote && self.remote_budget.try_acquire() {
            return Decision::Remote(insight);
        }

        Decision::Local(insight)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use racing_coach_contracts::{InsightSource, MessageCategory};

    fn insight(confidence: f32, importance: f32) -> CoachingInsight {
        CoachingInsight {
            text: "brake later".into(),
            category: MessageCategory::Braking,
            priority: 5,
            confidence,
            importance,
            source: InsightSource::LocalMl,
            context_snapshot: serde_json::Value::Null,
        }
    }

    #[tokio::test]
    async fn high_confidence_low_importance_stays_local() {
        let mut engine = DecisionEngine::with_default_budget();
        let decision = engine.decide(insight(0.9, 0.3)).await;
        assert!(matches!(decision, Decision::Local(_)));
    }

    #[tokio::test]
    async fn high_importance_requests_remote_when_budget_available() {
        let mut engine = DecisionEngine::with_default_budget();
        let decision = engine.decide(insight(0.9, 0.8)).await;
        assert!(matches!(decision, Decision::Remote(_)));
    }

    #[tokio::test]
    async fn exhausted_budget_falls_back_to_local() {
        let mut engine = DecisionEngine::new(TokenBucket::per_minute(1));
        engine.decide(insight(0.9, 0.9)).await;
        let decision = engine.decide(insight(0.9, 0.9)).await;
        assert!(matches!(decision, Decision::Local(_)));
    }
}
