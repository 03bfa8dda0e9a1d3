use serde::{Deserialize, Serialize};

/// Closed set of coaching categories (spec §4.10).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageCategory {
    Braking,
    Throttle,
    Cornering,
    RacingLine,
    Consistency,
    Tires,
    Fuel,
    Strategy,
    Safety,
    Baseline,
    Technique,
    General,
}

/// Where a `CoachingInsight`'s text ultimately came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightSource {
    LocalMl,
    Remote,
    Combined,
}

/// Candidate message produced by an analyzer, before queue admission
/// (spec §3). `priority` is an integer 1..=10, distinct from the
/// four-bucket `Priority` enum used elsewhere, the Message Queue orders
/// on this finer scale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachingInsight {
    pub text: String,
    pub category: MessageCategory,
    pub priority: u8,
    pub confidence: f32,
    pub importance: f32,
    pub source: InsightSource,
    /// Opaque structured-context snapshot carried for remote enrichment;
    /// not interpreted by the queue itself.
    pub context_snapshot: serde_json::Value,
}

/// A secondary message bundled inside a dispatched `CoachingMessage`
/// (e.g. from semantic combination).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecondaryMessage {
    pub text: String,
    pub category: MessageCategory,
}

/// A coaching event as delivered to the UI (spec §3, wire format §6.3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoachingMessage {
    pub id: String,
    pub text: String,
    pub category: MessageCategory,
    pub priority: u8,
    pub confidence: f32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub secondary: Vec<SecondaryMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improvement_potential_s: Option<f64>,
    pub timestamp_s: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_payload_base64: Option<String>,
}

impl CoachingInsight {
    /// True when this insight bypasses per-category cooldowns (spec
    /// §4.14's "priority >= 8 (critical)" override).
    pub fn is_critical(&self) -> bool {
        self.priority >= 8
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn insight(priority: u8) -> CoachingInsight {
        CoachingInsight {
            text: "brake later into turn 1".into(),
            category: MessageCategory::Braking,
            priority,
            confidence: 0.9,
            importance: 0.5,
            source: InsightSource::LocalMl,
            context_snapshot: serde_json::Value::Null,
        }
    }

    #[test]
    fn priority_eight_and_above_is_critical() {
        assert!(insight(8).is_critical());
        assert!(insight(10).is_critical());
        assert!(!insight(7).is_critical());
    }

    #[test]
    fn category_serializes_snake_case() {
        let json = serde_json::to_string(&MessageCategory::RacingLine).unwrap();
        assert_eq!(json, "\"racing_line\"");
    }
}
