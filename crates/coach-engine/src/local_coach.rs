use std::collections::HashMap;

use racing_coach_contracts::{CoachingInsight, InsightSource, MessageCategory, MicroAnalysis};

/// Default per-category cooldown (spec §4.10).
const DEFAULT_CATEGORY_COOLDOWN_S: f64 = 8.0;

/// Converts `MicroAnalysis` output and segment insight strings into
/// `CoachingInsight`s, gated by a per-category cooldown (spec §4.10).
pub struct LocalHeuristicCoach {
    cooldown_s: HashMap<MessageCategory, f64>,
    last_emitted_s: HashMap<MessageCategory, f64>,
}

impl LocalHeuristicCoach {
    pub fn new() -> Self {
        Self {
            cooldown_s: HashMap::new(),
            last_emitted_s: HashMap::new(),
        }
    }

    pub fn set_category_cooldown(&mut self, category: MessageCategory, cooldown_s: f64) {
        self.cooldown_s.insert(category, cooldown_s);
    }

    /// Converts one `MicroAnalysis` into zero or one `CoachingInsight`
    /// per pattern's mapped category, respecting that category's
    /// cooldown.
    pub fn convert(&mut self, analysis: &MicroAnalysis, now_s: f64) -> Vec<CoachingInsight> {
        let mut insights = Vec::new();

        if analysis.patterns.is_empty() || analysis.feedback.is_empty() {
            return insights;
        }

        for (pattern, text) in analysis.patterns.iter().zip(analysis.feedback.iter()) {
            let category = category_for_pattern(*pattern);
            if !self.cooldown_elapsed(category, now_s) {
                continue;
            }

            let confidence = analysis
                .pattern_confidence
                .get(pattern)
                .copied()
                .unwrap_or(0.5);
            let importance = importance_from_time_loss(analysis.total_time_loss_s);

            self.last_emitted_s.insert(category, now_s);
            insights.push(CoachingInsight {
                text: text.clone(),
                category,
                priority: priority_scale(analysis.priority),
                confidence,
                importance,
                source: InsightSource::LocalMl,
                context_snapshot: serde_json::json!({
                    "corner_name": analysis.corner_name,
                    "lap_number": analysis.lap_number,
                }),
            });
        }

        insights
    }

    fn cooldown_elapsed(&self, category: MessageCategory, now_s: f64) -> bool {
        let cooldown = self.cooldown_s.get(&category).copied().unwrap_or(DEFAULT_CATEGORY_COOLDOWN_S);
        match self.last_emitted_s.get(&category) {
            Some(last) => now_s - last >= cooldown,
            None => true,
        }
    }
}

impl Default for LocalHeuristicCoach {
    fn default() -> Self {
        Self::new()
    }
}

fn category_for_pattern(pattern: racing_coach_contracts::MistakeType) -> MessageCategory {
    use racing_coach_contracts::MistakeType::*;
    match pattern {
        LateBrake | EarlyBrake | TrailBrakingPoor => MessageCategory::Braking,
        LateThrottle | EarlyThrottle => MessageCategory::Throttle,
        LowEntrySpeed | HighEntrySpeed | LowApexSpeed | HighApexSpeed | LowExitSpeed => MessageCategory::Cornering,
        Understeer | Oversteer | OffThrottleOversteer => MessageCategory::Safety,
        EarlyApex | LateApex | PoorRacingLine | LineDeviation => MessageCategory::RacingLine,
        LapTimeVariance | SectorTimeVariance | InputVariance | InconsistentInputs => MessageCategory::Consistency,
        PoorGearSelection => MessageCategory::Technique,
    }
}

fn importance_from_time_loss(total_time_loss_s: f64) -> f32 {
    (total_time_loss_s / 0.5).clamp(0.0, 1.0) as f32
}

fn priority_scale(priority: racing_coach_contracts::Priority) -> u8 {
    use racing_coach_contracts::Priority::*;
    match priority {
        Low => 3,
        Medium => 5,
        High => 7,
        Critical => 9,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use racing_coach_contracts::{MistakeType, Priority};

    fn analysis(patterns: Vec<MistakeType>, feedback: Vec<String>) -> MicroAnalysis {
        MicroAnalysis {
            corner_name: "turn_1".into(),
            lap_number: 1,
            brake_timing_delta_s: 0.0,
            throttle_timing_delta_s: 0.0,
            entry_speed_delta_kmh: 0.0,
            apex_speed_delta_kmh: 0.0,
            exit_speed_delta_kmh: 0.0,
            peak_brake_delta_pct: 0.0,
            peak_throttle_delta_pct: 0.0,
            peak_steering_delta_deg: 0.0,
            total_time_loss_s: 0.3,
            time_loss_breakdown: HashMap::new(),
            patterns,
            pattern_confidence: HashMap::new(),
            priority: Priority::High,
            feedback,
        }
    }

    #[test]
    fn converts_pattern_into_an_insight() {
        let mut coach = LocalHeuristicCoach::new();
        let insights = coach.convert(
            &analysis(vec![MistakeType::LateBrake], vec!["brake earlier".into()]),
            0.0,
        );
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].category, MessageCategory::Braking);
    }

    #[test]
    fn cooldown_suppresses_same_category_within_window() {
        let mut coach = LocalHeuristicCoach::new();
        coach.convert(&analysis(vec![MistakeType::LateBrake], vec!["brake earlier".into()]), 0.0);
        let second = coach.convert(
            &analysis(vec![MistakeType::EarlyBrake], vec!["ease off the brake".into()]),
            4.0,
        );
        assert!(second.is_empty());

        let third = coach.convert(
            &analysis(vec![MistakeType::EarlyBrake], vec!["ease off the brake".into()]),
            9.0,
        );
        assert_eq!(third.len(), 1);
    }
}
