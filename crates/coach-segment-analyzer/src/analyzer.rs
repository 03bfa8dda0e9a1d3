use std::collections::HashMap;

use racing_coach_contracts::{SegmentKind, TelemetrySample, TrackSegment};

use crate::metrics::{self, SegmentMetrics};

/// Minimum gap between two insights of the same category (spec §4.7).
const INSIGHT_COOLDOWN_S: f64 = 5.0;

/// Buckets samples per named segment and, at lap completion, computes
/// per-segment metrics plus a small set of qualitative insight strings
/// (spec §4.7).
pub struct SegmentAnalyzer {
    segments: Vec<TrackSegment>,
    buckets: HashMap<String, Vec<TelemetrySample>>,
    last_insight_emitted_s: HashMap<&'static str, f64>,
}

impl SegmentAnalyzer {
    pub fn new(segments: Vec<TrackSegment>) -> Self {
        Self {
            segments,
            buckets: HashMap::new(),
            last_insight_emitted_s: HashMap::new(),
        }
    }

    pub fn set_segments(&mut self, segments: Vec<TrackSegment>) {
        self.segments = segments;
        self.buckets.clear();
    }

    pub fn process_sample(&mut self, sample: TelemetrySample) {
        let Some(segment) = self
            .segments
            .iter()
            .find(|s| s.contains(sample.lap_distance_fraction))
        else {
            return;
        };
        self.buckets
            .entry(segment.name.clone())
            .or_default()
            .push(sample);
    }

    /// Finalizes the lap: computes metrics for every segment with
    /// samples, generates cooldown-gated insight strings, then clears
    /// the buckets for the next lap.
    pub fn finalize_lap(&mut self, now_s: f64) -> (Vec<SegmentMetrics>, Vec<String>) {
        let mut all_metrics = Vec::new();
        let mut insights = Vec::new();

        for segment in &self.segments {
            let Some(samples) = self.buckets.get(&segment.name) else {
                continue;
            };
            let Some(computed) = metrics::compute(&segment.name, samples) else {
                continue;
            };

            for (category, text) in self.candidate_insights(segment, &computed) {
                if self.cooldown_elapsed(category, now_s) {
                    self.last_insight_emitted_s.insert(category, now_s);
                    insights.push(text);
                }
            }

            all_metrics.push(computed);
        }

        self.buckets.clear();
        (all_metrics, insights)
    }

    fn cooldown_elapsed(&self, category: &'static str, now_s: f64) -> bool {
        match self.last_insight_emitted_s.get(category) {
            Some(last) => now_s - last >= INSIGHT_COOLDOWN_S,
            None => true,
        }
    }

    fn candidate_insights(
        &self,
        segment: &TrackSegment,
        metrics: &SegmentMetrics,
    ) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();

        if segment.kind == SegmentKind::Straight && metrics.mean_throttle < 0.9 {
            out.push((
                "throttle_share",
                format!(
                    "full throttle share low on {} (avg {:.0}%)",
                    segment.name,
                    metrics.mean_throttle * 100.0
                ),
            ));
        }

        if segment.kind == SegmentKind::Chicane && metrics.brake_smoothness > 0.15 {
            out.push((
                "brake_modulation",
                format!("brake modulation high in {}", segment.name),
            ));
        }

        out
    }
}
