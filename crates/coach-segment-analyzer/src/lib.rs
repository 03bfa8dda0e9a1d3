//! Segment Analyzer (spec §4.7): buckets samples by track segment and,
//! at lap completion, produces per-segment metrics and cooldown-gated
//! qualitative insights.

mod analyzer;
mod metrics;

pub use analyzer::SegmentAnalyzer;
pub use metrics::SegmentMetrics;
