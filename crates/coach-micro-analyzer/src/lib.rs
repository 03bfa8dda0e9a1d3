//! Micro-Analyzer (spec §4.9): per-corner timing, speed, and input
//! deltas against a reference lap, with pattern classification and
//! priority scoring. Consults the Reference Lap Store by identifier
//! only, the caller supplies the looked-up [`SegmentReference`].

mod analyze;
mod window;

pub use analyze::analyze_corner;
pub use window::CornerWindow;
