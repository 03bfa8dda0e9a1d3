//! Advice Query Interface (spec §4.16, §6.4): read-only HTTP views
//! aggregated from the Mistake Tracker and Lap Buffer, safe to call
//! concurrently with the data path.

mod recommend;
mod router;
mod score;
mod state;
mod views;

pub use router::router;
pub use state::AdviceState;
pub use views::{CornerView, FocusAreasView, RecentMistakesView, SessionSummaryView};
