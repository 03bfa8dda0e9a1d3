//! Coaching decision pipeline: turns analyzer output into coaching
//! insights (spec §4.10), routes each to local-only or remote-enriched
//! delivery (spec §4.11), and defines the remote NL coach adapter
//! contract (spec §4.12).

mod decision;
mod local_coach;
mod remote_adapter;

pub use decision::{Decision, DecisionEngine, DEFAULT_REMOTE_BUDGET_PER_MIN};
pub use local_coach::LocalHeuristicCoach;
pub use remote_adapter::{enrich_or_pass_through, EnrichedAdvice, RemoteNlCoachAdapter, REMOTE_REQUEST_TIMEOUT};
