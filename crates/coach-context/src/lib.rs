//! Enhanced Context Builder (spec §4.8): a sliding telemetry window plus
//! recent event history, exposed as structured snapshots for the Remote
//! NL Coach Adapter.

mod builder;
mod snapshot;

pub use builder::ContextBuilder;
pub use snapshot::{ClassifiedEvent, ContextSnapshot, ReferenceSummary, SessionHeader};
