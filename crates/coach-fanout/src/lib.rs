//! Telemetry and session-descriptor fan-out (spec §4.2).
//!
//! Two independent multi-producer/multi-subscriber channels with
//! different overflow policies: telemetry drops the oldest sample on a
//! lagging subscriber; session descriptor changes never drop because
//! they're rare.

mod session;
mod telemetry;

pub use session::SessionFanout;
pub use telemetry::{Delivery, TelemetryFanout, TelemetrySubscriber, DEFAULT_CAPACITY};
