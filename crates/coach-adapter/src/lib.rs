//! Simulator Adapter (spec §4.1) and Schema Validator (spec §4.3).
//!
//! The adapter trait produces raw, not-yet-validated samples; the
//! validator repairs or drops them before anything downstream sees a
//! [`racing_coach_contracts::TelemetrySample`].

mod adapter;
mod backoff;
mod connection;
mod mock;
mod runner;
mod validator;

pub use adapter::{RawSample, SimulatorAdapter};
pub use backoff::ReconnectBackoff;
pub use connection::{ConnectionEvent, ConnectionState};
pub use mock::MockReplayAdapter;
pub use runner::{AdapterRunner, DEFAULT_SESSION_POLL_INTERVAL};
pub use validator::{SchemaValidator, ValidationOutcome};
