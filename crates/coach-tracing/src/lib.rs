//! Structured logging bootstrap and per-component observability counters
//! for the coaching pipeline.
//!
//! Components report every error kind from `racing-coach-errors` here
//! instead of propagating it into the data path (spec §7). The counters
//! are what the UI `get_status()` request and the Advice Query Interface
//! ultimately read back.

use std::sync::atomic::{AtomicU64, Ordering};

pub mod events;

pub use events::ObservabilityEvent;

/// Initialize the global `tracing` subscriber for the process.
///
/// Safe to call once per process; a second call is a silent no-op, matching
/// `tracing_subscriber`'s own global-default semantics.
pub fn init_logging(component: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();

    tracing::info!(component, "logging initialized");
}

/// Monotonically increasing counters for drops, errors, and processed
/// items, scoped to one component. `Fan-out`, `Schema Validator`, and the
/// `Message Queue` each hold one of these.
#[derive(Debug, Default)]
pub struct ComponentCounters {
    processed: AtomicU64,
    dropped: AtomicU64,
    errors: AtomicU64,
}

impl ComponentCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_processed(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            processed: self.processed.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time read of a [`ComponentCounters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CounterSnapshot {
    pub processed: u64,
    pub dropped: u64,
    pub errors: u64,
}

/// Report a [`racing_coach_errors::CoachError`] to the observability
/// channel: logs at a level matching its severity and bumps the owning
/// component's error counter. Never returns a value that could be
/// threaded back into the data path.
#[macro_export]
macro_rules! report_error {
    ($counters:expr, $err:expr) => {{
        let err = $err;
        $counters.record_error();
        match err.severity() {
            $crate::__reexport::Severity::Critical => tracing::error!(%err, "critical"),
            $crate::__reexport::Severity::Error => tracing::error!(%err, "error"),
            $crate::__reexport::Severity::Warning => tracing::warn!(%err, "warning"),
            $crate::__reexport::Severity::Info => tracing::info!(%err, "info"),
        }
    }};
}

#[doc(hidden)]
pub mod __reexport {
    pub use racing_coach_errors::Severity;
}
