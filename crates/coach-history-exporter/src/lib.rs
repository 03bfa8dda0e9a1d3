//! Session History Exporter (spec §4.17, §4.19): detects session end and
//! persists a versioned session record, with an optional best-effort
//! remote upload.

mod detector;
mod exporter;
mod record;

pub use detector::{SessionEndDetector, NO_SAMPLE_TIMEOUT_S};
pub use exporter::{HistoryExporter, SessionUploader};
pub use record::{SessionRecord, SCHEMA_VERSION};
