use std::collections::HashMap;

use racing_coach_contracts::{LapRecord, ReferenceLap, ReferenceRole, SessionDescriptor};
use racing_coach_mistake_tracker::SessionSummary;
use serde::Serialize;

/// Current on-disk schema version; bump when the shape changes (spec
/// §6.2's versioned-document discipline, carried over to this record).
pub const SCHEMA_VERSION: u32 = 1;

/// Everything the exporter persists for one session (spec §4.19).
#[derive(Debug, Clone, Serialize)]
pub struct SessionRecord {
    pub schema_version: u32,
    pub session_id: String,
    pub descriptor: SessionDescriptor,
    pub laps: Vec<LapRecord>,
    pub reference_snapshot: HashMap<ReferenceRole, ReferenceLap>,
    pub mistake_summary: SessionSummary,
}

impl SessionRecord {
    pub fn new(
        session_id: impl Into<String>,
        descriptor: SessionDescriptor,
        laps: Vec<LapRecord>,
        reference_snapshot: HashMap<ReferenceRole, ReferenceLap>,
        mistake_summary: SessionSummary,
    ) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            session_id: session_id.into(),
            descriptor,
            laps,
            reference_snapshot,
            mistake_summary,
        }
    }
}
