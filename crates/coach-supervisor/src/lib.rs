//! Wires the Simulator Adapter, Fan-out, Lap/Sector Buffer, Segment
//! Analyzer, Micro-Analyzer, Mistake Tracker, Local Heuristic Coach,
//! Decision Engine, Message Queue, UI Transport, Advice Query Interface
//! and Session History Exporter into one running pipeline (spec §5).

mod pipeline;
mod reference_builder;
mod session;
mod state;

pub use pipeline::Supervisor;
pub use state::PipelineQueryHandler;
