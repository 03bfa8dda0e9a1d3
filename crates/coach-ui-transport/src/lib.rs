//! Duplex websocket transport to the UI (spec §4.15, §6.3): pushes
//! telemetry/session/coaching frames from the upstream fan-outs and
//! serves history/mode/status control requests.

mod handler;
mod projection;
mod transport;
mod wire;

pub use handler::UiQueryHandler;
pub use transport::{router, UiTransportState};
pub use wire::{InboundRequest, OutboundFrame, StatusReport, TelemetryProjection};
