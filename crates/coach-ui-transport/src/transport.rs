use std::sync::Arc;

use axum::{
    extract::ws::{Message, WebSocket, WebSocketUpgrade},
    extract::State,
    response::IntoResponse,
    routing::get,
    Router,
};
use futures::{SinkExt, StreamExt};
use racing_coach_contracts::CoachingMessage;
use racing_coach_fanout::{SessionFanout, TelemetryFanout};
use racing_coach_tracing::ComponentCounters;
use tokio::sync::broadcast;

use crate::handler::UiQueryHandler;
use crate::wire::{InboundRequest, OutboundFrame, TelemetryProjection};

/// Shared state behind every websocket connection: the two upstream
/// fan-outs, a broadcast of dispatched coaching messages, the
/// query-handler for control requests, and the counters the `get_status`
/// request reads back (spec §4.15).
pub struct UiTransportState<H: UiQueryHandler + 'static> {
    telemetry: Arc<TelemetryFanout>,
    session: Arc<SessionFanout>,
    coaching: broadcast::Sender<CoachingMessage>,
    handler: Arc<H>,
    counters: ComponentCounters,
}

impl<H: UiQueryHandler + 'static> UiTransportState<H> {
    pub fn new(
        telemetry: Arc<TelemetryFanout>,
        session: Arc<SessionFanout>,
        coaching: broadcast::Sender<CoachingMessage>,
        handler: Arc<H>,
    ) -> Self {
        Self {
            telemetry,
            session,
            coaching,
            handler,
            counters: ComponentCounters::new(),
        }
    }

    pub fn counters(&self) -> &ComponentCounters {
        &self.counters
    }
}

/// Builds the duplex websocket route. The caller mounts this under
/// whatever path prefix the rest of the service uses.
pub fn router<H: UiQueryHandler + 'static>(state: Arc<UiTransportState<H>>) -> Router {
    Router::new().route("/ws", get(upgrade)).with_state(state)
}

async fn upgrade<H: UiQueryHandler + 'static>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<UiTransportState<H>>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| connection(socket, state))
}

async fn connection<H: UiQueryHandler + 'static>(socket: WebSocket, state: Arc<UiTransportState<H>>) {
    let (mut sink, mut stream) = socket.split();
    let mut telemetry_rx = state.telemetry.subscribe();
    let mut session_rx = state.session.subscribe();
    let mut coaching_rx = state.coaching.subscribe();

    loop {
        tokio::select! {
            delivery = telemetry_rx.recv() => {
                let Some(delivery) = delivery else { break };
                let frame = OutboundFrame::Telemetry {
                    timestamp: delivery.item.timestamp_s,
                    data: TelemetryProjection::from(&delivery.item),
                };
                if send_frame(&mut sink, &frame).await.is_err() {
                    break;
                }
            }
            descriptor = session_rx.recv() => {
                let Some(descriptor) = descriptor else { break };
                let frame = OutboundFrame::SessionInfo {
                    timestamp: descriptor.session_start_timestamp_s,
                    data: descriptor,
                };
                if send_frame(&mut sink, &frame).await.is_err() {
                    break;
                }
            }
            message = coaching_rx.recv() => {
                let Ok(message) = message else { continue };
                let frame = OutboundFrame::Coaching {
                    timestamp: message.timestamp_s,
                    id: message.id.clone(),
                    data: message,
                };
                if send_frame(&mut sink, &frame).await.is_err() {
                    break;
                }
            }
            incoming = stream.next() => {
                let Some(Ok(incoming)) = incoming else { break };
                if let Message::Text(text) = incoming {
                    if handle_request(&text.to_string(), &state, &mut sink).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

async fn handle_request<H: UiQueryHandler + 'static>(
    text: &str,
    state: &Arc<UiTransportState<H>>,
    sink: &mut (impl SinkExt<Message, Error = axum::Error> + Unpin),
) -> Result<(), axum::Error> {
    let Ok(request) = serde_json::from_str::<InboundRequest>(text) else {
        state.counters.record_error();
        return Ok(());
    };
    match request {
        InboundRequest::GetHistory { count } => {
            let messages = state.handler.get_history(count).await;
            let frame = OutboundFrame::History {
                timestamp: now_placeholder(),
                messages,
            };
            send_frame(sink, &frame).await
        }
        InboundRequest::SetMode { mode } => {
            if let Err(err) = state.handler.set_mode(&mode).await {
                tracing::warn!(mode, %err, "rejected coaching-mode change");
            }
            Ok(())
        }
        InboundRequest::GetStatus => {
            let data = state.handler.get_status().await;
            let frame = OutboundFrame::Status {
                timestamp: now_placeholder(),
                data,
            };
            send_frame(sink, &frame).await
        }
    }
}

/// Timestamps on control-plane responses are informational only; the
/// handler's own data carries the timestamps that matter.
fn now_placeholder() -> f64 {
    0.0
}

async fn send_frame(
    sink: &mut (impl SinkExt<Message, Error = axum::Error> + Unpin),
    frame: &OutboundFrame,
) -> Result<(), axum::Error> {
    let Ok(text) = serde_json::to_string(frame) else {
        return Ok(());
    };
    sink.send(Message::Text(text.into())).await
}
