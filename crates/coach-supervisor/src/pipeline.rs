use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex as StdMutex, RwLock};
use std::time::Duration;

use axum::Router;
use racing_coach_adapter::{
    AdapterRunner, ConnectionEvent, RawSample, SchemaValidator, SimulatorAdapter, ValidationOutcome,
};
use racing_coach_advice_api::AdviceState;
use racing_coach_config::{CoachConfig, CoachingMode};
use racing_coach_context::{ClassifiedEvent, ContextBuilder};
use racing_coach_contracts::{
    CoachingInsight, CoachingMessage, InsightSource, LapRecord, MessageCategory, ReferenceLap,
    ReferenceRole, SessionDescriptor,
};
use racing_coach_engine::{enrich_or_pass_through, Decision, DecisionEngine, LocalHeuristicCoach, RemoteNlCoachAdapter};
use racing_coach_fanout::{SessionFanout, TelemetryFanout};
use racing_coach_history_exporter::{HistoryExporter, SessionEndDetector, SessionRecord, SessionUploader};
use racing_coach_message_queue::{MessageOrigin, MessageQueue, QueueConfig};
use racing_coach_mistake_tracker::{MistakeTracker, DEFAULT_EVENT_LOG_CAPACITY};
use racing_coach_rate_limiter::TokenBucket;
use racing_coach_reference_store::ReferenceStore;
use racing_coach_track_store::TrackStore;
use racing_coach_tracing::ComponentCounters;
use racing_coach_ui_transport::UiTransportState;
use tokio::sync::{broadcast, mpsc, Mutex as AsyncMutex};

use crate::reference_builder;
use crate::session::ActiveSession;
use crate::state::PipelineQueryHandler;

const RAW_SAMPLE_CHANNEL_CAPACITY: usize = 1024;
const CONNECTION_EVENT_CHANNEL_CAPACITY: usize = 16;
const COACHING_BROADCAST_CAPACITY: usize = 64;
const DISPATCH_TICK: Duration = Duration::from_millis(250);
const HISTORY_CHECK_TICK: Duration = Duration::from_secs(5);

/// Owns every long-lived component and runs the full coaching pipeline
/// (spec §5): one task per component, wired by channels and a handful of
/// shared, lock-guarded snapshots that the HTTP/websocket surfaces read.
pub struct Supervisor {
    config: Arc<CoachConfig>,
    telemetry_fanout: Arc<TelemetryFanout>,
    session_fanout: Arc<SessionFanout>,
    coaching_tx: broadcast::Sender<CoachingMessage>,
    reference_store: Arc<ReferenceStore>,
    track_store: Arc<TrackStore>,
    history_exporter: Arc<HistoryExporter>,
    mistake_tracker: Arc<RwLock<MistakeTracker>>,
    laps: Arc<RwLock<Vec<LapRecord>>>,
    message_queue: Arc<AsyncMutex<MessageQueue>>,
    coaching_mode: Arc<RwLock<CoachingMode>>,
    detector: Arc<StdMutex<SessionEndDetector>>,
    context_builder: Arc<AsyncMutex<ContextBuilder>>,
    advice_state: Arc<AdviceState>,
    ui_state: Arc<UiTransportState<PipelineQueryHandler>>,
    query_handler: Arc<PipelineQueryHandler>,
}

impl Supervisor {
    pub async fn new(config: CoachConfig, uploader: Option<Arc<dyn SessionUploader>>) -> anyhow::Result<Self> {
        let persistence_dir = config.persistence.persistence_dir.clone();
        let reference_store = Arc::new(ReferenceStore::new(&persistence_dir.join("references")).await?);
        let track_store = Arc::new(TrackStore::new(&persistence_dir.join("tracks"), None).await?);
        let history_exporter = Arc::new(HistoryExporter::new(&persistence_dir.join("history"), uploader).await?);

        let telemetry_fanout = Arc::new(TelemetryFanout::default());
        let session_fanout = Arc::new(SessionFanout::new());
        let (coaching_tx, _) = broadcast::channel(COACHING_BROADCAST_CAPACITY);

        let mistake_tracker = Arc::new(RwLock::new(MistakeTracker::new(DEFAULT_EVENT_LOG_CAPACITY)));
        let laps = Arc::new(RwLock::new(Vec::new()));

        let mut queue_config = QueueConfig::default();
        queue_config.capacity = config.message.max_messages.max(1);
        queue_config.dedup_window_frontend_s = config.message.dedup_window_frontend_s as f64;
        queue_config.dedup_window_backend_s = config.message.dedup_window_backend_s as f64;
        queue_config.combination_window_s = config.message.combination_window_s as f64;
        queue_config.default_category_cooldown_s = config.message.message_cooldown_s as f64;
        let message_queue = Arc::new(AsyncMutex::new(MessageQueue::new(queue_config)));

        let coaching_mode = Arc::new(RwLock::new(config.mode.coaching_mode));
        let connected = Arc::new(AtomicBool::new(false));
        let detector = Arc::new(StdMutex::new(SessionEndDetector::new()));

        let sample_capacity = (config.telemetry.buffer_duration_s * u64::from(config.telemetry.telemetry_poll_hz)) as usize;
        let context_builder = Arc::new(AsyncMutex::new(ContextBuilder::new(sample_capacity.max(1))));

        let query_handler = Arc::new(PipelineQueryHandler::new(
            message_queue.clone(),
            coaching_mode.clone(),
            connected,
        ));

        let ui_state = Arc::new(UiTransportState::new(
            telemetry_fanout.clone(),
            session_fanout.clone(),
            coaching_tx.clone(),
            query_handler.clone(),
        ));

        let advice_state = Arc::new(AdviceState::new("pending-session", mistake_tracker.clone(), laps.clone(), 0.0));

        Ok(Self {
            config: Arc::new(config),
            telemetry_fanout,
            session_fanout,
            coaching_tx,
            reference_store,
            track_store,
            history_exporter,
            mistake_tracker,
            laps,
            message_queue,
            coaching_mode,
            detector,
            context_builder,
            advice_state,
            ui_state,
            query_handler,
        })
    }

    /// Websocket route for the live UI (spec §4.15). Mount this before
    /// calling [`Self::run`] so the HTTP server can bind immediately.
    pub fn ui_router(&self) -> Router {
        racing_coach_ui_transport::router(self.ui_state.clone())
    }

    /// Read-only advice query routes (spec §4.16).
    pub fn advice_router(&self) -> Router {
        racing_coach_advice_api::router(self.advice_state.clone())
    }

    /// Drives the pipeline until ctrl-c, spawning one task per component
    /// (spec §5) and shutting every one down on signal (grounded on the
    /// teacher's `tokio::select!` over a running service and a ctrl-c
    /// future).
    pub async fn run(
        &self,
        adapter: Box<dyn SimulatorAdapter>,
        remote_adapter: Option<Arc<dyn RemoteNlCoachAdapter>>,
    ) -> anyhow::Result<()> {
        let (shutdown_tx, _) = broadcast::channel::<()>(1);

        let (raw_tx, raw_rx) = mpsc::channel::<RawSample>(RAW_SAMPLE_CHANNEL_CAPACITY);
        let (connection_tx, connection_rx) = mpsc::channel::<ConnectionEvent>(CONNECTION_EVENT_CHANNEL_CAPACITY);
        let (session_tx, session_rx) = mpsc::unbounded_channel::<SessionDescriptor>();
        let (insight_tx, insight_rx) = mpsc::unbounded_channel::<CoachingInsight>();

        let mut handles = Vec::new();

        let runner = AdapterRunner::new();
        handles.push(tokio::spawn(async move {
            runner.run(adapter, raw_tx, connection_tx, session_tx).await;
        }));

        handles.push(tokio::spawn(validator_loop(
            raw_rx,
            self.telemetry_fanout.clone(),
            shutdown_tx.subscribe(),
        )));

        handles.push(tokio::spawn(session_relay_loop(
            session_rx,
            self.session_fanout.clone(),
            shutdown_tx.subscribe(),
        )));

        handles.push(tokio::spawn(connection_watch_loop(
            connection_rx,
            self.detector.clone(),
            self.query_handler.clone(),
            shutdown_tx.subscribe(),
        )));

        handles.push(tokio::spawn(analysis_loop(
            self.telemetry_fanout.clone(),
            self.session_fanout.clone(),
            self.config.clone(),
            self.track_store.clone(),
            self.reference_store.clone(),
            self.mistake_tracker.clone(),
            self.laps.clone(),
            self.context_builder.clone(),
            self.advice_state.clone(),
            self.detector.clone(),
            insight_tx,
            shutdown_tx.subscribe(),
        )));

        handles.push(tokio::spawn(decision_loop(
            insight_rx,
            self.message_queue.clone(),
            self.context_builder.clone(),
            remote_adapter,
            self.coaching_mode.clone(),
            self.advice_state.clone(),
            self.config.message.rate_limit_per_min_remote,
            shutdown_tx.subscribe(),
        )));

        handles.push(tokio::spawn(dispatch_loop(
            self.message_queue.clone(),
            self.coaching_tx.clone(),
            shutdown_tx.subscribe(),
        )));

        handles.push(tokio::spawn(history_export_loop(
            self.session_fanout.clone(),
            self.detector.clone(),
            self.laps.clone(),
            self.mistake_tracker.clone(),
            self.reference_store.clone(),
            self.history_exporter.clone(),
            self.advice_state.clone(),
            shutdown_tx.subscribe(),
        )));

        tokio::signal::ctrl_c().await.ok();
        tracing::info!("shutdown signal received");
        let _ = shutdown_tx.send(());

        for handle in handles {
            let _ = handle.await;
        }

        Ok(())
    }
}

async fn validator_loop(
    mut raw_rx: mpsc::Receiver<RawSample>,
    telemetry_fanout: Arc<TelemetryFanout>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let validator = SchemaValidator::new();
    loop {
        tokio::select! {
            _ = shutdown.recv() => return,
            raw = raw_rx.recv() => {
                let Some(raw) = raw else { return };
                match validator.validate(&raw) {
                    ValidationOutcome::Repaired(sample) => telemetry_fanout.publish(sample),
                    ValidationOutcome::Dropped { reason } => {
                        tracing::debug!(reason, "dropped invalid telemetry sample");
                    }
                }
            }
        }
    }
}

async fn session_relay_loop(
    mut session_rx: mpsc::UnboundedReceiver<SessionDescriptor>,
    session_fanout: Arc<SessionFanout>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = shutdown.recv() => return,
            descriptor = session_rx.recv() => {
                let Some(descriptor) = descriptor else { return };
                session_fanout.publish(descriptor);
            }
        }
    }
}

async fn connection_watch_loop(
    mut connection_rx: mpsc::Receiver<ConnectionEvent>,
    detector: Arc<StdMutex<SessionEndDetector>>,
    query_handler: Arc<PipelineQueryHandler>,
    mut shutdown: broadcast::Receiver<()>,
) {
    loop {
        tokio::select! {
            _ = shutdown.recv() => return,
            event = connection_rx.recv() => {
                let Some(event) = event else { return };
                query_handler.mark_connected(event.current.is_connected());
                if event.is_disconnection() {
                    detector.lock().unwrap_or_else(|poison| poison.into_inner()).on_disconnect();
                }
            }
        }
    }
}

/// Owns the per-session analysis state and is the only task that mutates
/// the Lap/Sector Buffer, Segment Analyzer, and Micro-Analyzer corner
/// windows, reuniting their output at each lap boundary (spec §4.4,
/// §4.7, §4.9).
#[allow(clippy::too_many_arguments)]
async fn analysis_loop(
    telemetry_fanout: Arc<TelemetryFanout>,
    session_fanout: Arc<SessionFanout>,
    config: Arc<CoachConfig>,
    track_store: Arc<TrackStore>,
    reference_store: Arc<ReferenceStore>,
    mistake_tracker: Arc<RwLock<MistakeTracker>>,
    laps: Arc<RwLock<Vec<LapRecord>>>,
    context_builder: Arc<AsyncMutex<ContextBuilder>>,
    advice_state: Arc<AdviceState>,
    detector: Arc<StdMutex<SessionEndDetector>>,
    insight_tx: mpsc::UnboundedSender<CoachingInsight>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut telemetry_rx = telemetry_fanout.subscribe();
    let mut session_rx = session_fanout.subscribe();
    let mut local_coach = LocalHeuristicCoach::new();
    let mut active: Option<ActiveSession> = None;

    loop {
        tokio::select! {
            _ = shutdown.recv() => return,
            descriptor = session_rx.recv() => {
                let Some(descriptor) = descriptor else { return };
                let changed = active.as_ref().map(|a| a.identity() != descriptor.identity()).unwrap_or(true);
                context_builder.lock().await.set_session(descriptor.clone());
                if changed {
                    let segments = track_store.segments(&descriptor.track_config_name).await;
                    let references = reference_store
                        .load(&descriptor.track_config_name, &descriptor.car_screen_name)
                        .await
                        .unwrap_or_default();
                    active = Some(ActiveSession::new(
                        descriptor,
                        config.telemetry.sector_boundaries.clone(),
                        segments,
                        references,
                    ));
                } else if let Some(active) = active.as_mut() {
                    active.descriptor = descriptor;
                }
            }
            delivery = telemetry_rx.recv() => {
                let Some(delivery) = delivery else { return };
                let sample = delivery.item;

                advice_state.advance_clock(sample.timestamp_s);
                detector.lock().unwrap_or_else(|poison| poison.into_inner()).on_sample(sample.timestamp_s);
                context_builder.lock().await.push_sample(sample.clone());

                let Some(active) = active.as_mut() else { continue };

                for (name, window) in active.corner_windows.iter_mut() {
                    let reference = active
                        .references
                        .get(&ReferenceRole::PersonalBest)
                        .and_then(|r| r.segment_reference(name));
                    let Some(analysis) = window.process_sample(sample.clone(), reference) else { continue };

                    {
                        let mut builder = context_builder.lock().await;
                        for pattern in &analysis.patterns {
                            builder.push_event(ClassifiedEvent {
                                timestamp_s: sample.timestamp_s,
                                corner_name: analysis.corner_name.clone(),
                                mistake_type: *pattern,
                            });
                        }
                    }

                    mistake_tracker
                        .write()
                        .unwrap_or_else(|poison| poison.into_inner())
                        .record(&analysis, sample.timestamp_s);

                    for insight in local_coach.convert(&analysis, sample.timestamp_s) {
                        let _ = insight_tx.send(insight);
                    }
                }

                active.segment_analyzer.process_sample(sample.clone());
                let (_sectors, lap_completion) = active.lap_buffer.process_sample(sample.clone());

                let Some(completion) = lap_completion else { continue };

                let (segment_metrics, insight_texts) = active.segment_analyzer.finalize_lap(sample.timestamp_s);
                let mut lap = completion.lap.clone();
                lap.segment_metrics = segment_metrics
                    .iter()
                    .map(|m| reference_builder::merge_segment_metrics(&m.segment_name, m))
                    .collect();
                laps.write().unwrap_or_else(|poison| poison.into_inner()).push(lap.clone());

                for text in insight_texts {
                    let _ = insight_tx.send(CoachingInsight {
                        text,
                        category: MessageCategory::General,
                        priority: 4,
                        confidence: 0.6,
                        importance: 0.3,
                        source: InsightSource::LocalMl,
                        context_snapshot: serde_json::Value::Null,
                    });
                }

                if completion.is_personal_best && lap.valid && !completion.is_outlier {
                    let segment_references = segment_metrics
                        .iter()
                        .map(|m| (m.segment_name.clone(), reference_builder::segment_reference_from_metrics(m)))
                        .collect();

                    let reference_lap = ReferenceLap {
                        track_name: active.descriptor.track_config_name.clone(),
                        car_name: active.descriptor.car_screen_name.clone(),
                        role: ReferenceRole::PersonalBest,
                        lap_time_s: lap.total_time_s,
                        sector_times_s: lap.sector_times_s.clone(),
                        segment_references,
                        source_lap_number: lap.lap_number,
                        updated_at_s: sample.timestamp_s,
                    };

                    match reference_store
                        .save(
                            &active.descriptor.track_config_name,
                            &active.descriptor.car_screen_name,
                            ReferenceRole::PersonalBest,
                            reference_lap.clone(),
                        )
                        .await
                    {
                        Ok(()) => {
                            active.references.insert(ReferenceRole::PersonalBest, reference_lap);
                        }
                        Err(err) => tracing::warn!(%err, "failed to persist promoted personal best reference"),
                    }
                }
            }
        }
    }
}

fn mode_str(mode: CoachingMode) -> &'static str {
    match mode {
        CoachingMode::Beginner => "beginner",
        CoachingMode::Intermediate => "intermediate",
        CoachingMode::Advanced => "advanced",
        CoachingMode::Race => "race",
    }
}

fn local_message(insight: CoachingInsight, now_s: f64) -> CoachingMessage {
    CoachingMessage {
        id: uuid::Uuid::new_v4().to_string(),
        text: insight.text,
        category: insight.category,
        priority: insight.priority,
        confidence: insight.confidence,
        secondary: Vec::new(),
        improvement_potential_s: None,
        timestamp_s: now_s,
        audio_payload_base64: None,
    }
}

/// Routes each `CoachingInsight` to local or remote-enriched delivery
/// (spec §4.11) and admits the result into the Message Queue (spec
/// §4.14).
#[allow(clippy::too_many_arguments)]
async fn decision_loop(
    mut insight_rx: mpsc::UnboundedReceiver<CoachingInsight>,
    message_queue: Arc<AsyncMutex<MessageQueue>>,
    context_builder: Arc<AsyncMutex<ContextBuilder>>,
    remote_adapter: Option<Arc<dyn RemoteNlCoachAdapter>>,
    coaching_mode: Arc<RwLock<CoachingMode>>,
    advice_state: Arc<AdviceState>,
    remote_budget_per_min: u32,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut engine = DecisionEngine::new(TokenBucket::per_minute(remote_budget_per_min));
    let counters = ComponentCounters::new();

    loop {
        tokio::select! {
            _ = shutdown.recv() => return,
            insight = insight_rx.recv() => {
                let Some(insight) = insight else { return };
                let now_s = advice_state.now_s();
                let decision = engine.decide(insight).await;

                let message = match decision {
                    Decision::Local(insight) => local_message(insight, now_s),
                    Decision::Remote(insight) => match &remote_adapter {
                        Some(adapter) => {
                            let mode = *coaching_mode.read().unwrap_or_else(|poison| poison.into_inner());
                            let snapshot = context_builder.lock().await.snapshot(now_s, 5.0, 5.0, None);
                            let mut message =
                                enrich_or_pass_through(adapter.as_ref(), insight, &snapshot, mode_str(mode), &counters).await;
                            message.timestamp_s = now_s;
                            message
                        }
                        None => local_message(insight, now_s),
                    },
                };

                let outcome = message_queue
                    .lock()
                    .await
                    .admit(message, MessageOrigin::Backend, now_s);
                tracing::debug!(?outcome, "admitted coaching message");
            }
        }
    }
}

async fn dispatch_loop(
    message_queue: Arc<AsyncMutex<MessageQueue>>,
    coaching_tx: broadcast::Sender<CoachingMessage>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(DISPATCH_TICK);
    loop {
        tokio::select! {
            _ = shutdown.recv() => return,
            _ = ticker.tick() => {
                if let Some(message) = message_queue.lock().await.try_dispatch() {
                    let _ = coaching_tx.send(message);
                }
            }
        }
    }
}

/// Watches for session end (disconnect or sample timeout) and persists a
/// versioned record, then resets the per-session aggregates for whatever
/// comes next (spec §4.17, §4.19).
async fn history_export_loop(
    session_fanout: Arc<SessionFanout>,
    detector: Arc<StdMutex<SessionEndDetector>>,
    laps: Arc<RwLock<Vec<LapRecord>>>,
    mistake_tracker: Arc<RwLock<MistakeTracker>>,
    reference_store: Arc<ReferenceStore>,
    history_exporter: Arc<HistoryExporter>,
    advice_state: Arc<AdviceState>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut session_rx = session_fanout.subscribe();
    let mut current: Option<SessionDescriptor> = None;
    let mut ticker = tokio::time::interval(HISTORY_CHECK_TICK);

    loop {
        tokio::select! {
            _ = shutdown.recv() => return,
            descriptor = session_rx.recv() => {
                match descriptor {
                    Some(descriptor) => current = Some(descriptor),
                    None => return,
                }
            }
            _ = ticker.tick() => {
                let Some(descriptor) = current.clone() else { continue };
                let now_s = advice_state.now_s();
                let ended = detector.lock().unwrap_or_else(|poison| poison.into_inner()).session_ended(now_s);
                if !ended {
                    continue;
                }

                let laps_snapshot = laps.read().unwrap_or_else(|poison| poison.into_inner()).clone();
                if laps_snapshot.is_empty() {
                    continue;
                }

                let reference_snapshot = reference_store
                    .load(&descriptor.track_config_name, &descriptor.car_screen_name)
                    .await
                    .unwrap_or_default();
                let summary = mistake_tracker
                    .read()
                    .unwrap_or_else(|poison| poison.into_inner())
                    .session_summary();

                let record = SessionRecord::new(
                    uuid::Uuid::new_v4().to_string(),
                    descriptor.clone(),
                    laps_snapshot,
                    reference_snapshot,
                    summary,
                );

                if let Err(err) = history_exporter.export(&record).await {
                    tracing::warn!(%err, "failed to export session record");
                }

                laps.write().unwrap_or_else(|poison| poison.into_inner()).clear();
                *mistake_tracker.write().unwrap_or_else(|poison| poison.into_inner()) =
                    MistakeTracker::new(DEFAULT_EVENT_LOG_CAPACITY);
                *detector.lock().unwrap_or_else(|poison| poison.into_inner()) = SessionEndDetector::new();
            }
        }
    }
}
