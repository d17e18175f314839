//! Live frame feed for an external rendering client. Serves JSON only; drawing
//! the grid is the client's job.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{error, info, warn};

use crate::engine::{EngineBuilder, TickSummary};
use crate::scenario::Scenario;
use crate::sink::MemorySink;
use crate::systems::standard_rules;
use crate::world::WorldSnapshot;

const EVENT_BUFFER: usize = 256;

/// One post-tick view of the planet.
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub summary: TickSummary,
    pub snapshot: WorldSnapshot,
}

#[derive(Debug, Serialize)]
pub struct LatestFrame {
    pub scenario: String,
    pub total_ticks: u64,
    pub finished: bool,
    pub frame: Option<Frame>,
}

#[derive(Debug, Serialize)]
pub struct FrameHistory {
    pub scenario: String,
    pub total_ticks: u64,
    pub finished: bool,
    pub frames: Vec<Frame>,
}

/// Frames produced so far, shared between the simulation task and handlers.
/// Every recorded frame is also pushed to SSE subscribers as JSON.
#[derive(Clone)]
pub struct FrameLog {
    scenario: String,
    total_ticks: u64,
    frames: Arc<RwLock<Vec<Frame>>>,
    finished: Arc<AtomicBool>,
    events: broadcast::Sender<String>,
}

impl FrameLog {
    pub fn new(scenario: impl Into<String>, total_ticks: u64) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Self {
            scenario: scenario.into(),
            total_ticks,
            frames: Arc::new(RwLock::new(Vec::new())),
            finished: Arc::new(AtomicBool::new(false)),
            events,
        }
    }

    pub fn record(&self, frame: Frame) {
        match serde_json::to_string(&frame) {
            // No subscribers is fine.
            Ok(json) => {
                let _ = self.events.send(json);
            }
            Err(err) => warn!(%err, tick = frame.summary.tick, "frame not broadcast"),
        }
        let mut frames = self.frames.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        frames.push(frame);
    }

    pub fn finish(&self) {
        self.finished.store(true, Ordering::SeqCst);
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    pub fn latest(&self) -> LatestFrame {
        let frames = self.frames.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        LatestFrame {
            scenario: self.scenario.clone(),
            total_ticks: self.total_ticks,
            finished: self.is_finished(),
            frame: frames.last().cloned(),
        }
    }

    pub fn history(&self) -> FrameHistory {
        let frames = self.frames.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        FrameHistory {
            scenario: self.scenario.clone(),
            total_ticks: self.total_ticks,
            finished: self.is_finished(),
            frames: frames.clone(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.events.subscribe()
    }
}

pub struct ServeConfig {
    pub scenario: Scenario,
    pub ticks: u64,
    pub host: String,
    pub port: u16,
}

pub fn router(log: FrameLog) -> Router {
    Router::new()
        .route("/api/state", get(get_state))
        .route("/api/frames", get(get_frames))
        .route("/api/events", get(frame_events))
        .with_state(log)
}

/// Runs the simulation on a blocking task and serves its frames until Ctrl+C.
pub async fn serve(config: ServeConfig) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", config.host, config.port))?;

    let log = FrameLog::new(config.scenario.name.clone(), config.ticks);
    let simulation = spawn_simulation(config.scenario, config.ticks, log.clone())?;
    let scenario = log.scenario.clone();
    tokio::spawn(async move {
        match simulation.await {
            Ok(Ok(())) => info!(%scenario, "simulation finished"),
            Ok(Err(err)) => error!(?err, "simulation failed"),
            Err(err) => error!(?err, "simulation task panicked"),
        }
    });

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "serving frames (Ctrl+C to stop)");
    axum::serve(listener, router(log))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("stopping frame feed");
        })
        .await
        .context("frame feed server failed")
}

fn spawn_simulation(
    scenario: Scenario,
    ticks: u64,
    log: FrameLog,
) -> Result<JoinHandle<Result<()>>> {
    let mut world = scenario.build_world()?;
    let mut engine = EngineBuilder::new(scenario.engine_settings()?)
        .with_rules(standard_rules())
        .build();

    Ok(tokio::task::spawn_blocking(move || {
        let mut sink = MemorySink::new();
        engine.run_with_hook(&mut world, ticks, &mut sink, |summary, world| {
            match world.snapshot(&scenario.name) {
                Ok(snapshot) => log.record(Frame {
                    summary: summary.clone(),
                    snapshot,
                }),
                Err(err) => warn!(%err, tick = summary.tick, "skipping frame"),
            }
        })?;
        log.finish();
        Ok(())
    }))
}

async fn get_state(State(log): State<FrameLog>) -> Json<LatestFrame> {
    Json(log.latest())
}

async fn get_frames(State(log): State<FrameLog>) -> Json<FrameHistory> {
    Json(log.history())
}

async fn frame_events(
    State(log): State<FrameLog>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Lagged subscribers skip the frames they missed.
    let frames = BroadcastStream::new(log.subscribe())
        .filter_map(|json| json.ok().map(|data| Ok(Event::default().data(data))));
    Sse::new(frames).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(2))
            .text("keep-alive"),
    )
}
