//! HTTP server for the event processor.
//!
//! Provides endpoints for:
//! - `POST /api/events` - Event Grid trigger (validation and blob created)
//! - `GET /status` - Active and recent file runs
//! - `GET /health` - Health check
//! - `GET /metrics` - Prometheus metrics

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Extension, Json},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use serde_json::json;
use tokio::sync::Mutex;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::events::{EventAction, EventGridEvent};
use crate::pipeline::{FileReport, Pipeline};

/// Shared state for the HTTP server.
pub struct ServerState {
    pub pipeline: Arc<Pipeline>,
    pub tracker: RunTracker,
    /// Prometheus handle; `/metrics` is empty without one.
    pub metrics: Option<PrometheusHandle>,
}

impl ServerState {
    pub fn new(pipeline: Pipeline, metrics: Option<PrometheusHandle>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            tracker: RunTracker::new(),
            metrics,
        }
    }
}

/// Tracking for file processing runs.
pub struct RunTracker {
    active: Mutex<HashMap<String, ActiveRun>>,
    completed: Mutex<VecDeque<CompletedRun>>,
    max_completed: usize,
}

/// A file currently being processed.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveRun {
    pub id: String,
    pub file_path: String,
    pub started_at: DateTime<Utc>,
}

/// A finished file run.
#[derive(Debug, Clone, Serialize)]
pub struct CompletedRun {
    pub id: String,
    pub file_path: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub success: bool,
    pub failed_processors: Vec<String>,
    pub error_message: Option<String>,
}

impl RunTracker {
    pub fn new() -> Self {
        Self {
            active: Mutex::new(HashMap::new()),
            completed: Mutex::new(VecDeque::new()),
            max_completed: 100,
        }
    }

    pub async fn start(&self, id: &str, file_path: &str) {
        let run = ActiveRun {
            id: id.to_string(),
            file_path: file_path.to_string(),
            started_at: Utc::now(),
        };
        self.active.lock().await.insert(id.to_string(), run);
    }

    pub async fn complete(
        &self,
        id: &str,
        success: bool,
        failed_processors: Vec<String>,
        error_message: Option<String>,
    ) {
        let mut active = self.active.lock().await;
        if let Some(run) = active.remove(id) {
            let completed_at = Utc::now();
            let duration_ms = (completed_at - run.started_at).num_milliseconds().max(0) as u64;

            let mut completed = self.completed.lock().await;
            completed.push_front(CompletedRun {
                id: run.id,
                file_path: run.file_path,
                started_at: run.started_at,
                completed_at,
                duration_ms,
                success,
                failed_processors,
                error_message,
            });

            // Keep only recent entries
            while completed.len() > self.max_completed {
                completed.pop_back();
            }
        }
    }

    pub async fn get_status(&self) -> StatusResponse {
        let active = self.active.lock().await;
        let completed = self.completed.lock().await;

        StatusResponse {
            active: active.values().cloned().collect(),
            recent: completed.iter().take(20).cloned().collect(),
            total_completed: completed.len(),
        }
    }
}

impl Default for RunTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Response for /status endpoint.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub active: Vec<ActiveRun>,
    pub recent: Vec<CompletedRun>,
    pub total_completed: usize,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Processed,
    Ignored,
    Failed,
}

/// Per-event entry of the /api/events response.
#[derive(Debug, Serialize)]
pub struct EventResult {
    pub event_id: String,
    pub status: EventStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<FileReport>,
}

impl EventResult {
    fn ignored(event_id: &str, reason: String) -> Self {
        Self {
            event_id: event_id.to_string(),
            status: EventStatus::Ignored,
            file_path: None,
            message: Some(reason),
            report: None,
        }
    }

    fn failed(event_id: &str, file_path: Option<String>, message: String) -> Self {
        Self {
            event_id: event_id.to_string(),
            status: EventStatus::Failed,
            file_path,
            message: Some(message),
            report: None,
        }
    }
}

/// Response body for /api/events.
#[derive(Debug, Serialize)]
pub struct EventsResponse {
    pub events: Vec<EventResult>,
}

/// POST /api/events - Event Grid trigger
///
/// A subscription validation event is answered immediately. Otherwise each
/// blob-created event for a forecast file is processed in turn, and the
/// response is a 500 if any of them failed so the delivery is retried.
async fn events_handler(
    Extension(state): Extension<Arc<ServerState>>,
    Json(events): Json<Vec<EventGridEvent>>,
) -> Response {
    let mut results = Vec::with_capacity(events.len());

    for event in events {
        match event.action() {
            EventAction::Validate(code) => {
                info!(event_id = %event.id, "Answering subscription validation");
                return (StatusCode::OK, Json(json!({ "validationResponse": code })))
                    .into_response();
            }
            EventAction::Ignore(reason) => {
                info!(event_id = %event.id, reason = %reason, "Ignoring event");
                results.push(EventResult::ignored(&event.id, reason));
            }
            EventAction::Process(blob) => {
                let path = match state.pipeline.resolve_blob(&blob) {
                    Ok(path) => path,
                    Err(e) => {
                        warn!(event_id = %event.id, error = %e, "Cannot resolve blob");
                        results.push(EventResult::failed(&event.id, None, format!("{:#}", e)));
                        continue;
                    }
                };
                results.push(process_path(&state, &event.id, path).await);
            }
        }
    }

    let status = if results.iter().any(|r| r.status == EventStatus::Failed) {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };

    (status, Json(EventsResponse { events: results })).into_response()
}

async fn process_path(state: &Arc<ServerState>, event_id: &str, path: PathBuf) -> EventResult {
    let run_id = Uuid::new_v4().to_string();
    let file_path = path.display().to_string();

    info!(event_id = %event_id, run_id = %run_id, file_path = %file_path, "Processing forecast file");
    state.tracker.start(&run_id, &file_path).await;

    let pipeline = state.pipeline.clone();
    let outcome = tokio::task::spawn_blocking(move || pipeline.process_file(&path))
        .await
        .map_err(anyhow::Error::from)
        .and_then(|result| result);

    match outcome {
        Ok(report) => {
            let success = report.is_success();
            let failed: Vec<String> = report
                .dispatch
                .failures()
                .map(|o| o.processor.name().to_string())
                .collect();

            if success {
                info!(run_id = %run_id, "Forecast file processed");
            } else {
                error!(run_id = %run_id, failed = ?failed, "Forecast file processed with failures");
            }

            state.tracker.complete(&run_id, success, failed, None).await;

            EventResult {
                event_id: event_id.to_string(),
                status: if success {
                    EventStatus::Processed
                } else {
                    EventStatus::Failed
                },
                file_path: Some(file_path),
                message: None,
                report: Some(report),
            }
        }
        Err(e) => {
            let message = format!("{:#}", e);
            error!(run_id = %run_id, error = %message, "Forecast file processing failed");

            state
                .tracker
                .complete(&run_id, false, vec![], Some(message.clone()))
                .await;

            EventResult::failed(event_id, Some(file_path), message)
        }
    }
}

/// GET /status - Active and recent runs
async fn status_handler(Extension(state): Extension<Arc<ServerState>>) -> impl IntoResponse {
    Json(state.tracker.get_status().await)
}

/// GET /health - Health check
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "event-processor".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /metrics - Prometheus metrics
async fn metrics_handler(Extension(state): Extension<Arc<ServerState>>) -> impl IntoResponse {
    state
        .metrics
        .as_ref()
        .map(PrometheusHandle::render)
        .unwrap_or_default()
}

/// Build the HTTP router.
pub fn build_router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/api/events", post(events_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
}

/// Start the HTTP server.
pub async fn start_server(state: Arc<ServerState>, port: u16) -> anyhow::Result<()> {
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(port = port, "Starting event processor HTTP server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
