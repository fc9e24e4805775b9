//! HTTP surface for embedding hosts.
//!
//! Exposes the ingest channel and the record store over localhost so a
//! companion UI can push samples and read back screening results.
//!
//! # Architecture
//!
//! ```text
//! Companion UI ──→ POST /ingest ──→ ingest channel ──→ inference session
//!                                                            ↓
//!              GET /records, GET /analysis/latest  ←──  record store
//! ```

use crate::core::result::InferenceResult;
use crate::records::LongitudinalRecordStore;
use crate::source::channel::SampleSender;
use crate::source::types::BehavioralSample;
use axum::{
    extract::State,
    http::{HeaderValue, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind to (0 for random)
    pub port: u16,
}

impl ServerConfig {
    pub fn new(port: u16) -> Self {
        Self { port }
    }
}

/// Shared server state
pub struct ServerState {
    /// Producer end of the session's ingest channel
    ingest_tx: SampleSender,
    /// Record store shared with the session driver
    store: RwLock<LongitudinalRecordStore>,
}

impl ServerState {
    pub fn new(ingest_tx: SampleSender, store: LongitudinalRecordStore) -> Self {
        Self {
            ingest_tx,
            store: RwLock::new(store),
        }
    }

    /// Write access for the session driver's session-end path.
    pub async fn store_mut(&self) -> tokio::sync::RwLockWriteGuard<'_, LongitudinalRecordStore> {
        self.store.write().await
    }
}

/// Response from ingest endpoint
#[derive(Debug, Clone, Serialize)]
pub struct IngestResponse {
    pub status: String,
    pub message: String,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// One row of GET /records; samples stay on disk, not on the wire.
#[derive(Serialize)]
pub struct RecordSummary {
    pub id: String,
    pub date: DateTime<Utc>,
    pub risk_score: f64,
    pub observations: Vec<String>,
    pub sample_count: usize,
}

/// GET /health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// POST /ingest
///
/// Accepts one behavioral sample and queues it for the running session.
async fn ingest(
    State(state): State<Arc<ServerState>>,
    Json(sample): Json<BehavioralSample>,
) -> Result<Json<IngestResponse>, (StatusCode, Json<ErrorResponse>)> {
    state.ingest_tx.try_send(sample).map_err(|e| {
        tracing::warn!("ingest rejected: {}", e);
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: format!("Sample not accepted: {}", e),
                code: "INGEST_UNAVAILABLE".to_string(),
            }),
        )
    })?;

    Ok(Json(IngestResponse {
        status: "ok".to_string(),
        message: "Sample queued".to_string(),
    }))
}

/// GET /records
async fn records(State(state): State<Arc<ServerState>>) -> Json<Vec<RecordSummary>> {
    let store = state.store.read().await;
    let summaries = store
        .records()
        .iter()
        .map(|r| RecordSummary {
            id: r.id.clone(),
            date: r.date,
            risk_score: r.risk_score,
            observations: r.observations.clone(),
            sample_count: r.features.len(),
        })
        .collect();
    Json(summaries)
}

/// GET /analysis/latest
async fn latest_analysis(
    State(state): State<Arc<ServerState>>,
) -> Result<Json<InferenceResult>, (StatusCode, Json<ErrorResponse>)> {
    let store = state.store.read().await;
    match store.latest_analysis() {
        Some(result) => Ok(Json(result.clone())),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "No analysis has completed yet".to_string(),
                code: "NO_ANALYSIS".to_string(),
            }),
        )),
    }
}

/// Run the HTTP server
pub async fn run(
    config: ServerConfig,
    state: Arc<ServerState>,
) -> anyhow::Result<(SocketAddr, tokio::sync::oneshot::Sender<()>)> {
    let app = Router::new()
        .route("/health", get(health))
        .route("/ingest", post(ingest))
        .route("/records", get(records))
        .route("/analysis/latest", get(latest_analysis))
        .layer(
            CorsLayer::new()
                .allow_origin([
                    HeaderValue::from_static("http://localhost"),
                    HeaderValue::from_static("http://127.0.0.1"),
                ])
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = TcpListener::bind(addr).await?;
    let actual_addr = listener.local_addr()?;

    tracing::info!("Screening server listening on http://{}", actual_addr);

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
                tracing::info!("Server shutdown signal received");
            })
            .await
        {
            tracing::error!("Server error: {}", e);
        }
    });

    Ok((actual_addr, shutdown_tx))
}
