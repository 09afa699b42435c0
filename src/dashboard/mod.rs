//! Health and status HTTP server.
//!
//! A small axum app exposing liveness plus a read-only view of the
//! scanner: last scan time, cycle counters, current picks, and the
//! bankroll summary. The scan loop pushes snapshots in; the handlers
//! only ever read.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

use crate::bankroll::BankrollSummary;
use crate::types::Candidate;

#[derive(Debug, Clone, Serialize)]
pub struct ScanSnapshot {
    pub at: DateTime<Utc>,
    pub games_fetched: usize,
    pub games_screened: usize,
    pub picks: usize,
}

#[derive(Default)]
struct Inner {
    last_scan: RwLock<Option<ScanSnapshot>>,
    picks: RwLock<Vec<Candidate>>,
    bankroll: RwLock<Option<BankrollSummary>>,
    cycles: RwLock<u64>,
}

/// Shared scanner state behind the HTTP handlers. Cheap to clone.
#[derive(Clone)]
pub struct DashboardState {
    started_at: DateTime<Utc>,
    inner: Arc<Inner>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self { started_at: Utc::now(), inner: Arc::new(Inner::default()) }
    }

    pub async fn record_scan(&self, snapshot: ScanSnapshot, picks: Vec<Candidate>) {
        *self.inner.last_scan.write().await = Some(snapshot);
        *self.inner.picks.write().await = picks;
        *self.inner.cycles.write().await += 1;
    }

    pub async fn record_bankroll(&self, summary: BankrollSummary) {
        *self.inner.bankroll.write().await = Some(summary);
    }

    pub async fn picks(&self) -> Vec<Candidate> {
        self.inner.picks.read().await.clone()
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct StatusResponse {
    uptime_secs: i64,
    cycles: u64,
    last_scan: Option<ScanSnapshot>,
    bankroll: Option<BankrollSummary>,
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

async fn status(State(state): State<DashboardState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
        cycles: *state.inner.cycles.read().await,
        last_scan: state.inner.last_scan.read().await.clone(),
        bankroll: state.inner.bankroll.read().await.clone(),
    })
}

async fn picks(State(state): State<DashboardState>) -> Json<Vec<Candidate>> {
    Json(state.picks().await)
}

pub fn build_router(state: DashboardState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);
    Router::new()
        .route("/health", get(health))
        .route("/api/status", get(status))
        .route("/api/picks", get(picks))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve in a background task. Failures are logged, not fatal:
/// the scanner keeps running without its dashboard.
pub fn spawn_dashboard(state: DashboardState, port: u16) {
    tokio::spawn(async move {
        let addr = format!("0.0.0.0:{port}");
        let listener = match tokio::net::TcpListener::bind(&addr).await {
            Ok(listener) => listener,
            Err(e) => {
                error!(%addr, error = %e, "Dashboard failed to bind");
                return;
            }
        };
        info!(%addr, "Dashboard listening");
        if let Err(e) = axum::serve(listener, build_router(state)).await {
            error!(error = %e, "Dashboard server exited");
        }
    });
}
