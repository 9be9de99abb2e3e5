//! Liveness endpoint

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, Json};
use bd_notifications::WorkerPool;
use serde::Serialize;

pub struct HealthState {
    started: Instant,
    pool: WorkerPool,
}

impl HealthState {
    pub fn new(pool: WorkerPool) -> Self {
        Self {
            started: Instant::now(),
            pool,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    /// Background jobs queued or running
    pub pending_jobs: usize,
}

/// GET /health
pub async fn health_check(State(state): State<Arc<HealthState>>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.started.elapsed().as_secs(),
        pending_jobs: state.pool.pending(),
    })
}
