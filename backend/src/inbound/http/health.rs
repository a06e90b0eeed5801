//! Health endpoints: liveness and readiness probes for orchestration.
//!
//! Readiness is two-fold: the startup flag set by `main` once the server is
//! bound, and a live check that the template catalog actually has content.
//! A deployment whose catalog seed failed serves no useful traffic, so it
//! should not be routed to.

use actix_web::{get, http::header, web, HttpResponse};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::inbound::http::state::HttpState;

/// Shared health state for readiness and liveness checks.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
        }
    }
}

impl HealthState {
    /// Create a new health state starting as not ready but live.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark startup as complete.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Flag the service as unhealthy so liveness checks fail fast during
    /// shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    /// Return the startup flag.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Return liveness state. When false, liveness probes emit 503 to trigger
    /// restarts.
    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }
}

fn probe_response(probe_ok: bool) -> HttpResponse {
    let mut response = if probe_ok {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    };

    response
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .finish()
}

/// Readiness probe. 200 once startup completed and the template catalog has
/// content; 503 otherwise.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 503, description = "Still starting, or the catalog is empty")
    )
)]
#[get("/health/ready")]
pub async fn ready(health: web::Data<HealthState>, state: web::Data<HttpState>) -> HttpResponse {
    let catalog_seeded = match state.catalog.list_templates().await {
        Ok(templates) => !templates.is_empty(),
        Err(error) => {
            tracing::warn!(%error, "readiness catalog check failed");
            false
        }
    };
    probe_response(health.is_ready() && catalog_seeded)
}

/// Liveness probe. Returns 200 while the process is marked alive and 503 once
/// draining. Call [`HealthState::mark_unhealthy`] before graceful shutdown.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is alive"),
        (status = 503, description = "Server is shutting down")
    )
)]
#[get("/health/live")]
pub async fn live(health: web::Data<HealthState>) -> HttpResponse {
    probe_response(health.is_alive())
}
