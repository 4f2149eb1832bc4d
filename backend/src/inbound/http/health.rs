//! Health endpoints: liveness, readiness and secret store probes.
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};

use crate::domain::ports::{SecretStoreHealth, SecretStoreProbe};

/// Shared health state for orchestration probes.
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
    secret_store: Option<Arc<dyn SecretStoreProbe>>,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
            secret_store: None,
        }
    }
}

impl HealthState {
    /// Not ready, live, and without a secret store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the secret store checked by `/health/secrets`.
    #[must_use]
    pub fn with_secret_store(mut self, probe: Arc<dyn SecretStoreProbe>) -> Self {
        self.secret_store = Some(probe);
        self
    }

    /// Start passing readiness checks.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Fail liveness checks so orchestrators stop routing during shutdown.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    /// Whether readiness checks pass.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Whether liveness checks pass.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
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
}

/// Readiness probe: 200 once the server accepts traffic, 503 before.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Server is ready to handle traffic"),
        (status = 503, description = "Server is not ready")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_ready())
}

/// Liveness probe: 200 while alive, 503 once draining.
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
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    HealthState::probe_response(state.is_alive())
}

/// Secret store connectivity and token validity.
#[utoipa::path(
    get,
    path = "/health/secrets",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Secret store healthy", body = SecretStoreHealth),
        (status = 503, description = "Secret store unhealthy", body = SecretStoreHealth),
        (status = 404, description = "No secret store configured")
    )
)]
#[get("/health/secrets")]
pub async fn secrets(state: web::Data<HealthState>) -> HttpResponse {
    let Some(probe) = state.secret_store.as_ref() else {
        return HttpResponse::NotFound()
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .finish();
    };
    let health = probe.check().await;
    let mut response = if health.is_healthy() {
        HttpResponse::Ok()
    } else {
        HttpResponse::ServiceUnavailable()
    };
    response
        .insert_header((header::CACHE_CONTROL, "no-store"))
        .json(health)
}
