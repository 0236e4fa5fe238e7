use super::state::ApiState;
use axum::Json;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use brgy_domain::constants::SYSTEM_TAG;
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

/// Liveness plus a database round-trip.
#[derive(Debug, Serialize, ToSchema)]
pub(super) struct HealthResponse {
    /// `up`, or `degraded` when the database does not answer.
    status: &'static str,
    version: &'static str,
    /// Seconds since the request state was built.
    uptime: u64,
    database: &'static str,
    slices: Vec<&'static str>,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = OK, description = "Service and database are up", body = HealthResponse),
        (status = SERVICE_UNAVAILABLE, description = "Database unreachable", body = HealthResponse),
    ),
    tag = SYSTEM_TAG,
)]
pub(super) async fn health_handler(State(state): State<ApiState>) -> impl IntoResponse {
    let database_up = match state.database.health().await {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Health check: database unreachable");
            false
        },
    };

    let body = HealthResponse {
        status: if database_up { "up" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime: state.started_at.elapsed().as_secs(),
        database: if database_up { "up" } else { "down" },
        slices: state.slice_names().collect(),
    };
    let status = if database_up { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    (status, [(header::CACHE_CONTROL, "no-store")], Json(body))
}
