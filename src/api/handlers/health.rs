//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: Session store reachable
/// - **503 Service Unavailable**: Session store unreachable
///
/// A missing feedback configuration is reported but does not degrade the
/// service: pages still render and feedback still redirects.
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "sessions": { "status": "ok", "message": "Session store reachable" },
///     "notify": { "status": "ok", "message": "Feedback emails configured" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let sessions = check_sessions(&state).await;
    let notify = check_notify(&state);

    let healthy = sessions.is_ok();

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks { sessions, notify },
    };

    if healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_sessions(state: &AppState) -> CheckStatus {
    if state.sessions.health_check().await {
        CheckStatus::ok("Session store reachable")
    } else {
        CheckStatus::error("Session store unreachable")
    }
}

fn check_notify(state: &AppState) -> CheckStatus {
    if state.feedback_configured {
        CheckStatus::ok("Feedback emails configured")
    } else {
        CheckStatus::ok("No feedback config, feedback emails disabled")
    }
}
