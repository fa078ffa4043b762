//! Built-in routes.
//!
//! Everything here sits behind the admission middleware like any
//! application route would.

use std::sync::Arc;

use axum::extract::{Extension, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::credentials::Credential;
use crate::http::response;
use crate::http::server::AppState;

/// Service health summary, including which admission stages are active.
pub async fn health(State(state): State<AppState>) -> Response {
    response::success(
        Some("Health check passed."),
        json!({
            "status": "ok",
            "service": state.config.app.name,
            "version": env!("CARGO_PKG_VERSION"),
            "uptime_secs": state.started_at.elapsed().as_secs(),
            "platform": std::env::consts::OS,
            "credentials_cached": state.cache.len(),
            "features": {
                "ip_guard": state.config.security.ip_guard.enabled,
                "auth": state.config.security.auth.enabled,
                "rate_limit": state.config.security.rate_limit.enabled,
            },
        }),
    )
}

pub async fn ping() -> Response {
    Json("Pong!").into_response()
}

/// Caller-facing status, echoing the resolved identity when there is one.
pub async fn status(
    State(state): State<AppState>,
    identity: Option<Extension<Arc<Credential>>>,
) -> Response {
    let identity = identity.map(|Extension(credential)| {
        json!({
            "id": credential.id,
            "kind": credential.kind.to_string(),
            "name": credential.name,
        })
    });

    response::success(
        None,
        json!({
            "service": state.config.app.name,
            "online": true,
            "uptime_secs": state.started_at.elapsed().as_secs(),
            "platform": std::env::consts::OS,
            "identity": identity,
        }),
    )
}

pub async fn not_found() -> Response {
    response::not_found()
}
