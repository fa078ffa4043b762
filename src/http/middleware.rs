//! Admission middleware.
//!
//! The single choke point between the listener and every handler: builds a
//! request descriptor, asks the pipeline for a verdict, and either forwards
//! the request (identity attached) or answers with the rejection envelope.

use std::net::SocketAddr;
use std::time::Instant;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{header, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use crate::admission::{RequestDescriptor, Verdict};
use crate::http::response;
use crate::http::server::AppState;
use crate::observability::metrics;

pub async fn admission_middleware(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    mut request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let request_id = Uuid::new_v4().to_string();

    let descriptor = RequestDescriptor {
        addr: peer.ip(),
        method: request.method().to_string(),
        path: request.uri().path().to_string(),
        authorization: request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
    };

    let verdict = state.pipeline.admit(&descriptor);
    metrics::record_admission(verdict.is_allowed());

    let mut response = match verdict {
        Verdict::Allow { identity } => {
            let identity_label = identity
                .as_ref()
                .map_or_else(|| "none".to_string(), |c| format!("{}:{}", c.kind, c.id));

            if let Some(credential) = identity {
                request.extensions_mut().insert(credential);
            }

            let response = next.run(request).await;
            tracing::info!(
                request_id = %request_id,
                method = %descriptor.method,
                path = %descriptor.path,
                status = response.status().as_u16(),
                identity = %identity_label,
                duration_ms = started.elapsed().as_millis() as u64,
                "request completed"
            );
            response
        }
        Verdict::Reject { reason } => {
            metrics::record_rejection(reason.code());
            let response = response::reject(reason);
            tracing::info!(
                request_id = %request_id,
                method = %descriptor.method,
                path = %descriptor.path,
                status = response.status().as_u16(),
                identity = "none",
                duration_ms = started.elapsed().as_millis() as u64,
                "request rejected"
            );
            response
        }
    };

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("x-request-id", value);
    }
    response
}
