//! HTTP server setup.
//!
//! # Responsibilities
//! - Build the Axum router and application state
//! - Wire the admission middleware in front of every route
//! - Serve with graceful shutdown
//!
//! # Design Decisions
//! - Route dispatch and response shaping stay out of the admission core;
//!   this layer only consumes its verdicts
//! - The listener is bound by the caller, so tests can use an ephemeral port

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::admission::AdmissionPipeline;
use crate::config::GatekeeperConfig;
use crate::credentials::CredentialCache;
use crate::http::middleware::admission_middleware;
use crate::http::routes;

/// Application state injected into handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatekeeperConfig>,
    pub pipeline: Arc<AdmissionPipeline>,
    pub cache: Arc<CredentialCache>,
    pub started_at: Instant,
}

/// HTTP server for the gatekeeper.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a server over an already-loaded credential cache.
    pub fn new(config: GatekeeperConfig, cache: Arc<CredentialCache>) -> Self {
        let pipeline = Arc::new(AdmissionPipeline::new(&config.security, cache.clone()));
        let state = AppState {
            config: Arc::new(config),
            pipeline,
            cache,
            started_at: Instant::now(),
        };

        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let request_timeout = Duration::from_secs(state.config.timeouts.request_secs);

        Router::new()
            .route("/health", get(routes::health))
            .route("/ping", get(routes::ping))
            .route("/status", get(routes::status))
            .fallback(routes::not_found)
            .layer(from_fn_with_state(state.clone(), admission_middleware))
            .layer(TimeoutLayer::new(request_timeout))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Run the server until the shutdown signal arrives.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
