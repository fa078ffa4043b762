//! HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → server.rs (router, trace + timeout layers)
//!     → middleware.rs (admission verdict, identity extension, access log)
//!     → routes.rs handlers / 404 fallback
//!     → response.rs envelopes
//! ```

pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;

pub use server::{AppState, HttpServer};
