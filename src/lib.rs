//! HTTP admission gatekeeper.
//!
//! Before a request reaches business logic it passes credential validation,
//! per-identity rate limiting, and abusive-traffic containment:
//!
//! ```text
//! inbound request → IP guard → authentication → rate limit → verdict
//! ```
//!
//! Each stage may short-circuit to a rejection; only when every enabled
//! stage allows does the request proceed. Credentials live in an external
//! relational store and are served from an in-memory snapshot that is
//! refreshed atomically on a timer.

pub mod admission;
pub mod config;
pub mod credentials;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod store;

pub use admission::{AdmissionPipeline, RequestDescriptor, Verdict};
pub use config::GatekeeperConfig;
pub use credentials::CredentialCache;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
