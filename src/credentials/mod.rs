//! Credential subsystem.
//!
//! # Data Flow
//! ```text
//! store (relational, external)
//!     → cache.rs reload() builds an immutable snapshot
//!     → atomic pointer swap (arc-swap)
//!     → lock-free lookup() on the request path
//!
//! refresh.rs re-runs reload() on a timer until shutdown.
//! ```
//!
//! # Design Decisions
//! - Snapshots are immutable after construction; a reload replaces, never
//!   mutates
//! - The first load happens during startup and is fatal on failure; later
//!   failures degrade to serving stale-but-valid data

pub mod cache;
pub mod refresh;
pub mod types;

pub use cache::{CredentialCache, CredentialSnapshot};
pub use refresh::spawn_refresh;
pub use types::{Credential, CredentialKind};
