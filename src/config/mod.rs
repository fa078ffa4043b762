//! Configuration subsystem.
//!
//! # Data Flow
//! ```text
//! gatekeeper.toml
//!     → loader.rs (read + parse)
//!     → validation.rs (semantic checks, all errors reported)
//!     → schema.rs types consumed by the rest of the system
//! ```
//!
//! # Design Decisions
//! - Every section has a `Default`; a missing file or section falls back to
//!   safe defaults rather than failing startup
//! - Validation is pure and runs before the config is accepted

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::GatekeeperConfig;
