//! Credential store subsystem.
//!
//! The store is an external relational database holding issued credentials
//! and their address allow-lists. The gatekeeper only ever reads it
//! wholesale, on the cache refresh timer; nothing on the request path
//! touches the store.

pub mod client;

pub use client::{CredentialRow, CredentialStore};

use thiserror::Error;

/// Errors from credential store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database was unreachable or the query failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A row was missing required fields or carried values outside the
    /// expected domain.
    #[error("malformed credential row: {0}")]
    MalformedRow(String),
}
