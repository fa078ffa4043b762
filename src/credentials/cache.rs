//! Credential caching.
//!
//! # Responsibilities
//! - Hold the current in-memory snapshot of valid credentials
//! - Rebuild it wholesale from the store and swap it in atomically
//! - Serve lock-free lookups on the request path
//!
//! # Design Decisions
//! - The snapshot is an immutable value behind an `ArcSwap` pointer; readers
//!   always observe either the pre- or post-reload snapshot in full
//! - A failed reload leaves the previous snapshot authoritative
//! - Expiry and address checks belong to the authentication stage, not here

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::admission::normalize_addr;
use crate::credentials::types::{Credential, CredentialKind};
use crate::observability::metrics;
use crate::store::{CredentialRow, CredentialStore, StoreError};

/// Immutable point-in-time view of all valid credentials, keyed by secret.
#[derive(Debug, Default)]
pub struct CredentialSnapshot {
    by_secret: HashMap<String, Arc<Credential>>,
}

impl CredentialSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Aggregate credential-address rows into credentials.
    ///
    /// Rows with an unknown kind are dropped; unparseable allow-list
    /// addresses are dropped individually. Allow-list entries are
    /// canonicalized the same way request addresses are, so a stored
    /// `::ffff:10.0.0.1` binds the same as `10.0.0.1`.
    pub fn from_rows(rows: Vec<CredentialRow>) -> Self {
        let mut building: HashMap<String, Credential> = HashMap::new();

        for row in rows {
            let kind = match row.kind.parse::<CredentialKind>() {
                Ok(kind) => kind,
                Err(e) => {
                    tracing::warn!(id = row.id, error = %e, "dropping credential row");
                    continue;
                }
            };

            let entry = building.entry(row.secret.clone()).or_insert_with(|| Credential {
                id: row.id,
                secret: row.secret.clone(),
                name: row.name.clone(),
                kind,
                allowed_addresses: Vec::new(),
                max_requests: row.max_requests.and_then(|m| u64::try_from(m).ok()),
                created_at: row.created_at,
                expires_at: row.expires_at,
            });

            if let Some(raw) = &row.address {
                match raw.parse::<IpAddr>() {
                    Ok(addr) => {
                        let addr = normalize_addr(addr);
                        if !entry.allowed_addresses.contains(&addr) {
                            entry.allowed_addresses.push(addr);
                        }
                    }
                    Err(_) => {
                        tracing::warn!(id = row.id, address = %raw, "ignoring unparseable allowed address");
                    }
                }
            }
        }

        Self {
            by_secret: building.into_iter().map(|(k, v)| (k, Arc::new(v))).collect(),
        }
    }

    pub fn get(&self, secret: &str) -> Option<Arc<Credential>> {
        self.by_secret.get(secret).cloned()
    }

    pub fn len(&self) -> usize {
        self.by_secret.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_secret.is_empty()
    }
}

/// Thread-safe credential cache with an atomically replaceable snapshot.
pub struct CredentialCache {
    store: CredentialStore,
    current: ArcSwap<CredentialSnapshot>,
}

impl CredentialCache {
    /// Create a cache with an empty snapshot; callers run [`reload`] before
    /// serving (startup treats a first-load failure as fatal).
    ///
    /// [`reload`]: CredentialCache::reload
    pub fn new(store: CredentialStore) -> Self {
        Self {
            store,
            current: ArcSwap::from_pointee(CredentialSnapshot::empty()),
        }
    }

    /// Full read of the store, building and swapping in a new snapshot.
    ///
    /// Returns the number of credentials loaded. On failure the previous
    /// snapshot stays authoritative and serving continues uninterrupted.
    pub async fn reload(&self) -> Result<usize, StoreError> {
        let rows = self.store.fetch_credential_rows().await?;
        let snapshot = CredentialSnapshot::from_rows(rows);
        let count = snapshot.len();

        self.current.store(Arc::new(snapshot));

        metrics::record_cache_size(count);
        tracing::info!(count, "credentials loaded into memory");
        Ok(count)
    }

    /// Pure lookup against the current snapshot. No expiry or address
    /// checks, no I/O, no blocking.
    pub fn lookup(&self, secret: &str) -> Option<Arc<Credential>> {
        self.current.load().get(secret)
    }

    /// Number of credentials in the current snapshot.
    pub fn len(&self) -> usize {
        self.current.load().len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.load().is_empty()
    }

    /// The underlying store client, for schema bootstrap and shutdown.
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }
}
