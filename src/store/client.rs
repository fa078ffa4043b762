//! SQL client for the credential store.
//!
//! # Responsibilities
//! - Bootstrap the schema on startup
//! - Mint an initial credential when the store is empty
//! - Fetch all credentials joined with their allowed addresses
//!
//! # Design Decisions
//! - One row per credential-address pair (LEFT JOIN, address nullable)
//! - Malformed rows are skipped with a warning, never fatal to a fetch
//! - SQLite today; the SQL surface is engine-portable

use rand::RngCore;
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};

use crate::store::StoreError;

/// One credential-address pair as returned by the wholesale read.
///
/// A credential with no allowed addresses appears once with `address: None`;
/// a credential with N addresses appears N times.
#[derive(Debug, Clone)]
pub struct CredentialRow {
    pub id: i64,
    pub secret: String,
    pub name: Option<String>,
    pub kind: String,
    pub max_requests: Option<i64>,
    pub created_at: i64,
    pub expires_at: Option<i64>,
    pub address: Option<String>,
}

/// Async client over the credential store.
pub struct CredentialStore {
    pool: SqlitePool,
}

impl CredentialStore {
    /// Connect to the store.
    ///
    /// A single connection is enough: store reads happen only on the reload
    /// timer, never on the request path.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create the credential tables when they do not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS credentials (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                secret TEXT NOT NULL UNIQUE,
                name TEXT DEFAULT NULL,
                kind TEXT NOT NULL DEFAULT 'personal',
                max_requests INTEGER DEFAULT NULL,
                created_at INTEGER NOT NULL DEFAULT (unixepoch()),
                expires_at INTEGER DEFAULT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS credential_addresses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                credential_id INTEGER NOT NULL,
                address TEXT NOT NULL,
                FOREIGN KEY (credential_id) REFERENCES credentials(id) ON DELETE CASCADE
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        tracing::debug!("credential tables checked/created");
        Ok(())
    }

    /// Mint one credential bound to loopback when the store is empty, so a
    /// fresh deployment is reachable at all.
    pub async fn ensure_initial_credential(&self) -> Result<(), StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM credentials")
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.try_get("cnt")?;

        if count > 0 {
            tracing::debug!("credentials already exist, skipping initial credential");
            return Ok(());
        }

        let secret = generate_secret();
        self.insert_credential(
            &secret,
            Some("Initial credential"),
            "personal",
            &["127.0.0.1", "::1"],
            None,
            None,
        )
        .await?;

        tracing::info!(secret = %secret, "initial credential created");
        Ok(())
    }

    /// Insert a credential and its allowed addresses, returning the new id.
    pub async fn insert_credential(
        &self,
        secret: &str,
        name: Option<&str>,
        kind: &str,
        addresses: &[&str],
        max_requests: Option<i64>,
        expires_at: Option<i64>,
    ) -> Result<i64, StoreError> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query(
            r"
            INSERT INTO credentials (secret, name, kind, max_requests, expires_at)
            VALUES (?, ?, ?, ?, ?)
            ",
        )
        .bind(secret)
        .bind(name)
        .bind(kind)
        .bind(max_requests)
        .bind(expires_at)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        for address in addresses {
            sqlx::query(
                r"
                INSERT INTO credential_addresses (credential_id, address)
                VALUES (?, ?)
                ",
            )
            .bind(id)
            .bind(address)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(id)
    }

    /// Change a credential's per-window quota override.
    pub async fn update_max_requests(
        &self,
        secret: &str,
        max_requests: Option<i64>,
    ) -> Result<(), StoreError> {
        sqlx::query("UPDATE credentials SET max_requests = ? WHERE secret = ?")
            .bind(max_requests)
            .bind(secret)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Remove a credential (and, via cascade, its addresses).
    pub async fn delete_credential(&self, id: i64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM credential_addresses WHERE credential_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        sqlx::query("DELETE FROM credentials WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Wholesale read of every credential joined with its allowed addresses.
    ///
    /// Malformed rows are dropped here with a warning; one bad row must not
    /// sink an entire reload.
    pub async fn fetch_credential_rows(&self) -> Result<Vec<CredentialRow>, StoreError> {
        let rows = sqlx::query(
            r"
            SELECT
                c.id,
                c.secret,
                c.name,
                c.kind,
                c.max_requests,
                c.created_at,
                c.expires_at,
                a.address
            FROM credentials c
            LEFT JOIN credential_addresses a ON a.credential_id = c.id
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut out = Vec::with_capacity(rows.len());
        for row in &rows {
            match Self::row_to_credential_row(row) {
                Ok(parsed) => out.push(parsed),
                Err(e) => tracing::warn!(error = %e, "skipping malformed credential row"),
            }
        }

        Ok(out)
    }

    /// Close the underlying pool. Called after the refresh task has stopped.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    fn row_to_credential_row(row: &SqliteRow) -> Result<CredentialRow, StoreError> {
        let secret: String = Self::get_required(row, "secret")?;
        if secret.is_empty() {
            return Err(StoreError::MalformedRow("empty secret".to_string()));
        }

        let kind: String = Self::get_required(row, "kind")?;

        Ok(CredentialRow {
            id: Self::get_required(row, "id")?,
            secret,
            name: row.try_get("name").unwrap_or(None),
            kind,
            max_requests: row.try_get("max_requests").unwrap_or(None),
            created_at: Self::get_required(row, "created_at")?,
            expires_at: row.try_get("expires_at").unwrap_or(None),
            address: row.try_get("address").unwrap_or(None),
        })
    }

    fn get_required<'r, T>(row: &'r SqliteRow, column: &str) -> Result<T, StoreError>
    where
        T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
    {
        row.try_get::<T, _>(column)
            .map_err(|e| StoreError::MalformedRow(format!("column '{column}': {e}")))
    }
}

/// 64 hex chars of OS randomness, same shape as the original issuance tool.
fn generate_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
