//! Credential data model.

use std::net::IpAddr;

/// Issuance class of a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    Personal,
    System,
}

impl std::str::FromStr for CredentialKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "personal" => Ok(Self::Personal),
            "system" => Ok(Self::System),
            other => Err(format!("unknown credential kind '{other}'")),
        }
    }
}

impl std::fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Personal => write!(f, "personal"),
            Self::System => write!(f, "system"),
        }
    }
}

/// One issued access credential, loaded read-only from the store.
///
/// Instances are never mutated after snapshot construction; removal happens
/// only through a reload that omits them.
#[derive(Debug, Clone)]
pub struct Credential {
    /// Store-assigned identifier.
    pub id: i64,
    /// Raw bearer value, unique across all credentials.
    pub secret: String,
    /// Optional operator-facing label.
    pub name: Option<String>,
    pub kind: CredentialKind,
    /// Source addresses authorized to present this credential. Empty means
    /// the credential is unusable from anywhere (fail closed).
    pub allowed_addresses: Vec<IpAddr>,
    /// Per-window quota override; `None` falls back to the global default.
    pub max_requests: Option<u64>,
    /// Unix seconds.
    pub created_at: i64,
    /// Unix seconds; `None` never expires.
    pub expires_at: Option<i64>,
}

impl Credential {
    /// Whether the credential may be presented from `addr`.
    pub fn permits_address(&self, addr: &IpAddr) -> bool {
        self.allowed_addresses.contains(addr)
    }

    /// Expiry check against a caller-supplied clock. The boundary is
    /// inclusive: a credential expiring exactly now is already expired.
    pub fn is_expired_at(&self, now_secs: i64) -> bool {
        matches!(self.expires_at, Some(expires) if expires <= now_secs)
    }
}
