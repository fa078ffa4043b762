//! Authentication stage.
//!
//! Resolves the bearer credential against the cache and enforces address
//! binding and expiry, terminal on the first failing check. Binding a
//! credential to specific addresses means a stolen secret is useless
//! off-network.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::admission::pipeline::{AdmissionContext, AdmissionStage, StageOutcome};
use crate::admission::verdict::RejectReason;
use crate::credentials::CredentialCache;

pub struct AuthStage {
    enabled: bool,
    cache: Arc<CredentialCache>,
}

impl AuthStage {
    pub fn new(enabled: bool, cache: Arc<CredentialCache>) -> Self {
        Self { enabled, cache }
    }
}

impl AdmissionStage for AuthStage {
    fn name(&self) -> &'static str {
        "auth"
    }

    fn check(&self, ctx: &mut AdmissionContext<'_>) -> StageOutcome {
        if !self.enabled {
            return StageOutcome::Skip;
        }

        let secret = match ctx.request.authorization.as_deref().and_then(bearer_value) {
            Some(secret) => secret,
            None => return StageOutcome::Reject(RejectReason::NoToken),
        };

        let credential = match self.cache.lookup(secret) {
            Some(credential) => credential,
            None => return StageOutcome::Reject(RejectReason::Unauthorized),
        };

        if !credential.permits_address(&ctx.addr) {
            return StageOutcome::Reject(RejectReason::Unauthorized);
        }

        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64;
        if credential.is_expired_at(now) {
            return StageOutcome::Reject(RejectReason::ExpiredToken);
        }

        tracing::debug!(
            id = credential.id,
            kind = %credential.kind,
            addr = %ctx.addr,
            path = %ctx.request.path,
            "credential validated"
        );
        ctx.identity = Some(credential);
        StageOutcome::Allow
    }
}

/// Extract the bearer value from an `Authorization` header.
///
/// A `Bearer ` prefix is stripped case-insensitively; a header without the
/// scheme is treated as the raw secret. Whitespace-only values count as
/// absent.
fn bearer_value(header: &str) -> Option<&str> {
    let trimmed = header.trim();
    let value = if trimmed.len() > 6
        && trimmed[..6].eq_ignore_ascii_case("bearer")
        && trimmed[6..].starts_with(char::is_whitespace)
    {
        trimmed[6..].trim_start()
    } else {
        trimmed
    };

    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
