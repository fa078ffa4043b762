//! Rate limit stage.
//!
//! Caps requests per resolved identity, falling back to the source address
//! for unauthenticated traffic. Keeps its own counter table: sharing window
//! state with the IP guard would let a burst against one identity exhaust
//! quota belonging to unrelated anonymous traffic.

use crate::admission::counter::CounterTable;
use crate::admission::pipeline::{AdmissionContext, AdmissionStage, StageOutcome};
use crate::admission::verdict::RejectReason;
use crate::config::schema::RateLimitConfig;

pub struct RateLimitStage {
    enabled: bool,
    default_max_requests: u64,
    counters: CounterTable,
}

impl RateLimitStage {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            enabled: config.enabled,
            default_max_requests: config.max_requests,
            counters: CounterTable::new(config.window_ms),
        }
    }
}

impl AdmissionStage for RateLimitStage {
    fn name(&self) -> &'static str {
        "rate_limit"
    }

    fn check(&self, ctx: &mut AdmissionContext<'_>) -> StageOutcome {
        if !self.enabled {
            return StageOutcome::Skip;
        }

        let (key, limit) = match &ctx.identity {
            Some(credential) => (
                format!("cred:{}", credential.id),
                credential.max_requests.unwrap_or(self.default_max_requests),
            ),
            None => (format!("addr:{}", ctx.addr), self.default_max_requests),
        };

        let hit = self.counters.hit(&key, limit);
        if hit.allowed {
            StageOutcome::Allow
        } else {
            tracing::debug!(key = %key, count = hit.count, limit, "rate limit exceeded");
            StageOutcome::Reject(RejectReason::RateLimit)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admission::pipeline::RequestDescriptor;
    use crate::credentials::{Credential, CredentialKind};
    use std::sync::Arc;

    fn stage(max_requests: u64) -> RateLimitStage {
        RateLimitStage::new(&RateLimitConfig {
            enabled: true,
            window_ms: 60_000,
            max_requests,
        })
    }

    fn request(addr: &str) -> RequestDescriptor {
        RequestDescriptor {
            addr: addr.parse().unwrap(),
            method: "GET".to_string(),
            path: "/".to_string(),
            authorization: None,
        }
    }

    fn credential(id: i64, max_requests: Option<u64>) -> Arc<Credential> {
        Arc::new(Credential {
            id,
            secret: format!("secret-{id}"),
            name: None,
            kind: CredentialKind::Personal,
            allowed_addresses: Vec::new(),
            max_requests,
            created_at: 0,
            expires_at: None,
        })
    }

    #[test]
    fn test_identity_key_uses_credential_quota() {
        let stage = stage(100);
        let req = request("10.0.0.1");

        // Credential override of 2 beats the generous default.
        for i in 0..3 {
            let mut ctx = AdmissionContext {
                request: &req,
                addr: req.addr,
                identity: Some(credential(7, Some(2))),
            };
            let outcome = stage.check(&mut ctx);
            if i < 2 {
                assert_eq!(outcome, StageOutcome::Allow);
            } else {
                assert_eq!(outcome, StageOutcome::Reject(RejectReason::RateLimit));
            }
        }
    }

    #[test]
    fn test_identity_and_address_counted_separately() {
        let stage = stage(1);
        let req = request("10.0.0.1");

        let mut with_identity = AdmissionContext {
            request: &req,
            addr: req.addr,
            identity: Some(credential(7, None)),
        };
        assert_eq!(stage.check(&mut with_identity), StageOutcome::Allow);

        // Anonymous traffic from the same address has its own window.
        let mut anonymous = AdmissionContext {
            request: &req,
            addr: req.addr,
            identity: None,
        };
        assert_eq!(stage.check(&mut anonymous), StageOutcome::Allow);
        assert_eq!(
            stage.check(&mut anonymous),
            StageOutcome::Reject(RejectReason::RateLimit)
        );
    }

    #[test]
    fn test_disabled_stage_skips() {
        let stage = RateLimitStage::new(&RateLimitConfig {
            enabled: false,
            window_ms: 60_000,
            max_requests: 1,
        });
        let req = request("10.0.0.1");
        let mut ctx = AdmissionContext { request: &req, addr: req.addr, identity: None };
        for _ in 0..5 {
            assert_eq!(stage.check(&mut ctx), StageOutcome::Skip);
        }
    }
}
