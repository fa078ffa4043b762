//! IP guard stage.
//!
//! Caps total requests per source address before authentication runs, so
//! abusive anonymous traffic is contained without spending a cache lookup
//! on it.

use crate::admission::counter::CounterTable;
use crate::admission::pipeline::{AdmissionContext, AdmissionStage, StageOutcome};
use crate::admission::verdict::RejectReason;
use crate::config::schema::IpGuardConfig;

pub struct IpGuardStage {
    enabled: bool,
    max_requests: u64,
    counters: CounterTable,
}

impl IpGuardStage {
    pub fn new(config: &IpGuardConfig) -> Self {
        Self {
            enabled: config.enabled,
            max_requests: config.max_requests,
            counters: CounterTable::new(config.window_ms),
        }
    }
}

impl AdmissionStage for IpGuardStage {
    fn name(&self) -> &'static str {
        "ip_guard"
    }

    fn check(&self, ctx: &mut AdmissionContext<'_>) -> StageOutcome {
        if !self.enabled {
            return StageOutcome::Skip;
        }

        let hit = self.counters.hit(&ctx.addr.to_string(), self.max_requests);
        if hit.allowed {
            StageOutcome::Allow
        } else {
            StageOutcome::Reject(RejectReason::IpGuard)
        }
    }
}
