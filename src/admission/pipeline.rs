//! Admission pipeline orchestration.
//!
//! # Responsibilities
//! - Normalize the source address once, at entry
//! - Run the stages in fixed order: IP guard → authentication → rate limit
//! - Stop at the first rejection and return it verbatim
//!
//! # Design Decisions
//! - Stages are an explicit ordered list, not a chain of nested wrappers;
//!   control flow between them is visible in one place
//! - The pipeline is synchronous and does no I/O; it is safe to call from
//!   any number of workers without external locking

use std::net::IpAddr;
use std::sync::Arc;

use crate::admission::auth::AuthStage;
use crate::admission::ip_guard::IpGuardStage;
use crate::admission::normalize_addr;
use crate::admission::rate_limit::RateLimitStage;
use crate::admission::verdict::{RejectReason, Verdict};
use crate::config::schema::SecurityConfig;
use crate::credentials::{Credential, CredentialCache};

/// Everything the pipeline needs to know about one inbound request.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// Source address as seen by the listener, pre-normalization.
    pub addr: IpAddr,
    pub method: String,
    pub path: String,
    /// Raw `Authorization` header value, if present.
    pub authorization: Option<String>,
}

/// Mutable per-request state threaded through the stages.
///
/// Later stages observe what earlier stages resolved; the authentication
/// stage fills in `identity`.
pub struct AdmissionContext<'a> {
    pub request: &'a RequestDescriptor,
    /// Normalized source address; stages never re-derive it.
    pub addr: IpAddr,
    pub identity: Option<Arc<Credential>>,
}

/// What one stage decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// Stage passed; continue with the next one.
    Allow,
    /// Stage is disabled by configuration; continue untouched.
    Skip,
    /// Stage turned the request away; the pipeline stops here.
    Reject(RejectReason),
}

/// One independent admission check.
pub trait AdmissionStage: Send + Sync {
    fn name(&self) -> &'static str;

    fn check(&self, ctx: &mut AdmissionContext<'_>) -> StageOutcome;
}

/// Ordered composition of the admission stages.
pub struct AdmissionPipeline {
    stages: Vec<Box<dyn AdmissionStage>>,
}

impl AdmissionPipeline {
    /// Build the standard guard → auth → rate-limit pipeline.
    pub fn new(security: &SecurityConfig, cache: Arc<CredentialCache>) -> Self {
        Self {
            stages: vec![
                Box::new(IpGuardStage::new(&security.ip_guard)),
                Box::new(AuthStage::new(security.auth.enabled, cache)),
                Box::new(RateLimitStage::new(&security.rate_limit)),
            ],
        }
    }

    /// Decide whether one request may reach application logic.
    pub fn admit(&self, request: &RequestDescriptor) -> Verdict {
        let addr = normalize_addr(request.addr);

        tracing::debug!(
            method = %request.method,
            path = %request.path,
            addr = %addr,
            "admission check"
        );

        let mut ctx = AdmissionContext {
            request,
            addr,
            identity: None,
        };

        for stage in &self.stages {
            match stage.check(&mut ctx) {
                StageOutcome::Allow | StageOutcome::Skip => {}
                StageOutcome::Reject(reason) => {
                    tracing::warn!(
                        stage = stage.name(),
                        reason = %reason,
                        method = %request.method,
                        path = %request.path,
                        addr = %addr,
                        "request rejected"
                    );
                    return Verdict::Reject { reason };
                }
            }
        }

        Verdict::Allow {
            identity: ctx.identity,
        }
    }
}
