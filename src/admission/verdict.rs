//! Admission verdicts.

use std::sync::Arc;

use axum::http::StatusCode;

use crate::credentials::Credential;

/// Why a request was turned away.
///
/// Reason codes and their status mappings are part of the client-facing
/// contract; changing either breaks documented behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    NoToken,
    Unauthorized,
    ExpiredToken,
    RateLimit,
    IpGuard,
}

impl RejectReason {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoToken => "NO_TOKEN",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::ExpiredToken => "EXPIRED_TOKEN",
            Self::RateLimit => "RATE_LIMIT",
            Self::IpGuard => "IP_GUARD",
        }
    }

    /// Human-readable companion string.
    pub fn message(&self) -> &'static str {
        match self {
            Self::NoToken => "No token provided.",
            Self::Unauthorized => "Unauthorized access.",
            Self::ExpiredToken => "Expired token.",
            Self::RateLimit => "Too many requests.",
            Self::IpGuard => "Too many requests.",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NoToken => StatusCode::UNAUTHORIZED,
            Self::Unauthorized | Self::ExpiredToken => StatusCode::FORBIDDEN,
            Self::RateLimit | Self::IpGuard => StatusCode::TOO_MANY_REQUESTS,
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// The pipeline's decision for one request.
#[derive(Debug, Clone)]
pub enum Verdict {
    /// Request may proceed. Carries the resolved identity, or `None` when
    /// authentication was disabled or bypassed.
    Allow { identity: Option<Arc<Credential>> },
    /// Request is turned away; the reason maps to a fixed status code.
    Reject { reason: RejectReason },
}

impl Verdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow { .. })
    }
}
