//! Admission subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → pipeline.rs (normalize source address, run stages in order)
//!     → ip_guard.rs (per-address cap, pre-auth)
//!     → auth.rs (credential lookup, address binding, expiry)
//!     → rate_limit.rs (per-identity cap)
//!     → Verdict (Allow with identity / Reject with reason)
//! ```
//!
//! # Design Decisions
//! - Fail closed: any failing check rejects
//! - Stage order is fixed; the first rejection wins
//! - The guard and the rate limiter own separate counter tables

pub mod auth;
pub mod counter;
pub mod ip_guard;
pub mod pipeline;
pub mod rate_limit;
pub mod verdict;

pub use counter::{CounterTable, Hit};
pub use pipeline::{AdmissionPipeline, RequestDescriptor};
pub use verdict::{RejectReason, Verdict};

use std::net::IpAddr;

/// Canonicalize a source address.
///
/// Dual-stack listeners report IPv4 peers as IPv4-mapped IPv6 addresses;
/// those reduce to their IPv4 form so binding and counting see one address
/// regardless of listener family. Applied exactly once, at pipeline entry,
/// and to stored allow-list entries at load.
pub fn normalize_addr(addr: IpAddr) -> IpAddr {
    match addr {
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => IpAddr::V4(v4),
            None => addr,
        },
        IpAddr::V4(_) => addr,
    }
}
