//! Process lifecycle.
//!
//! Startup order lives in `main`: schema bootstrap, first credential load
//! (fatal on failure), listener bind, background refresh, serve. Shutdown
//! runs it backwards: stop accepting, stop the refresh timer, close the
//! store.

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
