//! Generic sliding-window hit counter.
//!
//! # Responsibilities
//! - Count hits per string key inside a fixed window
//! - Decide allow/deny with count-then-compare semantics
//! - Bound memory with an opportunistic sweep of expired entries
//!
//! # Design Decisions
//! - One table per consumer (guard, rate limit); window state is never
//!   shared between layers
//! - Counters are process-local; a multi-instance deployment under-counts
//!   globally and that is accepted
//! - Per-entry mutation goes through the map's shard lock, so hits on the
//!   same key are synchronized while distinct keys do not contend

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;

/// Outcome of a single hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub allowed: bool,
    /// Hits observed in the current window, including this one.
    pub count: u64,
    /// Unix-epoch milliseconds at which the window resets.
    pub window_end: u64,
}

#[derive(Debug)]
struct CounterEntry {
    count: u64,
    window_end: u64,
}

/// Sliding-window counter table with a fixed window length.
pub struct CounterTable {
    entries: DashMap<String, CounterEntry>,
    window_ms: u64,
    last_sweep: AtomicU64,
}

impl CounterTable {
    pub fn new(window_ms: u64) -> Self {
        Self {
            entries: DashMap::new(),
            window_ms,
            last_sweep: AtomicU64::new(0),
        }
    }

    /// Register a hit for `key` and decide against `limit`.
    ///
    /// A fresh (or elapsed) window starts at count 1 and always allows.
    /// Otherwise the count is incremented first and compared after, so the
    /// hit that reaches `limit + 1` is the first one denied.
    pub fn hit(&self, key: &str, limit: u64) -> Hit {
        self.hit_at(key, limit, now_ms())
    }

    fn hit_at(&self, key: &str, limit: u64, now: u64) -> Hit {
        self.sweep_at(now);

        let mut entry = self
            .entries
            .entry(key.to_string())
            .or_insert(CounterEntry { count: 0, window_end: 0 });

        if now >= entry.window_end {
            entry.count = 1;
            entry.window_end = now + self.window_ms;
            return Hit {
                allowed: true,
                count: 1,
                window_end: entry.window_end,
            };
        }

        entry.count += 1;
        Hit {
            allowed: entry.count <= limit,
            count: entry.count,
            window_end: entry.window_end,
        }
    }

    /// Drop expired entries, at most once per window duration.
    ///
    /// Amortized: the scan only runs when more than one window has elapsed
    /// since the previous sweep, and a lost CAS means another caller is
    /// already sweeping.
    fn sweep_at(&self, now: u64) {
        let last = self.last_sweep.load(Ordering::Relaxed);
        if now.saturating_sub(last) <= self.window_ms {
            return;
        }
        if self
            .last_sweep
            .compare_exchange(last, now, Ordering::Relaxed, Ordering::Relaxed)
            .is_ok()
        {
            self.entries.retain(|_, entry| entry.window_end > now);
        }
    }

    /// Number of live (possibly stale) entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
