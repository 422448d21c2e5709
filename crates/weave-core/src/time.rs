//! Unix-seconds time helpers (no chrono dependency).

use std::time::{SystemTime, UNIX_EPOCH};

/// Current UTC time as Unix seconds.
pub fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Hours from `earlier` to `later`. Zero when `later` precedes `earlier`.
pub fn hours_between(earlier: u64, later: u64) -> f64 {
    later.saturating_sub(earlier) as f64 / 3600.0
}
