//! Sync timing utilities for cooldown management
//!
//! Pure functions that can be tested without a running sync loop.

use chrono::{DateTime, Utc};

/// Check if enough time has elapsed since the last sync to allow a new sync.
///
/// # Arguments
/// * `last_sync_at` - When the last successful sync completed (None if never synced)
/// * `cooldown_secs` - Minimum seconds that must elapse between syncs
/// * `now` - Current time
pub fn cooldown_elapsed(
    last_sync_at: Option<DateTime<Utc>>,
    cooldown_secs: u64,
    now: DateTime<Utc>,
) -> bool {
    let cooldown = i64::try_from(cooldown_secs).unwrap_or(i64::MAX);
    match last_sync_at {
        Some(last) => (now - last).num_seconds() >= cooldown,
        None => true,
    }
}
