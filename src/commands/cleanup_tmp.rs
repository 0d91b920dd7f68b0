//! `mnemo hook cleanup-tmp` — remove stale state entries on session end.
//!
//! Runs silently; the state store's retention window bounds how long
//! markers and counters outlive their sessions.

use crate::core::state::SessionState;
use std::time::Duration;

/// Maximum age for state entries before cleanup.
const MAX_AGE: Duration = Duration::from_secs(15 * 24 * 3600);

pub fn run() {
    SessionState::open().sweep(MAX_AGE);
}
