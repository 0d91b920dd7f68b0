//! `mnemo mark-wrapped-up` — suppress checkpoint nudges after wrap-up.
//!
//! Writes a marker that the checkpoint hook consults before emitting, so
//! the wrap-up ceremony itself does not trigger noisy reminders. The
//! marker expires after 2 hours (checked by mtime; nothing deletes it
//! eagerly). Called by the wrap-up skill, not by users directly.

use crate::core::state::SessionState;

const MARKER: &str = "wrapped-up";

pub fn run() {
    SessionState::open().touch(MARKER);
    println!("marked wrapped-up");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_marker_touched() {
        let tmp = TempDir::new().unwrap();
        let state = SessionState::at(tmp.path());
        state.touch(MARKER);
        assert!(state.exists(MARKER));
        // Touching again refreshes rather than failing
        state.touch(MARKER);
        assert!(state.exists(MARKER));
    }
}
