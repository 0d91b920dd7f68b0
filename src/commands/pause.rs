//! `mnemo pause` / `mnemo resume` — session-scoped hook pausing.
//!
//! Pausing creates a pause counter that makes every nudge hook no-op for
//! the session. Security hooks (block-dangerous-commands) and
//! housekeeping (cleanup-tmp) are unaffected. The session ID comes from
//! stdin JSON (same as hooks) or the `--session-id` flag.

use crate::core::input;
use crate::core::state::SessionState;
use crate::core::throttle::pause_marker;

pub fn run_pause(session_id: Option<String>) {
    let state = SessionState::open();
    let session = resolve_session(session_id);
    pause(&state, &session);
    println!("mnemo hooks paused for session {session}");
}

pub fn run_resume(session_id: Option<String>) {
    let state = SessionState::open();
    let session = resolve_session(session_id);
    resume(&state, &session);
    println!("mnemo hooks resumed for session {session}");
}

fn resolve_session(flag: Option<String>) -> String {
    match flag {
        Some(id) if !id.is_empty() => id,
        _ => input::read_stdin().session().to_string(),
    }
}

fn pause(state: &SessionState, session: &str) {
    state.write_counter(&pause_marker(session), 0);
}

fn resume(state: &SessionState, session: &str) {
    state.remove(&pause_marker(session));
}
