//! `mnemo hook heartbeat` — session-alive webhook on every prompt.
//!
//! Unlike other hooks, the heartbeat never produces stdout — the agent
//! never sees it. It only fires a webhook, writes to the event log, and
//! tracks whether the context directory changed since the last beat.

use crate::commands;
use crate::core::config::{self, Config};
use crate::core::input::{self, HookInput};
use crate::core::notify::TemplateRef;
use crate::core::state::SessionState;
use crate::core::{events, message, notify, throttle};
use serde_json::json;
use std::path::Path;

const HOOK: &str = "heartbeat";

pub fn run() {
    let cfg = config::load();
    let input = input::read_stdin();
    let state = SessionState::open();
    execute(&cfg, &state, &input);
}

fn execute(cfg: &Config, state: &SessionState, input: &HookInput) {
    if !commands::is_initialized(cfg) {
        return;
    }
    let session = input.session().to_string();
    if throttle::paused_turns(state, &session) > 0 {
        return;
    }

    let count = state.increment(&format!("heartbeat-{session}"));

    // Detect context modification since the last heartbeat.
    let mtime_entry = format!("heartbeat-mtime-{session}");
    let current_mtime = latest_context_mtime(&cfg.context_dir());
    let context_modified = current_mtime > state.read_stamp(&mtime_entry);
    state.write_stamp(&mtime_entry, current_mtime);

    let ref_ = TemplateRef::with_vars(
        HOOK,
        "pulse",
        message::vars(&[
            ("prompt_count", json!(count)),
            ("session_id", json!(session)),
            ("context_modified", json!(context_modified)),
        ]),
    );
    let msg = format!("heartbeat: prompt #{count} (context_modified={context_modified})");
    notify::send(cfg, HOOK, &msg, &session, Some(ref_.clone()));
    events::append(cfg, HOOK, &msg, &session, Some(ref_));

    commands::log_line(
        cfg,
        HOOK,
        &session,
        &format!("prompt#{count} context_modified={context_modified}"),
    );
}

/// Newest mtime (Unix seconds) across top-level files in the context
/// directory. 0 when the directory is unreadable.
fn latest_context_mtime(context_dir: &Path) -> i64 {
    let Ok(entries) = std::fs::read_dir(context_dir) else {
        return 0;
    };
    entries
        .flatten()
        .filter_map(|e| e.metadata().ok())
        .filter(|m| m.is_file())
        .filter_map(|m| m.modified().ok())
        .filter_map(|m| {
            m.duration_since(std::time::UNIX_EPOCH)
                .ok()
                .map(|d| d.as_secs() as i64)
        })
        .max()
        .unwrap_or(0)
}
