//! Hook handlers and plumbing commands.
//!
//! Every hook is a thin composition of the core pieces: read input →
//! pause gate → throttle check → resolve message (or build the injection
//! payload) → emit → fan out. Shared formatting and diagnostics helpers
//! live here.

pub mod block_dangerous;
pub mod check_backup_age;
pub mod check_context_size;
pub mod check_journal;
pub mod check_knowledge;
pub mod check_resources;
pub mod check_version;
pub mod cleanup_tmp;
pub mod context_load;
pub mod events;
pub mod heartbeat;
pub mod init;
pub mod mark_wrapped_up;
pub mod message;
pub mod pause;
pub mod qa_reminder;
pub mod specs_nudge;
pub mod webhook;

use crate::core::config::Config;
use crate::core::inject::REQUIRED_FILES;
use std::fs::OpenOptions;
use std::io::Write;

/// Standard bottom border for hook message boxes.
pub const BOX_BOTTOM: &str = "└──────────────────────────────────────────────────";

/// Wrap each line of content with the │ box-drawing prefix. Trailing
/// newlines are trimmed first so no empty box line is produced.
pub fn box_lines(content: &str) -> String {
    let mut out = String::new();
    for line in content.trim_end_matches('\n').lines() {
        out.push_str("│ ");
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// One-line context directory identifier for box footers. Empty when the
/// directory cannot be rendered (callers omit the footer).
pub fn context_dir_line(cfg: &Config) -> String {
    let dir = cfg.context_dir();
    if dir.as_os_str().is_empty() {
        return String::new();
    }
    format!("Context: {}", dir.display())
}

/// Whether the context directory has been set up via `mnemo init`.
/// Hooks no-op when this is false to avoid creating partial state.
pub fn is_initialized(cfg: &Config) -> bool {
    let dir = cfg.context_dir();
    REQUIRED_FILES.iter().all(|f| dir.join(f).exists())
}

/// Append a timestamped diagnostic line to `<context>/logs/<hook>.log`.
/// Best-effort: failures never affect the hook.
pub fn log_line(cfg: &Config, hook: &str, session: &str, msg: &str) {
    let logs_dir = cfg.context_dir().join("logs");
    if std::fs::create_dir_all(&logs_dir).is_err() {
        return;
    }

    let short: String = session.chars().take(8).collect();
    let line = format!(
        "[{}] [session:{}] {}\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        short,
        msg
    );

    let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(logs_dir.join(format!("{hook}.log")))
    else {
        return;
    };
    let _ = file.write_all(line.as_bytes());
}

/// Hook response JSON that injects content into the agent's context
/// window via `additionalContext`.
pub fn hook_context_json(event: &str, content: &str) -> String {
    serde_json::json!({
        "hookSpecificOutput": {
            "hookEventName": event,
            "additionalContext": content,
        }
    })
    .to_string()
}

/// Shared fixtures for handler tests: a temp context directory (optionally
/// initialized) and a temp state store.
#[cfg(test)]
pub(crate) mod testutil {
    use crate::core::config::Config;
    use crate::core::inject::REQUIRED_FILES;
    use crate::core::state::SessionState;
    use tempfile::TempDir;

    pub(crate) fn test_config(dir: &std::path::Path) -> Config {
        let mut cfg = Config::default();
        cfg.context_dir = dir.to_string_lossy().into_owned();
        cfg
    }

    pub(crate) fn initialize(dir: &std::path::Path) {
        std::fs::create_dir_all(dir).unwrap();
        for f in REQUIRED_FILES {
            std::fs::write(dir.join(f), format!("# {f}\n")).unwrap();
        }
    }

    /// An initialized context dir, its config, and an empty state store.
    pub(crate) fn harness() -> (TempDir, TempDir, Config, SessionState) {
        let ctx = TempDir::new().unwrap();
        let state_dir = TempDir::new().unwrap();
        initialize(ctx.path());
        let cfg = test_config(ctx.path());
        let state = SessionState::at(state_dir.path());
        (ctx, state_dir, cfg, state)
    }
}
