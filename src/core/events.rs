//! Append-only JSONL event logging for hook diagnostics.
//!
//! Events land in `<context>/state/events.jsonl` when `event_log = true`
//! in `.mnemorc`. The record shape is identical to the webhook payload
//! ([`crate::core::notify::Payload`]) — one struct, two sinks. All errors
//! are silently ignored; event logging must never break hook execution.

use crate::core::config::Config;
use crate::core::notify::{Payload, TemplateRef};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Subdirectory of the context directory holding machine state.
pub const STATE_DIR: &str = "state";

/// Active log file name.
const EVENT_LOG_FILE: &str = "events.jsonl";

/// Rotated previous-generation file name. Generation depth is 1; rotating
/// overwrites any existing previous generation.
const EVENT_LOG_PREV_FILE: &str = "events.1.jsonl";

/// Size ceiling that triggers rotation on the next append.
pub const EVENT_LOG_MAX_BYTES: u64 = 512 * 1024;

/// Path of the active event log.
pub fn log_path(context_dir: &Path) -> PathBuf {
    context_dir.join(STATE_DIR).join(EVENT_LOG_FILE)
}

/// Path of the rotated event log.
pub fn prev_log_path(context_dir: &Path) -> PathBuf {
    context_dir.join(STATE_DIR).join(EVENT_LOG_PREV_FILE)
}

/// Append one event record to the log.
///
/// Noop when event logging is disabled. Creates the state directory,
/// rotates when the active file exceeds the ceiling, then appends one JSON
/// line. Best-effort throughout.
pub fn append(cfg: &Config, event: &str, message: &str, session_id: &str, detail: Option<TemplateRef>) {
    if !cfg.event_log {
        return;
    }

    let path = log_path(&cfg.context_dir());
    let Some(state_dir) = path.parent() else {
        return;
    };
    if fs::create_dir_all(state_dir).is_err() {
        return;
    }

    rotate(&path, &prev_log_path(&cfg.context_dir()));

    let payload = Payload::record(event, message, session_id, detail);
    let Ok(mut line) = serde_json::to_string(&payload) else {
        return;
    };
    line.push('\n');

    let Ok(mut file) = fs::OpenOptions::new().create(true).append(true).open(&path) else {
        return;
    };
    let _ = file.write_all(line.as_bytes());
}

/// Rotate the active log when it exceeds the ceiling: the previous
/// generation is removed, then the active file takes its place.
fn rotate(path: &Path, prev: &Path) {
    let Ok(meta) = fs::metadata(path) else {
        return; // nothing to rotate yet
    };
    if meta.len() < EVENT_LOG_MAX_BYTES {
        return;
    }
    let _ = fs::remove_file(prev);
    let _ = fs::rename(path, prev);
}

/// Event query filters. All filters intersect (AND).
#[derive(Debug, Default)]
pub struct QueryOpts {
    pub hook: Option<String>,
    pub session: Option<String>,
    pub event: Option<String>,
    /// Return only the last N events (0 = all).
    pub last: usize,
    /// Also read the rotated previous generation.
    pub include_rotated: bool,
}

/// Read events from the log, applying filters. Returns an empty vector
/// when nothing matches or no log exists; errors only when a log file
/// exists but cannot be opened. Malformed lines are skipped.
pub fn query(cfg: &Config, opts: &QueryOpts) -> Result<Vec<Payload>, String> {
    let context_dir = cfg.context_dir();
    let mut all = Vec::new();

    // Rotated file first: its events are older.
    if opts.include_rotated {
        all.extend(read_log_file(&prev_log_path(&context_dir))?);
    }
    all.extend(read_log_file(&log_path(&context_dir))?);

    let mut filtered: Vec<Payload> = all
        .into_iter()
        .filter(|e| matches_filter(e, opts))
        .collect();

    if opts.last > 0 && filtered.len() > opts.last {
        filtered.drain(..filtered.len() - opts.last);
    }

    Ok(filtered)
}

fn read_log_file(path: &Path) -> Result<Vec<Payload>, String> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(format!("cannot read {}: {}", path.display(), e)),
    };

    Ok(content
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect())
}

fn matches_filter(e: &Payload, opts: &QueryOpts) -> bool {
    if let Some(event) = &opts.event {
        if &e.event != event {
            return false;
        }
    }
    if let Some(session) = &opts.session {
        if &e.session_id != session {
            return false;
        }
    }
    if let Some(hook) = &opts.hook {
        match &e.detail {
            Some(detail) if &detail.hook == hook => {}
            _ => return false,
        }
    }
    true
}
