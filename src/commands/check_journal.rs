//! `mnemo hook check-journal` — journal export/enrich reminder.
//!
//! Detects host sessions newer than the latest journal export and journal
//! entries that were exported but never enriched, then prints actionable
//! commands. Throttled to once per day.

use crate::commands::{self, box_lines, context_dir_line, BOX_BOTTOM};
use crate::core::config::{self, Config};
use crate::core::input::{self, HookInput};
use crate::core::message::{self, vars};
use crate::core::notify::TemplateRef;
use crate::core::state::SessionState;
use crate::core::{events, notify, throttle};
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::path::Path;

const HOOK: &str = "check-journal";
const MARKER: &str = "journal-reminded";

/// Subdirectory of the context directory holding journal exports.
const JOURNAL_DIR: &str = "journal";

/// Journal processing state, maintained by the enrichment flow.
const JOURNAL_STATE_FILE: &str = ".state.json";

pub fn run() {
    let cfg = config::load();
    let input = input::read_stdin();
    let state = SessionState::open();
    let projects = dirs::home_dir()
        .unwrap_or_default()
        .join(".claude")
        .join("projects");
    if let Some(out) = execute(&cfg, &state, &input, &projects) {
        println!("{out}");
    }
}

fn execute(
    cfg: &Config,
    state: &SessionState,
    input: &HookInput,
    claude_projects: &Path,
) -> Option<String> {
    if !commands::is_initialized(cfg) {
        return None;
    }
    let session = input.session().to_string();
    if throttle::paused_turns(state, &session) > 0 {
        return None;
    }
    if throttle::daily_throttled(state, MARKER) {
        return None;
    }

    // Bail out if either side of the comparison doesn't exist yet
    let journal_dir = cfg.context_dir().join(JOURNAL_DIR);
    if !journal_dir.is_dir() || !claude_projects.is_dir() {
        return None;
    }

    // Stage 1: sessions newer than the newest export
    let newest_export = newest_mtime(&journal_dir, ".md");
    let unexported = count_newer_files(claude_projects, ".jsonl", newest_export);

    // Stage 2: exported entries never enriched
    let unenriched = count_unenriched(&journal_dir);

    if unexported == 0 && unenriched == 0 {
        return None;
    }

    let template_vars = vars(&[
        ("UnexportedCount", json!(unexported)),
        ("UnenrichedCount", json!(unenriched)),
    ]);

    let (variant, fallback) = if unexported > 0 && unenriched > 0 {
        (
            "both",
            format!(
                "You have {unexported} new session(s) not yet exported.\n\
                 {unenriched} existing entries need enrichment.\n\
                 \nExport and enrich:\n  mnemo recall export --all\n  /mnemo-journal-enrich-all"
            ),
        )
    } else if unexported > 0 {
        (
            "unexported",
            format!(
                "You have {unexported} new session(s) not yet exported.\n\
                 \nExport:\n  mnemo recall export --all"
            ),
        )
    } else {
        (
            "unenriched",
            format!(
                "{unenriched} journal entries need enrichment.\n\
                 \nEnrich:\n  /mnemo-journal-enrich-all"
            ),
        )
    };

    let content = message::resolve(&cfg.context_dir(), HOOK, variant, &template_vars, &fallback);
    let content = content.text()?;

    let mut msg =
        "IMPORTANT: Relay this journal reminder to the user VERBATIM before answering their question.\n\n\
         ┌─ Journal Reminder ─────────────────────────────\n"
            .to_string();
    msg.push_str(&box_lines(&content));
    let dir_line = context_dir_line(cfg);
    if !dir_line.is_empty() {
        msg.push_str("│ ");
        msg.push_str(&dir_line);
        msg.push('\n');
    }
    msg.push_str(BOX_BOTTOM);

    let ref_ = TemplateRef::with_vars(HOOK, variant, template_vars);
    let summary = format!("{HOOK}: {unexported} unexported, {unenriched} unenriched");
    notify::send(cfg, "nudge", &summary, &input.session_id, Some(ref_.clone()));
    notify::send(cfg, "relay", &summary, &input.session_id, Some(ref_.clone()));
    events::append(cfg, "relay", &summary, &input.session_id, Some(ref_));

    throttle::mark_fired_today(state, MARKER);
    Some(msg)
}

/// Most recent mtime (Unix seconds) of files with the extension in a
/// directory. 0 when none exist.
fn newest_mtime(dir: &Path, ext: &str) -> i64 {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .filter(|e| e.file_name().to_string_lossy().ends_with(ext))
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

/// Recursively count files with the extension newer than the reference
/// timestamp.
fn count_newer_files(dir: &Path, ext: &str, reference: i64) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    let mut count = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            count += count_newer_files(&path, ext, reference);
            continue;
        }
        if !entry.file_name().to_string_lossy().ends_with(ext) {
            continue;
        }
        let mtime = entry
            .metadata()
            .ok()
            .and_then(|m| m.modified().ok())
            .and_then(|m| m.duration_since(std::time::UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        if mtime > reference {
            count += 1;
        }
    }
    count
}

#[derive(Deserialize, Default)]
struct JournalState {
    #[serde(default)]
    enriched: BTreeMap<String, String>,
}

/// Count journal .md files without an enriched date in the state file.
fn count_unenriched(journal_dir: &Path) -> usize {
    let journal_state: JournalState = std::fs::read_to_string(journal_dir.join(JOURNAL_STATE_FILE))
        .ok()
        .and_then(|data| serde_json::from_str(&data).ok())
        .unwrap_or_default();

    let Ok(entries) = std::fs::read_dir(journal_dir) else {
        return 0;
    };
    entries
        .flatten()
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".md"))
        .filter(|name| !journal_state.enriched.contains_key(name))
        .count()
}
