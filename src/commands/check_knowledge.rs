//! `mnemo hook check-knowledge` — knowledge file growth nudge.
//!
//! Counts entries in DECISIONS.md and LEARNINGS.md and lines in
//! CONVENTIONS.md, and emits a VERBATIM relay nudge when any file exceeds
//! its configured threshold. Throttled to once per day.

use crate::commands::{self, box_lines, context_dir_line, BOX_BOTTOM};
use crate::core::config::{self, Config};
use crate::core::inject::{FILE_CONVENTIONS, FILE_DECISIONS, FILE_LEARNINGS};
use crate::core::input::{self, HookInput};
use crate::core::message::{self, vars};
use crate::core::notify::TemplateRef;
use crate::core::state::SessionState;
use crate::core::{events, notify, throttle};
use regex::Regex;
use serde_json::json;

const HOOK: &str = "check-knowledge";
const MARKER: &str = "check-knowledge";

pub fn run() {
    let cfg = config::load();
    let input = input::read_stdin();
    let state = SessionState::open();
    if let Some(out) = execute(&cfg, &state, &input) {
        println!("{out}");
    }
}

struct Finding {
    file: &'static str,
    count: usize,
    threshold: usize,
    unit: &'static str,
}

fn execute(cfg: &Config, state: &SessionState, input: &HookInput) -> Option<String> {
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

    // All thresholds disabled — nothing to check
    if cfg.entry_count_decisions == 0
        && cfg.entry_count_learnings == 0
        && cfg.convention_line_count == 0
    {
        return None;
    }

    let context_dir = cfg.context_dir();
    let mut findings: Vec<Finding> = Vec::new();

    if cfg.entry_count_decisions > 0 {
        if let Ok(data) = std::fs::read_to_string(context_dir.join(FILE_DECISIONS)) {
            let count = count_entry_blocks(&data);
            if count > cfg.entry_count_decisions {
                findings.push(Finding {
                    file: FILE_DECISIONS,
                    count,
                    threshold: cfg.entry_count_decisions,
                    unit: "entries",
                });
            }
        }
    }

    if cfg.entry_count_learnings > 0 {
        if let Ok(data) = std::fs::read_to_string(context_dir.join(FILE_LEARNINGS)) {
            let count = count_entry_blocks(&data);
            if count > cfg.entry_count_learnings {
                findings.push(Finding {
                    file: FILE_LEARNINGS,
                    count,
                    threshold: cfg.entry_count_learnings,
                    unit: "entries",
                });
            }
        }
    }

    if cfg.convention_line_count > 0 {
        if let Ok(data) = std::fs::read_to_string(context_dir.join(FILE_CONVENTIONS)) {
            let count = data.matches('\n').count();
            if count > cfg.convention_line_count {
                findings.push(Finding {
                    file: FILE_CONVENTIONS,
                    count,
                    threshold: cfg.convention_line_count,
                    unit: "lines",
                });
            }
        }
    }

    if findings.is_empty() {
        return None;
    }

    // Pre-formatted findings list for the template variable
    let mut file_warnings = String::new();
    for f in &findings {
        file_warnings.push_str(&format!(
            "{} has {} {} (recommended: ≤{}).\n",
            f.file, f.count, f.unit, f.threshold
        ));
    }

    let fallback = format!(
        "{file_warnings}\nLarge knowledge files dilute agent context. Consider:\n\
         • Review and remove outdated entries\n\
         • Use /mnemo-consolidate to merge overlapping entries\n\
         • Move stale entries to the archive directory manually"
    );
    let template_vars = vars(&[("FileWarnings", json!(file_warnings))]);
    let content = message::resolve(&context_dir, HOOK, "warning", &template_vars, &fallback);
    let content = content.text()?;

    let mut msg =
        "IMPORTANT: Relay this knowledge health notice to the user VERBATIM before answering their question.\n\n\
         ┌─ Knowledge File Growth ──────────────────────────\n"
            .to_string();
    msg.push_str(&box_lines(&content));
    let dir_line = context_dir_line(cfg);
    if !dir_line.is_empty() {
        msg.push_str("│ ");
        msg.push_str(&dir_line);
        msg.push('\n');
    }
    msg.push_str(BOX_BOTTOM);

    let ref_ = TemplateRef::with_vars(HOOK, "warning", template_vars);
    let summary = format!("{HOOK}: Knowledge file growth detected");
    notify::send(cfg, "nudge", &summary, &input.session_id, Some(ref_.clone()));
    notify::send(cfg, "relay", &summary, &input.session_id, Some(ref_.clone()));
    events::append(cfg, "relay", &summary, &input.session_id, Some(ref_));

    throttle::mark_fired_today(state, MARKER);

    Some(msg)
}

/// Count `## [YYYY-MM-DD-HHMMSS] Title` entry headers.
fn count_entry_blocks(content: &str) -> usize {
    let re = Regex::new(r"^## \[\d{4}-\d{2}-\d{2}-\d{6}\] .+").expect("static regex");
    content.lines().filter(|line| re.is_match(line)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testutil::harness;

    fn session_input(id: &str) -> HookInput {
        HookInput {
            session_id: id.to_string(),
            ..HookInput::default()
        }
    }

    fn decisions_with_entries(n: usize) -> String {
        let mut out = String::from("# Decisions\n");
        for i in 0..n {
            out.push_str(&format!(
                "## [2026-01-{:02}-120000] Decision {i}\nbody\n",
                (i % 28) + 1
            ));
        }
        out
    }

    #[test]
    fn test_count_entry_blocks() {
        assert_eq!(count_entry_blocks(""), 0);
        assert_eq!(count_entry_blocks("## not an entry\ntext"), 0);
        assert_eq!(count_entry_blocks(&decisions_with_entries(4)), 4);
    }

    #[test]
    fn test_below_thresholds_is_silent() {
        let (ctx, _st, cfg, state) = harness();
        std::fs::write(ctx.path().join(FILE_DECISIONS), decisions_with_entries(3)).unwrap();

        assert!(execute(&cfg, &state, &session_input("S1")).is_none());
        // Silent runs do not burn the daily throttle.
        assert!(!state.exists(MARKER));
    }

    #[test]
    fn test_over_threshold_fires_once_per_day() {
        let (ctx, _st, mut cfg, state) = harness();
        cfg.entry_count_decisions = 2;
        std::fs::write(ctx.path().join(FILE_DECISIONS), decisions_with_entries(5)).unwrap();

        let out = execute(&cfg, &state, &session_input("S1")).expect("fires");
        assert!(out.contains("DECISIONS.md has 5 entries"));
        assert!(out.contains("≤2"));

        // Same calendar day: throttled.
        assert!(execute(&cfg, &state, &session_input("S1")).is_none());
    }

    #[test]
    fn test_convention_line_threshold() {
        let (ctx, _st, mut cfg, state) = harness();
        cfg.entry_count_decisions = 0;
        cfg.entry_count_learnings = 0;
        cfg.convention_line_count = 3;
        std::fs::write(ctx.path().join(FILE_CONVENTIONS), "a\nb\nc\nd\ne\n").unwrap();

        let out = execute(&cfg, &state, &session_input("S1")).expect("fires");
        assert!(out.contains("CONVENTIONS.md has 5 lines"));
    }

    #[test]
    fn test_all_thresholds_disabled_is_silent() {
        let (ctx, _st, mut cfg, state) = harness();
        cfg.entry_count_decisions = 0;
        cfg.entry_count_learnings = 0;
        cfg.convention_line_count = 0;
        std::fs::write(ctx.path().join(FILE_DECISIONS), decisions_with_entries(50)).unwrap();

        assert!(execute(&cfg, &state, &session_input("S1")).is_none());
    }
}
