//! `mnemo hook context-load` — auto-inject project context on the first
//! tool use of a session.
//!
//! Fires via PreToolUse so the content arrives at the moment of action.
//! The hook reads the context files itself and injects them directly via
//! `additionalContext` — the agent never chooses whether to comply.
//! Subsequent tool calls in the same session are silent, tracked by a
//! session marker.
//!
//! Webhook payloads carry metadata only (file count, token estimate),
//! never file content.

use crate::commands::{self, hook_context_json};
use crate::core::config::{self, Config};
use crate::core::input::{self, HookInput};
use crate::core::state::SessionState;
use crate::core::{events, inject, notify, throttle};

/// Hook name used for the one-shot marker and fan-out records.
const HOOK: &str = "context";

pub fn run() {
    let cfg = config::load();
    let input = input::read_stdin();
    let state = SessionState::open();
    if let Some(out) = execute(&cfg, &state, &input) {
        println!("{out}");
    }
}

fn execute(cfg: &Config, state: &SessionState, input: &HookInput) -> Option<String> {
    if !commands::is_initialized(cfg) {
        return None;
    }
    if input.session_id.is_empty() {
        return None;
    }
    if throttle::paused_turns(state, &input.session_id) > 0 {
        return None;
    }
    if !throttle::once_per_session(state, HOOK, &input.session_id) {
        return None; // already fired this session
    }

    let context_dir = cfg.context_dir();
    let plan = inject::build_plan(&context_dir);

    // Oversize nudge: leave a flag for the checkpoint hook to pick up
    inject::write_oversize_flag(&context_dir, cfg.injection_token_warn, &plan);

    let summary = format!(
        "context-load: injected {} files (~{} tokens)",
        plan.files_loaded, plan.total_tokens
    );
    notify::send(cfg, "relay", &summary, &input.session_id, None);
    events::append(cfg, "relay", &summary, &input.session_id, None);

    Some(hook_context_json("PreToolUse", &plan.content))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testutil::harness;
    use crate::core::inject::{
        FILE_DECISIONS, FILE_GLOSSARY, FILE_TASKS, INDEX_END, INDEX_START,
    };
    use crate::core::throttle::pause_marker;

    fn session_input(id: &str) -> HookInput {
        HookInput {
            session_id: id.to_string(),
            ..HookInput::default()
        }
    }

    #[test]
    fn test_first_tool_use_injects_then_goes_silent() {
        let (_ctx, _st, cfg, state) = harness();
        let input = session_input("S1");

        let out = execute(&cfg, &state, &input).expect("first call fires");
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let injected = value["hookSpecificOutput"]["additionalContext"]
            .as_str()
            .unwrap();
        assert!(injected.contains("PROJECT CONTEXT"));

        // Second call in the same session is silent.
        assert!(execute(&cfg, &state, &input).is_none());
        // A different session fires again.
        assert!(execute(&cfg, &state, &session_input("S2")).is_some());
    }

    #[test]
    fn test_injection_honors_file_modes() {
        let (ctx, _st, cfg, state) = harness();
        std::fs::write(
            ctx.path().join(FILE_DECISIONS),
            format!("{INDEX_START}\n| 2026-05-01 | Ship it |\n{INDEX_END}\nhidden rationale"),
        )
        .unwrap();
        std::fs::write(ctx.path().join(FILE_TASKS), "- [ ] hidden task body").unwrap();
        std::fs::write(ctx.path().join(FILE_GLOSSARY), "TERM: meaning").unwrap();

        let out = execute(&cfg, &state, &session_input("S1")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let injected = value["hookSpecificOutput"]["additionalContext"]
            .as_str()
            .unwrap();

        // Index row present, body outside the markers absent
        assert!(injected.contains("Ship it"));
        assert!(!injected.contains("hidden rationale"));
        // Mention-only: name in the footer, body excluded
        assert!(injected.contains(FILE_TASKS));
        assert!(!injected.contains("hidden task body"));
        // Skip: the glossary never appears
        assert!(!injected.contains(FILE_GLOSSARY));
    }

    #[test]
    fn test_uninitialized_and_missing_session_are_silent() {
        let (_ctx, _st, cfg, state) = harness();
        // Missing session ID
        assert!(execute(&cfg, &state, &HookInput::default()).is_none());

        // Uninitialized context dir
        let empty = tempfile::TempDir::new().unwrap();
        let cfg2 = crate::commands::testutil::test_config(empty.path());
        assert!(execute(&cfg2, &state, &session_input("S1")).is_none());
    }

    #[test]
    fn test_paused_session_is_silent_and_leaves_no_marker() {
        let (_ctx, _st, cfg, state) = harness();
        state.write_counter(&pause_marker("S1"), 0);

        assert!(execute(&cfg, &state, &session_input("S1")).is_none());
        assert!(!state.exists("context-loaded-S1"));
    }

    #[test]
    fn test_oversize_flag_written_when_over_threshold() {
        let (ctx, _st, mut cfg, state) = harness();
        cfg.injection_token_warn = 1;

        execute(&cfg, &state, &session_input("S1")).unwrap();
        assert!(inject::oversize_flag_path(ctx.path()).exists());
    }
}
