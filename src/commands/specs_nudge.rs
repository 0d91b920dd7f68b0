//! `mnemo hook specs-nudge` — plan-to-specs directory nudge.
//!
//! Fires on PreToolUse(EnterPlanMode) and reminds the agent to save plans
//! to specs/ for release tracking.

use crate::commands::{self, context_dir_line, hook_context_json};
use crate::core::config::{self, Config};
use crate::core::input::{self, HookInput};
use crate::core::message::{self, Vars};
use crate::core::notify::TemplateRef;
use crate::core::state::SessionState;
use crate::core::{events, notify, throttle};

const HOOK: &str = "specs-nudge";

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
    let session = input.session().to_string();
    if throttle::paused_turns(state, &session) > 0 {
        return None;
    }

    let fallback = "Save your plan to specs/ — these documents track what was designed \
         for the current release. Use specs/feature-name.md naming. If this \
         is a quick fix that doesn't need a spec, proceed without one.";
    let mut msg = message::resolve(&cfg.context_dir(), HOOK, "nudge", &Vars::new(), fallback)
        .text()?;

    let dir_line = context_dir_line(cfg);
    if !dir_line.is_empty() {
        msg.push_str(" [");
        msg.push_str(&dir_line);
        msg.push(']');
    }

    let ref_ = TemplateRef::new(HOOK, "nudge");
    let summary = format!("{HOOK}: plan-to-specs nudge emitted");
    notify::send(cfg, "relay", &summary, &input.session_id, Some(ref_.clone()));
    events::append(cfg, "relay", &summary, &input.session_id, Some(ref_));

    Some(hook_context_json("PreToolUse", &msg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testutil::{harness, test_config};

    #[test]
    fn test_fires_when_initialized() {
        let (_ctx, _st, cfg, state) = harness();
        let input = HookInput {
            session_id: "S1".to_string(),
            ..HookInput::default()
        };
        let out = execute(&cfg, &state, &input).unwrap();
        assert!(out.contains("specs/"));
    }

    #[test]
    fn test_silent_when_uninitialized() {
        let (_ctx, _st, _cfg, state) = harness();
        let empty = tempfile::TempDir::new().unwrap();
        let cfg = test_config(empty.path());
        assert!(execute(&cfg, &state, &HookInput::default()).is_none());
    }
}
