//! `mnemo hook qa-reminder` — lint-and-test gate before commits.
//!
//! Fires on PreToolUse(Bash) when the command contains "git", placing the
//! reminder at the point of action — the commit sequence — rather than
//! during every edit.

use crate::commands::{self, context_dir_line, hook_context_json};
use crate::core::config::{self, Config};
use crate::core::input::{self, HookInput};
use crate::core::message::{self, Vars};
use crate::core::notify::TemplateRef;
use crate::core::state::SessionState;
use crate::core::{events, notify, throttle};

const HOOK: &str = "qa-reminder";

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
    if !input.tool_input.command.contains("git") {
        return None;
    }

    let fallback = "HARD GATE — DO NOT COMMIT without completing ALL of these steps first: \
         (1) lint the ENTIRE project, \
         (2) test the ENTIRE project, \
         (3) verify a clean working tree (no modified or untracked files left behind). \
         Not just the files you changed — the whole branch. \
         If unrelated modified files remain, \
         offer to commit them separately, stash them, \
         or get explicit confirmation to leave them. \
         Do NOT say 'I'll do that at the end' or 'I'll handle that after committing.' \
         Run lint and tests BEFORE every git commit, every time, no exceptions.";
    let mut msg = message::resolve(&cfg.context_dir(), HOOK, "gate", &Vars::new(), fallback)
        .text()?;

    let dir_line = context_dir_line(cfg);
    if !dir_line.is_empty() {
        msg.push_str(" [");
        msg.push_str(&dir_line);
        msg.push(']');
    }

    let ref_ = TemplateRef::new(HOOK, "gate");
    let summary = format!("{HOOK}: QA gate reminder emitted");
    notify::send(cfg, "relay", &summary, &input.session_id, Some(ref_.clone()));
    events::append(cfg, "relay", &summary, &input.session_id, Some(ref_));

    Some(hook_context_json("PreToolUse", &msg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testutil::harness;
    use crate::core::input::ToolInput;
    use crate::core::throttle::pause_marker;

    fn bash_input(session: &str, command: &str) -> HookInput {
        HookInput {
            session_id: session.to_string(),
            tool_input: ToolInput {
                command: command.to_string(),
            },
        }
    }

    #[test]
    fn test_fires_only_for_git_commands() {
        let (_ctx, _st, cfg, state) = harness();

        assert!(execute(&cfg, &state, &bash_input("S1", "ls -la")).is_none());
        assert!(execute(&cfg, &state, &bash_input("S1", "")).is_none());

        let out = execute(&cfg, &state, &bash_input("S1", "git commit -m x")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        let ctx_text = value["hookSpecificOutput"]["additionalContext"]
            .as_str()
            .unwrap();
        assert!(ctx_text.contains("HARD GATE"));
    }

    #[test]
    fn test_fires_every_time_not_throttled() {
        let (_ctx, _st, cfg, state) = harness();
        assert!(execute(&cfg, &state, &bash_input("S1", "git status")).is_some());
        assert!(execute(&cfg, &state, &bash_input("S1", "git status")).is_some());
    }

    #[test]
    fn test_paused_session_is_silent() {
        let (_ctx, _st, cfg, state) = harness();
        state.write_counter(&pause_marker("S1"), 0);
        assert!(execute(&cfg, &state, &bash_input("S1", "git push")).is_none());
    }
}
