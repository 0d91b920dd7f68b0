//! `mnemo hook check-context-size` — context size checkpoint.
//!
//! Counts prompts per session and emits VERBATIM relay reminders at
//! adaptive intervals:
//!
//!   Prompts  1-15: silent
//!   Prompts 16-30: every 5th prompt
//!   Prompts   30+: every 3rd prompt
//!
//! Also monitors actual context window usage from the session transcript
//! and fires an independent warning when usage reaches 80%, regardless of
//! the prompt counter. This hook is the designated emitter for the
//! paused-session status line, and the consumer of the injection-oversize
//! mailbox.

use crate::commands::{self, box_lines, context_dir_line, BOX_BOTTOM};
use crate::core::config::{self, Config};
use crate::core::input::{self, HookInput};
use crate::core::message::{self, vars};
use crate::core::notify::TemplateRef;
use crate::core::state::SessionState;
use crate::core::throttle::AdaptiveBands;
use crate::core::{events, inject, notify, throttle, tokens, transcript};
use serde_json::json;
use std::time::Duration;

const HOOK: &str = "check-context-size";

/// Context window usage percentage that triggers the independent warning.
const WINDOW_THRESHOLD_PCT: usize = 80;

/// Marker written by `mark-wrapped-up`; suppresses checkpoints while fresh.
const WRAPPED_UP_MARKER: &str = "wrapped-up";

/// How long the wrap-up marker suppresses checkpoint nudges.
const WRAPPED_UP_EXPIRY: Duration = Duration::from_secs(2 * 3600);

pub fn run() {
    let cfg = config::load();
    let input = input::read_stdin();
    let state = SessionState::open();
    if let Some(out) = execute(&cfg, &state, &input) {
        println!("{out}");
        println!();
    }
}

fn execute(cfg: &Config, state: &SessionState, input: &HookInput) -> Option<String> {
    if !commands::is_initialized(cfg) {
        return None;
    }
    let session = input.session().to_string();

    // Pause check — this hook is the designated single emitter
    let turns = throttle::paused_turns(state, &session);
    if turns > 0 {
        return Some(throttle::paused_message(turns));
    }

    let count = state.increment(&format!("context-check-{session}"));

    // Wrap-up suppression: a recent /mnemo-wrap-up should not be followed
    // by more checkpoint noise. The marker expires after 2 hours.
    if wrapped_up_recently(state) {
        commands::log_line(cfg, HOOK, &session, &format!("prompt#{count} suppressed (wrapped up)"));
        return None;
    }

    let counter_triggered = AdaptiveBands::default().fires_at(count);

    // Actual context window usage from the session transcript
    let usage = transcript::read_session_usage(state, &session);
    let window = transcript::effective_window(&usage.model, cfg.context_window);
    let pct = if window > 0 && usage.tokens > 0 {
        usage.tokens * 100 / window
    } else {
        0
    };
    let window_triggered = pct >= WINDOW_THRESHOLD_PCT;

    if counter_triggered {
        emit_checkpoint(cfg, &session, count, usage.tokens, pct, window)
    } else if window_triggered {
        emit_window_warning(cfg, &session, count, usage.tokens, pct)
    } else {
        commands::log_line(cfg, HOOK, &session, &format!("prompt#{count} silent"));
        None
    }
}

fn emit_checkpoint(
    cfg: &Config,
    session: &str,
    count: u64,
    tokens_used: usize,
    pct: usize,
    window: usize,
) -> Option<String> {
    let fallback = "This session is getting deep. Consider wrapping up\n\
                    soon. If there are unsaved learnings, decisions, or\n\
                    conventions, now is a good time to persist them.";
    let content = message::resolve(
        &cfg.context_dir(),
        HOOK,
        "checkpoint",
        &message::Vars::new(),
        fallback,
    );
    let Some(content) = content.text() else {
        commands::log_line(cfg, HOOK, session, &format!("prompt#{count} silenced-by-template"));
        return None;
    };

    let mut msg = format!(
        "IMPORTANT: Relay this context checkpoint to the user VERBATIM before answering their question.\n\n\
         ┌─ Context Checkpoint (prompt #{count}) ────────────────\n"
    );
    msg.push_str(&box_lines(&content));
    if tokens_used > 0 {
        msg.push_str("│ ");
        msg.push_str(&token_usage_line(tokens_used, pct, window));
        msg.push('\n');
    }
    let dir_line = context_dir_line(cfg);
    if !dir_line.is_empty() {
        msg.push_str("│ ");
        msg.push_str(&dir_line);
        msg.push('\n');
    }
    msg.push_str(&oversize_nudge(cfg));
    msg.push_str(BOX_BOTTOM);

    commands::log_line(
        cfg,
        HOOK,
        session,
        &format!("prompt#{count} CHECKPOINT tokens={tokens_used} pct={pct}%"),
    );
    let ref_ = TemplateRef::new(HOOK, "checkpoint");
    let summary = format!("{HOOK}: Context Checkpoint at prompt #{count}");
    notify::send(cfg, "nudge", &summary, session, Some(ref_.clone()));
    notify::send(cfg, "relay", &summary, session, Some(ref_.clone()));
    events::append(cfg, "relay", &summary, session, Some(ref_));

    Some(msg)
}

fn emit_window_warning(
    cfg: &Config,
    session: &str,
    count: u64,
    tokens_used: usize,
    pct: usize,
) -> Option<String> {
    let fallback = format!(
        "⚠ Context window is {pct}% full (~{} tokens).\n\
         The session will lose older context soon. Consider wrapping up\n\
         or starting a fresh session with /mnemo-wrap-up.",
        tokens::format_count(tokens_used)
    );
    let template_vars = vars(&[
        ("Percentage", json!(pct)),
        ("TokenCount", json!(tokens::format_count(tokens_used))),
    ]);
    let content = message::resolve(&cfg.context_dir(), HOOK, "window", &template_vars, &fallback);
    let Some(content) = content.text() else {
        commands::log_line(cfg, HOOK, session, &format!("prompt#{count} window-silenced pct={pct}%"));
        return None;
    };

    let mut msg =
        "IMPORTANT: Relay this context window warning to the user VERBATIM before answering their question.\n\n\
         ┌─ Context Window Warning ─────────────────────────\n"
            .to_string();
    msg.push_str(&box_lines(&content));
    let dir_line = context_dir_line(cfg);
    if !dir_line.is_empty() {
        msg.push_str("│ ");
        msg.push_str(&dir_line);
        msg.push('\n');
    }
    msg.push_str(BOX_BOTTOM);

    commands::log_line(
        cfg,
        HOOK,
        session,
        &format!("prompt#{count} WINDOW-WARNING tokens={tokens_used} pct={pct}%"),
    );
    let ref_ = TemplateRef::with_vars(HOOK, "window", template_vars);
    let summary = format!("{HOOK}: Context window at {pct}%");
    notify::send(cfg, "nudge", &summary, session, Some(ref_.clone()));
    notify::send(cfg, "relay", &summary, session, Some(ref_.clone()));
    events::append(cfg, "relay", &summary, session, Some(ref_));

    Some(msg)
}

/// Context window usage line for checkpoint boxes.
///
/// Under 80%:   ⏱ Context window: ~52k tokens (~26% of 200k)
/// At/over 80%: ⚠ Context window: ~164k tokens (~82% of 200k) — running low
fn token_usage_line(tokens_used: usize, pct: usize, window: usize) -> String {
    let (icon, suffix) = if pct >= WINDOW_THRESHOLD_PCT {
        ("⚠", " — running low")
    } else {
        ("⏱", "")
    };
    format!(
        "{icon} Context window: ~{} tokens (~{pct}% of {}){suffix}",
        tokens::format_count(tokens_used),
        tokens::format_window(window)
    )
}

/// Box-formatted oversize nudge lines when the injection-oversize mailbox
/// exists. The mailbox is deleted after reading, silenced or not, so the
/// nudge appears exactly once.
fn oversize_nudge(cfg: &Config) -> String {
    let context_dir = cfg.context_dir();
    let Some(token_count) = inject::take_oversize_flag(&context_dir) else {
        return String::new();
    };

    let fallback = format!(
        "⚠ Context injection is large (~{token_count} tokens).\n\
         Run /mnemo-consolidate to distill your context files."
    );
    let template_vars = vars(&[("TokenCount", json!(token_count))]);
    let content = message::resolve(&context_dir, HOOK, "oversize", &template_vars, &fallback);
    match content.text() {
        Some(text) => box_lines(&text),
        None => String::new(),
    }
}

fn wrapped_up_recently(state: &SessionState) -> bool {
    state
        .age(WRAPPED_UP_MARKER)
        .map(|age| age < WRAPPED_UP_EXPIRY)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testutil::harness;
    use crate::core::inject::{write_oversize_flag, FileTokens, InjectionPlan};
    use crate::core::throttle::pause_marker;

    fn session_input(id: &str) -> HookInput {
        HookInput {
            session_id: id.to_string(),
            ..HookInput::default()
        }
    }

    fn run_n(cfg: &Config, state: &SessionState, input: &HookInput, n: u64) -> Vec<Option<String>> {
        (0..n).map(|_| execute(cfg, state, input)).collect()
    }

    #[test]
    fn test_silent_through_prompt_fifteen() {
        let (_ctx, _st, cfg, state) = harness();
        let outputs = run_n(&cfg, &state, &session_input("S1"), 15);
        assert!(outputs.iter().all(|o| o.is_none()));
    }

    #[test]
    fn test_checkpoint_fires_at_band_boundaries() {
        let (_ctx, _st, cfg, state) = harness();
        let input = session_input("S1");

        let mut fired = Vec::new();
        for count in 1..=40u64 {
            if execute(&cfg, &state, &input).is_some() {
                fired.push(count);
            }
        }
        assert_eq!(fired, vec![20, 25, 30, 33, 36, 39]);
    }

    #[test]
    fn test_checkpoint_message_carries_prompt_number() {
        let (_ctx, _st, cfg, state) = harness();
        let input = session_input("S1");
        state.write_counter("context-check-S1", 19);

        let out = execute(&cfg, &state, &input).expect("prompt 20 fires");
        assert!(out.contains("Context Checkpoint (prompt #20)"));
        assert!(out.starts_with("IMPORTANT: Relay"));
    }

    #[test]
    fn test_paused_session_prints_status_and_counts_turns() {
        let (_ctx, _st, cfg, state) = harness();
        state.write_counter(&pause_marker("S1"), 0);
        let input = session_input("S1");

        for _ in 0..5 {
            let out = execute(&cfg, &state, &input).expect("paused status");
            assert!(out.contains("paused"));
            assert!(!out.contains("resume"));
        }
        let out = execute(&cfg, &state, &input).unwrap();
        assert!(out.contains("6 turns"));
        assert!(out.contains("resume"));

        // The prompt counter must not advance while paused.
        assert_eq!(state.read_counter("context-check-S1"), 0);
    }

    #[test]
    fn test_wrap_up_marker_suppresses_checkpoint() {
        let (_ctx, _st, cfg, state) = harness();
        state.write_counter("context-check-S1", 19);
        state.touch(WRAPPED_UP_MARKER);

        assert!(execute(&cfg, &state, &session_input("S1")).is_none());
    }

    #[test]
    fn test_empty_override_silences_checkpoint() {
        let (ctx, _st, cfg, state) = harness();
        let msg_dir = ctx.path().join("hooks").join("messages").join(HOOK);
        std::fs::create_dir_all(&msg_dir).unwrap();
        std::fs::write(msg_dir.join("checkpoint.txt"), "\n").unwrap();

        state.write_counter("context-check-S1", 19);
        assert!(execute(&cfg, &state, &session_input("S1")).is_none());
        // The counter still advanced — silence is not a skipped turn.
        assert_eq!(state.read_counter("context-check-S1"), 20);
    }

    #[test]
    fn test_oversize_mailbox_folded_in_once() {
        let (ctx, _st, cfg, state) = harness();
        let plan = InjectionPlan {
            content: String::new(),
            files_loaded: 1,
            total_tokens: 18_000,
            per_file: vec![FileTokens {
                name: "CONSTITUTION.md".to_string(),
                tokens: 18_000,
            }],
        };
        write_oversize_flag(ctx.path(), 15_000, &plan);

        state.write_counter("context-check-S1", 19);
        let out = execute(&cfg, &state, &session_input("S1")).unwrap();
        assert!(out.contains("18000 tokens"));

        // Next checkpoint: mailbox gone, nudge absent.
        state.write_counter("context-check-S1", 24);
        let out = execute(&cfg, &state, &session_input("S1")).unwrap();
        assert!(!out.contains("18000 tokens"));
    }

    #[test]
    fn test_token_usage_line_icons() {
        let calm = token_usage_line(52_000, 26, 200_000);
        assert!(calm.starts_with('⏱'));
        assert!(calm.contains("52k"));
        assert!(!calm.contains("running low"));

        let hot = token_usage_line(164_000, 82, 200_000);
        assert!(hot.starts_with('⚠'));
        assert!(hot.contains("running low"));
    }
}
