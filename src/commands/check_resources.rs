//! `mnemo hook check-resources` — resource pressure warning.
//!
//! Emits a VERBATIM relay only when some resource is at DANGER severity;
//! WARNING and below stay silent. Readings come from the resource
//! sampling boundary ([`crate::core::resources`]).

use crate::commands::{box_lines, context_dir_line, BOX_BOTTOM};
use crate::core::config::{self, Config};
use crate::core::input::{self, HookInput};
use crate::core::message::{self, vars};
use crate::core::notify::TemplateRef;
use crate::core::resources::{Alert, Severity};
use crate::core::state::SessionState;
use crate::core::{events, notify, resources, throttle};
use serde_json::json;

const HOOK: &str = "check-resources";

pub fn run() {
    let cfg = config::load();
    let input = input::read_stdin();
    let state = SessionState::open();
    let alerts = resources::collect();
    if let Some(out) = execute(&cfg, &state, &input, &alerts) {
        println!("{out}");
    }
}

fn execute(
    cfg: &Config,
    state: &SessionState,
    input: &HookInput,
    alerts: &[Alert],
) -> Option<String> {
    let session = input.session().to_string();
    if throttle::paused_turns(state, &session) > 0 {
        return None;
    }

    if resources::max_severity(alerts) < Severity::Danger {
        return None;
    }

    let mut alert_messages = String::new();
    for alert in alerts {
        if alert.severity == Severity::Danger {
            alert_messages.push_str("✖ ");
            alert_messages.push_str(&alert.message);
            alert_messages.push('\n');
        }
    }

    let fallback = format!(
        "{alert_messages}\nSystem resources are critically low.\n\
         Persist unsaved context NOW with /mnemo-wrap-up\n\
         and consider ending this session."
    );
    let template_vars = vars(&[("AlertMessages", json!(alert_messages))]);
    let content = message::resolve(&cfg.context_dir(), HOOK, "alert", &template_vars, &fallback);
    let content = content.text()?;

    let mut msg = "IMPORTANT: Relay this resource warning to the user VERBATIM.\n\n\
                   ┌─ Resource Alert ──────────────────────────────────\n"
        .to_string();
    msg.push_str(&box_lines(&content));
    let dir_line = context_dir_line(cfg);
    if !dir_line.is_empty() {
        msg.push_str("│ ");
        msg.push_str(&dir_line);
        msg.push('\n');
    }
    msg.push_str(BOX_BOTTOM);

    let ref_ = TemplateRef::with_vars(HOOK, "alert", template_vars);
    let summary = format!("{HOOK}: System resources critically low");
    notify::send(cfg, "nudge", &summary, &input.session_id, Some(ref_.clone()));
    notify::send(cfg, "relay", &summary, &input.session_id, Some(ref_.clone()));
    events::append(cfg, "relay", &summary, &input.session_id, Some(ref_));

    Some(msg)
}
