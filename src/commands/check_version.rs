//! `mnemo hook check-version` — binary/plugin version drift detection.
//!
//! Compares the binary version against the embedded plugin manifest.
//! Warns when major.minor differ, which happens when the marketplace
//! plugin updates but the binary hasn't been reinstalled. Throttled to
//! once per day; dev builds are skipped.

use crate::commands::{self, box_lines, context_dir_line, BOX_BOTTOM};
use crate::core::config::{self, Config};
use crate::core::input::{self, HookInput};
use crate::core::message::{self, vars};
use crate::core::notify::TemplateRef;
use crate::core::state::SessionState;
use crate::core::{assets, events, notify, throttle};
use serde_json::json;

const HOOK: &str = "check-version";
const MARKER: &str = "version-checked";

pub fn run() {
    let cfg = config::load();
    let input = input::read_stdin();
    let state = SessionState::open();
    if let Some(out) = execute(&cfg, &state, &input, env!("CARGO_PKG_VERSION")) {
        println!("{out}");
    }
}

fn execute(
    cfg: &Config,
    state: &SessionState,
    input: &HookInput,
    binary_version: &str,
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

    // Dev builds have nothing meaningful to compare
    if binary_version == "dev" {
        throttle::mark_fired_today(state, MARKER);
        return None;
    }

    let plugin_version = assets::plugin_version()?;

    let (Some(binary), Some(plugin)) = (
        parse_major_minor(binary_version),
        parse_major_minor(&plugin_version),
    ) else {
        throttle::mark_fired_today(state, MARKER);
        return None;
    };

    if binary == plugin {
        throttle::mark_fired_today(state, MARKER);
        return None;
    }

    let fallback = format!(
        "Your mnemo binary is v{binary_version} but the plugin expects v{plugin_version}.\n\
         \nReinstall the binary to get the best out of mnemo:\n  cargo install mnemo"
    );
    let template_vars = vars(&[
        ("BinaryVersion", json!(binary_version)),
        ("PluginVersion", json!(plugin_version)),
    ]);
    let content = message::resolve(&cfg.context_dir(), HOOK, "mismatch", &template_vars, &fallback);
    let Some(content) = content.text() else {
        throttle::mark_fired_today(state, MARKER);
        return None;
    };

    let mut msg =
        "IMPORTANT: Relay this version warning to the user VERBATIM before answering their question.\n\n\
         ┌─ Version Mismatch ─────────────────────────────\n"
            .to_string();
    msg.push_str(&box_lines(&content));
    let dir_line = context_dir_line(cfg);
    if !dir_line.is_empty() {
        msg.push_str("│ ");
        msg.push_str(&dir_line);
        msg.push('\n');
    }
    msg.push_str(BOX_BOTTOM);

    let ref_ = TemplateRef::with_vars(HOOK, "mismatch", template_vars);
    let summary = format!("{HOOK}: Binary v{binary_version} vs plugin v{plugin_version}");
    notify::send(cfg, "nudge", &summary, &input.session_id, Some(ref_.clone()));
    notify::send(cfg, "relay", &summary, &input.session_id, Some(ref_.clone()));
    events::append(cfg, "relay", &summary, &input.session_id, Some(ref_));

    throttle::mark_fired_today(state, MARKER);

    Some(msg)
}

/// Major and minor from a semver string like "1.2.3". None for
/// unparseable versions.
fn parse_major_minor(version: &str) -> Option<(u32, u32)> {
    let mut parts = version.splitn(3, '.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}
