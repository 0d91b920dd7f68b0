//! `mnemo hook block-dangerous-commands` — regex safety net.
//!
//! The bulk of command blocking belongs to the host's deny-list; this hook
//! catches only patterns that need regex matching: mid-command sudo and
//! git push (after `&&`, `||`, `;`) and binary installs into bin
//! directories. Emits `{"decision":"block","reason":...}` or stays silent.

use crate::core::config::{self, Config};
use crate::core::input::{self, HookInput};
use crate::core::message::{self, Vars};
use crate::core::notify::TemplateRef;
use crate::core::{events, notify};
use regex::Regex;
use serde::Serialize;

const HOOK: &str = "block-dangerous-commands";

#[derive(Serialize)]
struct BlockResponse {
    decision: &'static str,
    reason: String,
}

pub fn run() {
    let cfg = config::load();
    let input = input::read_stdin();
    if let Some(out) = execute(&cfg, &input) {
        println!("{out}");
    }
}

fn execute(cfg: &Config, input: &HookInput) -> Option<String> {
    let command = &input.tool_input.command;
    if command.is_empty() {
        return None;
    }

    let (variant, fallback) = classify(command)?;

    let reason = message::resolve(&cfg.context_dir(), HOOK, variant, &Vars::new(), fallback)
        .text()?;

    let response = BlockResponse {
        decision: "block",
        reason: reason.clone(),
    };
    let out = serde_json::to_string(&response).ok()?;

    let ref_ = TemplateRef::new(HOOK, variant);
    let summary = format!("{HOOK}: {reason}");
    notify::send(cfg, "relay", &summary, &input.session_id, Some(ref_.clone()));
    events::append(cfg, "relay", &summary, &input.session_id, Some(ref_));

    Some(out)
}

/// Match a command against the dangerous patterns, most specific first.
/// Returns the template variant and its hardcoded fallback reason.
fn classify(command: &str) -> Option<(&'static str, &'static str)> {
    // Mid-command sudo — after && || ; (prefix sudo caught by deny rule)
    let mid_sudo = Regex::new(r"(;|&&|\|\|)\s*sudo\s").expect("static regex");
    if mid_sudo.is_match(command) {
        return Some((
            "mid-sudo",
            "Cannot use sudo (no password access). Use 'make build && sudo make install' manually if needed.",
        ));
    }

    // Mid-command git push — after && || ;
    let mid_git_push = Regex::new(r"(;|&&|\|\|)\s*git\s+push").expect("static regex");
    if mid_git_push.is_match(command) {
        return Some(("mid-git-push", "git push requires explicit user approval."));
    }

    // cp/mv to bin directories — agent must never install binaries
    let cp_mv_to_bin = Regex::new(
        r"(cp|mv)\s+\S+\s+(/usr/local/bin|/usr/bin|~/go/bin|~/\.local/bin|/home/\S+/go/bin|/home/\S+/\.local/bin)",
    )
    .expect("static regex");
    if cp_mv_to_bin.is_match(command) {
        return Some((
            "cp-to-bin",
            "Agent must not copy binaries to bin directories. Ask the user to run 'sudo make install' instead.",
        ));
    }

    // cp/install to ~/.local/bin — overrides the PATH-installed binary
    let install_to_local_bin = Regex::new(r"(cp|install)\s.*~/\.local/bin").expect("static regex");
    if install_to_local_bin.is_match(command) {
        return Some((
            "install-to-local-bin",
            "Do not copy binaries to ~/.local/bin — this overrides the system mnemo in /usr/local/bin. Use 'mnemo' from PATH.",
        ));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testutil::test_config;
    use crate::core::input::ToolInput;
    use tempfile::TempDir;

    fn bash_input(command: &str) -> HookInput {
        HookInput {
            session_id: "S1".to_string(),
            tool_input: ToolInput {
                command: command.to_string(),
            },
        }
    }

    fn block_reason(cfg: &Config, command: &str) -> Option<String> {
        let out = execute(cfg, &bash_input(command))?;
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["decision"], "block");
        Some(value["reason"].as_str().unwrap().to_string())
    }

    #[test]
    fn test_mid_command_sudo_blocked() {
        let tmp = TempDir::new().unwrap();
        let cfg = test_config(tmp.path());

        let reason = block_reason(&cfg, "make build && sudo make install").unwrap();
        assert!(reason.contains("sudo"));
        assert!(block_reason(&cfg, "true; sudo rm -rf /tmp/x").is_some());
    }

    #[test]
    fn test_mid_command_git_push_blocked() {
        let tmp = TempDir::new().unwrap();
        let cfg = test_config(tmp.path());
        let reason = block_reason(&cfg, "git commit -m x && git push").unwrap();
        assert!(reason.contains("git push"));
    }

    #[test]
    fn test_copy_to_bin_blocked() {
        let tmp = TempDir::new().unwrap();
        let cfg = test_config(tmp.path());
        assert!(block_reason(&cfg, "cp target/release/tool /usr/local/bin").is_some());
        assert!(block_reason(&cfg, "install -m755 tool ~/.local/bin/tool").is_some());
    }

    #[test]
    fn test_safe_commands_pass() {
        let tmp = TempDir::new().unwrap();
        let cfg = test_config(tmp.path());
        assert!(execute(&cfg, &bash_input("cargo build --release")).is_none());
        // Prefix sudo/git push are the deny-list's job, not this hook's
        assert!(execute(&cfg, &bash_input("sudo make install")).is_none());
        assert!(execute(&cfg, &bash_input("git push origin main")).is_none());
        assert!(execute(&cfg, &bash_input("")).is_none());
    }
}
