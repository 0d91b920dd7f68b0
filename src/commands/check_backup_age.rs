//! `mnemo hook check-backup-age` — backup staleness check.
//!
//! Warns when the context backup is stale (>2 days) or the configured SMB
//! share is unmounted. Depends on the backup flow touching
//! `~/.local/state/mnemo-last-backup` on success. Throttled to once per
//! day.

use crate::commands::{box_lines, context_dir_line, BOX_BOTTOM};
use crate::core::config::{self, Config};
use crate::core::input::{self, HookInput};
use crate::core::message::{self, vars};
use crate::core::notify::TemplateRef;
use crate::core::state::SessionState;
use crate::core::{events, notify, throttle};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const HOOK: &str = "check-backup-age";
const MARKER: &str = "backup-reminded";

/// Backup age in days after which the warning fires.
const BACKUP_MAX_AGE_DAYS: u64 = 2;

/// Marker touched by the backup flow on success.
const BACKUP_MARKER_FILE: &str = "mnemo-last-backup";

/// SMB share URL for the mount check; unset skips it.
const ENV_SMB_URL: &str = "MNEMO_BACKUP_SMB_URL";

pub fn run() {
    let cfg = config::load();
    let input = input::read_stdin();
    let state = SessionState::open();
    let backup_marker = dirs::home_dir()
        .unwrap_or_default()
        .join(".local")
        .join("state")
        .join(BACKUP_MARKER_FILE);
    if let Some(out) = execute(&cfg, &state, &input, &backup_marker) {
        println!("{out}");
    }
}

fn execute(
    cfg: &Config,
    state: &SessionState,
    input: &HookInput,
    backup_marker: &Path,
) -> Option<String> {
    let session = input.session().to_string();
    if throttle::paused_turns(state, &session) > 0 {
        return None;
    }
    if throttle::daily_throttled(state, MARKER) {
        return None;
    }

    let mut warnings: Vec<String> = Vec::new();

    // Check 1: is the SMB share mounted?
    if let Ok(smb_url) = std::env::var(ENV_SMB_URL) {
        if !smb_url.is_empty() {
            smb_mount_warnings(&smb_url, &mut warnings);
        }
    }

    // Check 2: is the backup stale?
    backup_marker_warnings(backup_marker, &mut warnings);

    if warnings.is_empty() {
        return None;
    }

    let mut warning_text = String::new();
    for w in &warnings {
        warning_text.push_str(w);
        warning_text.push('\n');
    }

    let template_vars = vars(&[("Warnings", json!(warning_text))]);
    let content = message::resolve(
        &cfg.context_dir(),
        HOOK,
        "warning",
        &template_vars,
        &warning_text,
    );
    let content = content.text()?;

    let mut msg =
        "IMPORTANT: Relay this backup warning to the user VERBATIM before answering their question.\n\n\
         ┌─ Backup Warning ──────────────────────────────────\n"
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
    let summary = format!("{HOOK}: Backup warning");
    notify::send(cfg, "nudge", &summary, &input.session_id, Some(ref_.clone()));
    notify::send(cfg, "relay", &summary, &input.session_id, Some(ref_.clone()));
    events::append(cfg, "relay", &summary, &input.session_id, Some(ref_));

    throttle::mark_fired_today(state, MARKER);

    Some(msg)
}

/// Warn when the GVFS mount path derived from the SMB URL is absent.
fn smb_mount_warnings(smb_url: &str, warnings: &mut Vec<String>) {
    let Some((host, share)) = parse_smb_url(smb_url) else {
        return;
    };
    let gvfs_path = PathBuf::from(format!(
        "/run/user/{}/gvfs/smb-share:server={host},share={share}",
        smb_uid()
    ));
    if !gvfs_path.exists() {
        warnings.push(format!("SMB share ({host}) is not mounted."));
        warnings.push("Backups cannot run until it's available.".to_string());
    }
}

#[cfg(unix)]
fn smb_uid() -> u32 {
    // SAFETY: getuid has no failure modes and touches no memory.
    unsafe { libc::getuid() }
}

#[cfg(not(unix))]
fn smb_uid() -> u32 {
    0
}

/// Host and share name from an `smb://host/share[/...]` URL.
fn parse_smb_url(url: &str) -> Option<(String, String)> {
    let rest = url.strip_prefix("smb://")?;
    let mut parts = rest.splitn(2, '/');
    let host = parts.next()?.to_string();
    let share = parts.next()?.split('/').next()?.to_string();
    if host.is_empty() || share.is_empty() {
        return None;
    }
    Some((host, share))
}

fn backup_marker_warnings(marker: &Path, warnings: &mut Vec<String>) {
    let Ok(meta) = std::fs::metadata(marker) else {
        warnings.push("No backup marker found — backup may have never run.".to_string());
        warnings.push("Run: mnemo backup".to_string());
        return;
    };

    let age_days = meta
        .modified()
        .ok()
        .and_then(|m| SystemTime::now().duration_since(m).ok())
        .map(|d| d.as_secs() / (24 * 3600))
        .unwrap_or(0);
    if age_days >= BACKUP_MAX_AGE_DAYS {
        warnings.push(format!("Last context backup is {age_days} days old."));
        warnings.push("Run: mnemo backup".to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testutil::harness;
    use std::time::Duration;

    fn session_input(id: &str) -> HookInput {
        HookInput {
            session_id: id.to_string(),
            ..HookInput::default()
        }
    }

    #[test]
    fn test_missing_marker_warns_never_ran() {
        let (_ctx, _st, cfg, state) = harness();
        let missing = PathBuf::from("/nonexistent/mnemo-last-backup");

        let out = execute(&cfg, &state, &session_input("S1"), &missing).unwrap();
        assert!(out.contains("backup may have never run"));
        assert!(out.contains("Backup Warning"));
    }

    #[test]
    fn test_fresh_marker_is_silent() {
        let (_ctx, st_dir, cfg, state) = harness();
        let marker = st_dir.path().join(BACKUP_MARKER_FILE);
        std::fs::write(&marker, "").unwrap();

        assert!(execute(&cfg, &state, &session_input("S1"), &marker).is_none());
        // Silence did not burn the daily throttle.
        assert!(!state.exists(MARKER));
    }

    #[test]
    fn test_stale_marker_warns_with_age_and_throttles_daily() {
        let (_ctx, st_dir, cfg, state) = harness();
        let marker = st_dir.path().join(BACKUP_MARKER_FILE);
        std::fs::write(&marker, "").unwrap();
        let old = SystemTime::now() - Duration::from_secs(3 * 24 * 3600);
        let file = std::fs::File::options().write(true).open(&marker).unwrap();
        file.set_modified(old).unwrap();

        let out = execute(&cfg, &state, &session_input("S1"), &marker).unwrap();
        assert!(out.contains("3 days old"));

        // Second check the same day is throttled.
        assert!(execute(&cfg, &state, &session_input("S1"), &marker).is_none());
    }

    #[test]
    fn test_parse_smb_url() {
        assert_eq!(
            parse_smb_url("smb://nas.local/backups"),
            Some(("nas.local".to_string(), "backups".to_string()))
        );
        assert_eq!(
            parse_smb_url("smb://nas.local/backups/sub/dir"),
            Some(("nas.local".to_string(), "backups".to_string()))
        );
        assert!(parse_smb_url("smb://nas.local").is_none());
        assert!(parse_smb_url("https://nas.local/backups").is_none());
    }
}
