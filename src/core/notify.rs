//! Fire-and-forget webhook notifications.
//!
//! The webhook URL lives in `<context>/.notify-url`, written with
//! owner-only permissions. When no URL is configured, every operation is a
//! silent noop. Delivery is best-effort: network errors and non-2xx
//! responses are discarded, never surfaced to the hook.

use crate::core::config::Config;
use crate::core::message::Vars;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Name of the webhook URL store inside the context directory.
const NOTIFY_URL_FILE: &str = ".notify-url";

/// Timeout for the webhook POST.
const SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Identifies the hook template and variables that produced a
/// notification, so receivers can filter, re-render, or aggregate without
/// parsing rendered text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplateRef {
    pub hook: String,
    pub variant: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variables: Option<Vars>,
}

impl TemplateRef {
    pub fn new(hook: &str, variant: &str) -> TemplateRef {
        TemplateRef {
            hook: hook.to_string(),
            variant: variant.to_string(),
            variables: None,
        }
    }

    pub fn with_vars(hook: &str, variant: &str, vars: Vars) -> TemplateRef {
        TemplateRef {
            hook: hook.to_string(),
            variant: variant.to_string(),
            variables: Some(vars),
        }
    }
}

/// JSON body shared by the webhook sink and the local event log — one
/// record shape, two independent sinks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payload {
    pub event: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<TemplateRef>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub session_id: String,
    pub timestamp: String,
    pub project: String,
}

impl Payload {
    /// Build a record stamped with the current UTC time and project name.
    pub fn record(
        event: &str,
        message: &str,
        session_id: &str,
        detail: Option<TemplateRef>,
    ) -> Payload {
        Payload {
            event: event.to_string(),
            message: message.to_string(),
            detail,
            session_id: session_id.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            project: project_name(),
        }
    }
}

/// Basename of the current working directory, or "unknown".
pub fn project_name() -> String {
    std::env::current_dir()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Whether an event passes the configured filter. An empty list means no
/// events pass — forwarding is opt-in only.
pub fn event_allowed(event: &str, allowed: &[String]) -> bool {
    allowed.iter().any(|e| e == event)
}

fn url_path(context_dir: &Path) -> PathBuf {
    context_dir.join(NOTIFY_URL_FILE)
}

/// Read the configured webhook URL. None when the store is absent or
/// empty — webhook not configured, silent noop.
pub fn load_url(context_dir: &Path) -> Option<String> {
    let url = std::fs::read_to_string(url_path(context_dir)).ok()?;
    let url = url.trim().to_string();
    if url.is_empty() {
        None
    } else {
        Some(url)
    }
}

/// Store the webhook URL with owner-only permissions.
pub fn save_url(context_dir: &Path, url: &str) -> Result<(), String> {
    let path = url_path(context_dir);
    std::fs::write(&path, url.trim())
        .map_err(|e| format!("cannot write {}: {}", path.display(), e))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o600));
    }
    Ok(())
}

/// Remove the stored webhook URL. Missing store is not an error.
pub fn clear_url(context_dir: &Path) {
    let _ = std::fs::remove_file(url_path(context_dir));
}

/// Fire a webhook notification. Silent noop when the event is not in the
/// allow-list, no URL is configured, or the request fails.
pub fn send(cfg: &Config, event: &str, message: &str, session_id: &str, detail: Option<TemplateRef>) {
    if !event_allowed(event, &cfg.notify.events) {
        return;
    }

    let Some(url) = load_url(&cfg.context_dir()) else {
        return;
    };

    let payload = Payload::record(event, message, session_id, detail);

    let Ok(client) = reqwest::blocking::Client::builder()
        .timeout(SEND_TIMEOUT)
        .build()
    else {
        return;
    };
    let _ = client.post(url).json(&payload).send();
}
