use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Runtime configuration from `.mnemorc` (TOML).
///
/// Search order: repo root first, then home directory. Every field has a
/// default, so a missing or partial file is never an error. The context
/// directory can additionally be overridden with the `MNEMO_DIR`
/// environment variable.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Name of the project context directory.
    #[serde(default = "default_context_dir")]
    pub context_dir: String,
    /// Whether hooks append to the local event log.
    #[serde(default)]
    pub event_log: bool,
    /// Token threshold for the injection oversize warning (0 disables).
    #[serde(default = "default_injection_token_warn")]
    pub injection_token_warn: usize,
    /// Context window size in tokens for usage reporting.
    #[serde(default = "default_context_window")]
    pub context_window: usize,
    /// Entry count in LEARNINGS.md that triggers the growth nudge (0 disables).
    #[serde(default = "default_entry_count_learnings")]
    pub entry_count_learnings: usize,
    /// Entry count in DECISIONS.md that triggers the growth nudge (0 disables).
    #[serde(default = "default_entry_count_decisions")]
    pub entry_count_decisions: usize,
    /// Line count in CONVENTIONS.md that triggers the growth nudge (0 disables).
    #[serde(default = "default_convention_line_count")]
    pub convention_line_count: usize,
    #[serde(default)]
    pub notify: NotifyConfig,
}

/// Webhook notification settings.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct NotifyConfig {
    /// Event names forwarded to the webhook. Empty list means nothing is
    /// sent — forwarding is opt-in only.
    #[serde(default)]
    pub events: Vec<String>,
}

fn default_context_dir() -> String {
    ".mnemo".to_string()
}

fn default_injection_token_warn() -> usize {
    15_000
}

fn default_context_window() -> usize {
    200_000
}

fn default_entry_count_learnings() -> usize {
    30
}

fn default_entry_count_decisions() -> usize {
    20
}

fn default_convention_line_count() -> usize {
    200
}

impl Default for Config {
    fn default() -> Self {
        Config {
            context_dir: default_context_dir(),
            event_log: false,
            injection_token_warn: default_injection_token_warn(),
            context_window: default_context_window(),
            entry_count_learnings: default_entry_count_learnings(),
            entry_count_decisions: default_entry_count_decisions(),
            convention_line_count: default_convention_line_count(),
            notify: NotifyConfig::default(),
        }
    }
}

fn find_config_file() -> Option<PathBuf> {
    // Check repo root first
    let repo_config = Path::new(".mnemorc");
    if repo_config.exists() {
        return Some(repo_config.to_path_buf());
    }

    // Fall back to home directory
    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".mnemorc");
        if home_config.exists() {
            return Some(home_config);
        }
    }

    None
}

/// Load configuration, degrading to defaults on any read or parse error.
pub fn load() -> Config {
    match find_config_file() {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(content) => toml::from_str(&content).unwrap_or_else(|e| {
                eprintln!("[mnemo] Warning: failed to parse {}: {}", path.display(), e);
                Config::default()
            }),
            Err(e) => {
                eprintln!("[mnemo] Warning: failed to read {}: {}", path.display(), e);
                Config::default()
            }
        },
        None => Config::default(),
    }
}

impl Config {
    /// Resolve the context directory. `MNEMO_DIR` wins over the config file.
    pub fn context_dir(&self) -> PathBuf {
        if let Ok(dir) = std::env::var("MNEMO_DIR") {
            if !dir.is_empty() {
                return PathBuf::from(dir);
            }
        }
        PathBuf::from(&self.context_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = Config::default();
        assert_eq!(cfg.context_dir, ".mnemo");
        assert!(!cfg.event_log);
        assert_eq!(cfg.injection_token_warn, 15_000);
        assert_eq!(cfg.context_window, 200_000);
        assert_eq!(cfg.entry_count_decisions, 20);
        assert!(cfg.notify.events.is_empty());
    }

    #[test]
    fn test_parse_config() {
        let toml_str = r#"
context_dir = ".memory"
event_log = true
injection_token_warn = 9000

[notify]
events = ["relay", "nudge"]
"#;
        let cfg: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(cfg.context_dir, ".memory");
        assert!(cfg.event_log);
        assert_eq!(cfg.injection_token_warn, 9000);
        assert_eq!(cfg.notify.events, vec!["relay", "nudge"]);
        // Unset fields keep their defaults
        assert_eq!(cfg.context_window, 200_000);
    }

    #[test]
    fn test_partial_config() {
        let cfg: Config = toml::from_str("entry_count_decisions = 5\n").unwrap();
        assert_eq!(cfg.entry_count_decisions, 5);
        assert_eq!(cfg.entry_count_learnings, 30);
    }
}
