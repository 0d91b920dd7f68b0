//! `mnemo message` — manage hook message templates.
//!
//! Hook messages control what text hooks emit; the firing logic is
//! universal. `list` shows every template with its category and override
//! status, `show` prints the effective template for a hook/variant, and
//! `reset` deletes a project override to revert to the embedded default.

use crate::core::assets::{self, MessageInfo};
use crate::core::config::Config;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct ListEntry {
    hook: String,
    variant: String,
    category: String,
    description: String,
    template_vars: Vec<String>,
    has_override: bool,
}

fn override_path(cfg: &Config, hook: &str, variant: &str) -> PathBuf {
    cfg.context_dir()
        .join("hooks")
        .join("messages")
        .join(hook)
        .join(format!("{variant}.txt"))
}

pub fn run_list(cfg: &Config, json: bool) -> Result<(), String> {
    let entries: Vec<ListEntry> = assets::REGISTRY
        .iter()
        .map(|info| ListEntry {
            hook: info.hook.to_string(),
            variant: info.variant.to_string(),
            category: info.category.label().to_string(),
            description: info.description.to_string(),
            template_vars: info.template_vars.iter().map(|v| v.to_string()).collect(),
            has_override: override_path(cfg, info.hook, info.variant).exists(),
        })
        .collect();

    if json {
        let out = serde_json::to_string_pretty(&entries)
            .map_err(|e| format!("serializing entries: {e}"))?;
        println!("{out}");
        return Ok(());
    }

    let mut table = comfy_table::Table::new();
    table.set_header(vec!["Hook", "Variant", "Category", "Override"]);
    for entry in &entries {
        table.add_row(vec![
            entry.hook.as_str(),
            entry.variant.as_str(),
            entry.category.as_str(),
            if entry.has_override { "override" } else { "" },
        ]);
    }
    println!("{table}");

    Ok(())
}

pub fn run_show(cfg: &Config, hook: &str, variant: &str) -> Result<(), String> {
    let info = lookup(hook, variant)?;

    let path = override_path(cfg, hook, variant);
    if let Ok(content) = std::fs::read_to_string(&path) {
        println!("# project override: {}", path.display());
        print!("{content}");
        return Ok(());
    }

    let text = assets::default_message(hook, variant).unwrap_or_default();
    println!("# embedded default ({})", info.category.label());
    print!("{text}");
    Ok(())
}

pub fn run_reset(cfg: &Config, hook: &str, variant: &str) -> Result<(), String> {
    lookup(hook, variant)?;

    let path = override_path(cfg, hook, variant);
    if !path.exists() {
        println!("No override for {hook}/{variant} — already using the embedded default.");
        return Ok(());
    }
    std::fs::remove_file(&path).map_err(|e| format!("cannot remove {}: {}", path.display(), e))?;
    println!("Removed override for {hook}/{variant}.");
    Ok(())
}

fn lookup(hook: &str, variant: &str) -> Result<&'static MessageInfo, String> {
    assets::lookup(hook, variant)
        .ok_or_else(|| format!("unknown hook message: {hook}/{variant} (see 'mnemo message list')"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testutil::test_config;
    use tempfile::TempDir;

    #[test]
    fn test_lookup_unknown_is_error() {
        assert!(lookup("qa-reminder", "gate").is_ok());
        assert!(lookup("nope", "gate").is_err());
    }

    #[test]
    fn test_reset_removes_override() {
        let tmp = TempDir::new().unwrap();
        let cfg = test_config(tmp.path());
        let path = override_path(&cfg, "qa-reminder", "gate");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "custom").unwrap();

        run_reset(&cfg, "qa-reminder", "gate").unwrap();
        assert!(!path.exists());
        // Resetting again is a clean no-op
        run_reset(&cfg, "qa-reminder", "gate").unwrap();
    }
}
