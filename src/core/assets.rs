//! Embedded default message templates and their metadata registry.
//!
//! The hook logic (when to fire, counting, state tracking) is universal;
//! the messages are opinions. Each entry here can be overridden per
//! project via `<context>/hooks/messages/<hook>/<variant>.txt`.

use serde::Deserialize;

/// Message category: intended for per-project customization, or internal
/// to mnemo's own workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Customizable,
    Internal,
}

impl Category {
    pub fn label(&self) -> &'static str {
        match self {
            Category::Customizable => "customizable",
            Category::Internal => "internal",
        }
    }
}

/// Metadata for one embedded hook message template.
pub struct MessageInfo {
    pub hook: &'static str,
    pub variant: &'static str,
    pub category: Category,
    pub description: &'static str,
    pub template_vars: &'static [&'static str],
    text: &'static str,
}

/// Static registry of all embedded message templates, sorted by hook then
/// variant. Changes only when hooks are added or removed.
pub const REGISTRY: &[MessageInfo] = &[
    MessageInfo {
        hook: "block-dangerous-commands",
        variant: "cp-to-bin",
        category: Category::Internal,
        description: "Block copying binaries to bin directories",
        template_vars: &[],
        text: include_str!("../../assets/messages/block-dangerous-commands/cp-to-bin.txt"),
    },
    MessageInfo {
        hook: "block-dangerous-commands",
        variant: "install-to-local-bin",
        category: Category::Internal,
        description: "Block copying binaries to ~/.local/bin",
        template_vars: &[],
        text: include_str!(
            "../../assets/messages/block-dangerous-commands/install-to-local-bin.txt"
        ),
    },
    MessageInfo {
        hook: "block-dangerous-commands",
        variant: "mid-git-push",
        category: Category::Internal,
        description: "Block git push without user approval",
        template_vars: &[],
        text: include_str!("../../assets/messages/block-dangerous-commands/mid-git-push.txt"),
    },
    MessageInfo {
        hook: "block-dangerous-commands",
        variant: "mid-sudo",
        category: Category::Internal,
        description: "Block sudo usage",
        template_vars: &[],
        text: include_str!("../../assets/messages/block-dangerous-commands/mid-sudo.txt"),
    },
    MessageInfo {
        hook: "check-backup-age",
        variant: "warning",
        category: Category::Customizable,
        description: "Backup staleness warning",
        template_vars: &["Warnings"],
        text: include_str!("../../assets/messages/check-backup-age/warning.txt"),
    },
    MessageInfo {
        hook: "check-context-size",
        variant: "checkpoint",
        category: Category::Customizable,
        description: "Context capacity checkpoint",
        template_vars: &[],
        text: include_str!("../../assets/messages/check-context-size/checkpoint.txt"),
    },
    MessageInfo {
        hook: "check-context-size",
        variant: "oversize",
        category: Category::Customizable,
        description: "Injection oversize nudge",
        template_vars: &["TokenCount"],
        text: include_str!("../../assets/messages/check-context-size/oversize.txt"),
    },
    MessageInfo {
        hook: "check-context-size",
        variant: "window",
        category: Category::Customizable,
        description: "Context window usage warning (>80%)",
        template_vars: &["TokenCount", "Percentage"],
        text: include_str!("../../assets/messages/check-context-size/window.txt"),
    },
    MessageInfo {
        hook: "check-journal",
        variant: "both",
        category: Category::Customizable,
        description: "Unexported sessions and unenriched entries",
        template_vars: &["UnexportedCount", "UnenrichedCount"],
        text: include_str!("../../assets/messages/check-journal/both.txt"),
    },
    MessageInfo {
        hook: "check-journal",
        variant: "unenriched",
        category: Category::Customizable,
        description: "Unenriched journal entries",
        template_vars: &["UnenrichedCount"],
        text: include_str!("../../assets/messages/check-journal/unenriched.txt"),
    },
    MessageInfo {
        hook: "check-journal",
        variant: "unexported",
        category: Category::Customizable,
        description: "Unexported sessions reminder",
        template_vars: &["UnexportedCount"],
        text: include_str!("../../assets/messages/check-journal/unexported.txt"),
    },
    MessageInfo {
        hook: "check-knowledge",
        variant: "warning",
        category: Category::Customizable,
        description: "Knowledge file growth warning",
        template_vars: &["FileWarnings"],
        text: include_str!("../../assets/messages/check-knowledge/warning.txt"),
    },
    MessageInfo {
        hook: "check-resources",
        variant: "alert",
        category: Category::Internal,
        description: "System resource pressure alert",
        template_vars: &["AlertMessages"],
        text: include_str!("../../assets/messages/check-resources/alert.txt"),
    },
    MessageInfo {
        hook: "check-version",
        variant: "mismatch",
        category: Category::Internal,
        description: "Binary/plugin version mismatch",
        template_vars: &["BinaryVersion", "PluginVersion"],
        text: include_str!("../../assets/messages/check-version/mismatch.txt"),
    },
    MessageInfo {
        hook: "qa-reminder",
        variant: "gate",
        category: Category::Customizable,
        description: "Pre-commit QA gate instructions",
        template_vars: &[],
        text: include_str!("../../assets/messages/qa-reminder/gate.txt"),
    },
    MessageInfo {
        hook: "specs-nudge",
        variant: "nudge",
        category: Category::Customizable,
        description: "Plan-to-specs directory nudge",
        template_vars: &[],
        text: include_str!("../../assets/messages/specs-nudge/nudge.txt"),
    },
];

/// The embedded default text for a (hook, variant), if one exists.
pub fn default_message(hook: &str, variant: &str) -> Option<&'static str> {
    lookup(hook, variant).map(|info| info.text)
}

/// Registry metadata for a (hook, variant), if present.
pub fn lookup(hook: &str, variant: &str) -> Option<&'static MessageInfo> {
    REGISTRY
        .iter()
        .find(|info| info.hook == hook && info.variant == variant)
}

#[derive(Deserialize)]
struct PluginManifest {
    version: String,
}

/// Version string from the embedded plugin manifest. None when the
/// manifest is unparseable.
pub fn plugin_version() -> Option<String> {
    let manifest: PluginManifest =
        serde_json::from_str(include_str!("../../assets/plugin.json")).ok()?;
    Some(manifest.version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_sorted_and_nonempty() {
        assert!(!REGISTRY.is_empty());
        for pair in REGISTRY.windows(2) {
            let a = (pair[0].hook, pair[0].variant);
            let b = (pair[1].hook, pair[1].variant);
            assert!(a < b, "registry out of order: {a:?} before {b:?}");
        }
    }

    #[test]
    fn test_embedded_texts_are_nonempty() {
        for info in REGISTRY {
            assert!(
                !info.text.trim().is_empty(),
                "empty embedded template for {}/{}",
                info.hook,
                info.variant
            );
        }
    }

    #[test]
    fn test_lookup_hit_and_miss() {
        assert!(lookup("qa-reminder", "gate").is_some());
        assert!(lookup("qa-reminder", "missing").is_none());
        assert!(lookup("no-such-hook", "gate").is_none());
    }

    #[test]
    fn test_declared_vars_appear_in_template() {
        for info in REGISTRY {
            for var in info.template_vars {
                assert!(
                    info.text.contains(&format!("{{{{{var}}}}}")),
                    "{}/{} declares {var} but the template never uses it",
                    info.hook,
                    info.variant
                );
            }
        }
    }

    #[test]
    fn test_plugin_version_parses() {
        let version = plugin_version().unwrap();
        assert!(version.contains('.'));
    }
}
