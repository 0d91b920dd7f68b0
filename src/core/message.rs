use crate::core::assets;
use serde_json::Value;
use std::path::Path;

/// Template variables shared with [`crate::core::notify::TemplateRef`].
pub type Vars = serde_json::Map<String, Value>;

/// Build a variables map from key/value pairs.
pub fn vars(pairs: &[(&str, Value)]) -> Vars {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// Outcome of message resolution.
///
/// `Silent` means the selected template was empty or whitespace-only — an
/// explicit "emit nothing" signal, distinct from falling back. `Fallback`
/// means the selected template failed to parse and the caller-supplied
/// string was used verbatim. Collapse to text only at the stdout boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Silent,
    Rendered(String),
    Fallback(String),
}

impl Resolved {
    /// The text to emit, or None for intentional silence.
    pub fn text(self) -> Option<String> {
        match self {
            Resolved::Silent => None,
            Resolved::Rendered(s) | Resolved::Fallback(s) => Some(s),
        }
    }
}

/// Resolve a hook message through the override chain.
///
/// Priority:
///  1. `<context>/hooks/messages/{hook}/{variant}.txt` (project override)
///  2. embedded default asset for the same (hook, variant)
///  3. the hardcoded fallback string itself
///
/// The *selected* template decides silence: an empty override silences the
/// hook even though a non-empty default exists underneath it.
pub fn resolve(
    context_dir: &Path,
    hook: &str,
    variant: &str,
    vars: &Vars,
    fallback: &str,
) -> Resolved {
    let override_path = context_dir
        .join("hooks")
        .join("messages")
        .join(hook)
        .join(format!("{variant}.txt"));
    if let Ok(text) = std::fs::read_to_string(&override_path) {
        return render(&text, vars, fallback);
    }

    if let Some(text) = assets::default_message(hook, variant) {
        return render(text, vars, fallback);
    }

    render(fallback, vars, fallback)
}

/// Render a template with `{{Name}}` placeholder substitution.
fn render(template: &str, vars: &Vars, fallback: &str) -> Resolved {
    if template.trim().is_empty() {
        return Resolved::Silent;
    }
    match substitute(template, vars) {
        Ok(text) => Resolved::Rendered(text),
        Err(_) => Resolved::Fallback(fallback.to_string()),
    }
}

#[derive(Debug)]
struct UnterminatedPlaceholder;

/// Substitute `{{Name}}` placeholders from the variables map.
///
/// A variable absent from the map renders as the literal `{{Name}}` text —
/// a visible placeholder, not an error. An opening `{{` with no closing
/// `}}` is a parse failure.
fn substitute(template: &str, vars: &Vars) -> Result<String, UnterminatedPlaceholder> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            return Err(UnterminatedPlaceholder);
        };
        let name = after[..end].trim();
        match vars.get(name) {
            Some(value) => out.push_str(&value_text(value)),
            None => {
                // Visible placeholder for unknown variables
                out.push_str(&rest[start..start + 2 + end + 2]);
            }
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Render a JSON value for template output. Strings are unquoted; other
/// values use their JSON form.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
