//! Injection planning for the context-load hook.
//!
//! Classifies each managed context file, assembles the combined payload
//! with file-name banners, estimates token cost per file and in total, and
//! hands an oversize signal to the checkpoint hook through a one-shot
//! mailbox file.

use crate::core::events::STATE_DIR;
use crate::core::tokens;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

pub const FILE_CONSTITUTION: &str = "CONSTITUTION.md";
pub const FILE_TASKS: &str = "TASKS.md";
pub const FILE_CONVENTIONS: &str = "CONVENTIONS.md";
pub const FILE_ARCHITECTURE: &str = "ARCHITECTURE.md";
pub const FILE_DECISIONS: &str = "DECISIONS.md";
pub const FILE_LEARNINGS: &str = "LEARNINGS.md";
pub const FILE_GLOSSARY: &str = "GLOSSARY.md";
pub const FILE_DRIFT: &str = "DRIFT.md";
pub const FILE_PLAYBOOK: &str = "AGENT_PLAYBOOK.md";

/// Priority order for reading context files: rules first, then work items,
/// then reference material, with the operating manual last.
pub const FILE_READ_ORDER: &[&str] = &[
    FILE_CONSTITUTION,
    FILE_TASKS,
    FILE_CONVENTIONS,
    FILE_ARCHITECTURE,
    FILE_DECISIONS,
    FILE_LEARNINGS,
    FILE_GLOSSARY,
    FILE_DRIFT,
    FILE_PLAYBOOK,
];

/// Files that must exist for hooks to arm themselves (created by
/// `mnemo init`).
pub const REQUIRED_FILES: &[&str] = &[FILE_CONSTITUTION, FILE_TASKS, FILE_DECISIONS];

/// Sentinel markers delimiting the index table inside append-heavy files.
pub const INDEX_START: &str = "<!-- INDEX:START -->";
pub const INDEX_END: &str = "<!-- INDEX:END -->";

/// Placeholder injected when the index markers are absent or inverted.
const EMPTY_INDEX: &str = "(no index entries)";

/// Name of the one-shot oversize mailbox inside the state directory.
const OVERSIZE_FLAG_FILE: &str = "injection-oversize";

/// Per-file injection mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectMode {
    /// Small, foundational: full content.
    Verbatim,
    /// Large, append-heavy: only the index table between the markers.
    IndexOnly,
    /// Referenced by name in the closing summary, body never included.
    MentionOnly,
    /// Never included; the name must not appear anywhere in the output.
    Skip,
}

/// Injection mode for a managed file.
pub fn mode_for(name: &str) -> InjectMode {
    match name {
        FILE_DECISIONS | FILE_LEARNINGS => InjectMode::IndexOnly,
        FILE_TASKS => InjectMode::MentionOnly,
        FILE_GLOSSARY => InjectMode::Skip,
        _ => InjectMode::Verbatim,
    }
}

/// Token accounting for one included excerpt.
#[derive(Debug, Clone)]
pub struct FileTokens {
    pub name: String,
    pub tokens: usize,
}

/// The assembled injection payload with its size accounting.
#[derive(Debug)]
pub struct InjectionPlan {
    pub content: String,
    pub files_loaded: usize,
    pub total_tokens: usize,
    pub per_file: Vec<FileTokens>,
}

/// Build the injection plan for a context directory.
///
/// Missing files are skipped, never fatal — the plan proceeds with
/// whatever is readable.
pub fn build_plan(context_dir: &Path) -> InjectionPlan {
    let mut content = String::new();
    let mut per_file: Vec<FileTokens> = Vec::new();
    let mut total_tokens = 0;
    let mut files_loaded = 0;

    content.push_str("PROJECT CONTEXT (auto-loaded by mnemo — already in your context window)\n");
    content.push_str(&"=".repeat(80));
    content.push_str("\n\n");

    for name in FILE_READ_ORDER {
        let mode = mode_for(name);
        if mode == InjectMode::Skip || mode == InjectMode::MentionOnly {
            continue;
        }

        let Ok(data) = fs::read_to_string(context_dir.join(name)) else {
            continue; // file missing — skip gracefully
        };

        match mode {
            InjectMode::IndexOnly => {
                let index = extract_index(&data).unwrap_or_else(|| EMPTY_INDEX.to_string());
                content.push_str(&format!(
                    "--- {name} (index — read full entries by date when relevant) ---\n{index}\n\n"
                ));
                let t = tokens::estimate_str(&index);
                total_tokens += t;
                per_file.push(FileTokens {
                    name: format!("{name} (idx)"),
                    tokens: t,
                });
                files_loaded += 1;
            }
            InjectMode::Verbatim => {
                content.push_str(&format!("--- {name} ---\n{data}\n\n"));
                let t = tokens::estimate_str(&data);
                total_tokens += t;
                per_file.push(FileTokens {
                    name: name.to_string(),
                    tokens: t,
                });
                files_loaded += 1;
            }
            InjectMode::MentionOnly | InjectMode::Skip => unreachable!(),
        }
    }

    content.push_str(&"=".repeat(80));
    content.push('\n');
    content.push_str(&format!(
        "Context: {files_loaded} files loaded (~{total_tokens} tokens).\n\n\
         {FILE_TASKS} contains the project's prioritized work items. Read it \
         when discussing priorities, picking up work, or when the user asks \
         about tasks.\n\n\
         For full decision or learning details, read the entry in \
         {FILE_DECISIONS} or {FILE_LEARNINGS} by timestamp.\n"
    ));

    InjectionPlan {
        content,
        files_loaded,
        total_tokens,
        per_file,
    }
}

/// Content between the index markers, trimmed. None when either marker is
/// absent or they are inverted — callers treat that as an empty index.
pub fn extract_index(content: &str) -> Option<String> {
    let start = content.find(INDEX_START)?;
    let end = content.find(INDEX_END)?;
    if end <= start {
        return None;
    }
    Some(content[start + INDEX_START.len()..end].trim().to_string())
}

/// Path of the oversize mailbox.
pub fn oversize_flag_path(context_dir: &Path) -> PathBuf {
    context_dir.join(STATE_DIR).join(OVERSIZE_FLAG_FILE)
}

/// Write the oversize mailbox when the plan's total exceeds the threshold.
///
/// The planner never reads this file back — it is a one-shot signal for
/// the checkpoint hook, which folds it into its next natural fire and
/// deletes it.
pub fn write_oversize_flag(context_dir: &Path, threshold: usize, plan: &InjectionPlan) {
    if threshold == 0 || plan.total_tokens <= threshold {
        return;
    }

    let state_dir = context_dir.join(STATE_DIR);
    if fs::create_dir_all(&state_dir).is_err() {
        return;
    }

    let mut flag = String::new();
    flag.push_str("Context injection oversize warning\n");
    flag.push_str(&"=".repeat(35));
    flag.push('\n');
    flag.push_str(&format!(
        "Timestamp: {}\n",
        chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
    ));
    flag.push_str(&format!(
        "Injected:  {} tokens (threshold: {})\n\n",
        plan.total_tokens, threshold
    ));
    flag.push_str("Per-file breakdown:\n");
    for entry in &plan.per_file {
        flag.push_str(&format!("  {:<22} {:>5} tokens\n", entry.name, entry.tokens));
    }
    flag.push_str("\nAction: Run /mnemo-consolidate to distill context files.\n");
    flag.push_str("Files with the most growth are the best candidates.\n");

    let _ = fs::write(oversize_flag_path(context_dir), flag);
}

/// Read and delete the oversize mailbox, returning its token count.
/// None when no mailbox exists; the second reader always finds it absent.
pub fn take_oversize_flag(context_dir: &Path) -> Option<usize> {
    let path = oversize_flag_path(context_dir);
    let data = fs::read_to_string(&path).ok()?;
    let _ = fs::remove_file(&path);
    Some(parse_oversize_tokens(&data))
}

/// Token count from the mailbox's "Injected:  NNN tokens" line. 0 when the
/// format is unexpected.
fn parse_oversize_tokens(data: &str) -> usize {
    let re = Regex::new(r"Injected:\s+(\d+)\s+tokens").expect("static regex");
    re.captures(data)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}
