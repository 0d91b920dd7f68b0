//! Context-window usage from the host's session transcript.
//!
//! Claude Code writes one JSONL file per session under
//! `~/.claude/projects/<project>/<session>.jsonl`. The last assistant
//! message's usage block carries the current total input tokens, which the
//! checkpoint hook turns into a window-percentage warning.

use crate::core::input::SESSION_UNKNOWN;
use crate::core::state::SessionState;
use serde::Deserialize;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;

/// Maximum bytes read from the end of a transcript when scanning for the
/// last usage block.
const MAX_TAIL_BYTES: u64 = 32 * 1024;

/// Context window for 1M-capable models.
const CONTEXT_WINDOW_1M: usize = 1_000_000;

/// Default context window when the model is unrecognized and nothing is
/// configured.
pub const DEFAULT_CONTEXT_WINDOW: usize = 200_000;

/// Token usage and model extracted from a session transcript.
#[derive(Debug, Default, Clone)]
pub struct SessionUsage {
    /// Total input tokens: input + cache creation + cache read.
    pub tokens: usize,
    /// Model ID from the last assistant message, or empty.
    pub model: String,
}

#[derive(Deserialize)]
struct TranscriptLine {
    #[serde(default)]
    message: TranscriptMessage,
}

#[derive(Deserialize, Default)]
struct TranscriptMessage {
    #[serde(default)]
    role: String,
    #[serde(default)]
    model: String,
    #[serde(default)]
    usage: Usage,
}

#[derive(Deserialize, Default)]
struct Usage {
    #[serde(default)]
    input_tokens: usize,
    #[serde(default)]
    cache_creation_input_tokens: usize,
    #[serde(default)]
    cache_read_input_tokens: usize,
}

/// Read the session's current token usage. Zero value when the transcript
/// cannot be found or carries no usage data.
pub fn read_session_usage(state: &SessionState, session_id: &str) -> SessionUsage {
    if session_id.is_empty() || session_id == SESSION_UNKNOWN {
        return SessionUsage::default();
    }
    let Some(path) = find_transcript(state, session_id) else {
        return SessionUsage::default();
    };
    parse_last_usage(&path).unwrap_or_default()
}

/// Locate the transcript for a session ID, caching the resolved path in
/// the state store so the directory scan runs once per session.
fn find_transcript(state: &SessionState, session_id: &str) -> Option<PathBuf> {
    let cache_key = format!("jsonl-path-{session_id}");
    if let Some(cached) = state.read_string(&cache_key) {
        let path = PathBuf::from(&cached);
        if path.exists() {
            return Some(path);
        }
    }

    let projects = dirs::home_dir()?.join(".claude").join("projects");
    let entries = std::fs::read_dir(&projects).ok()?;
    let file_name = format!("{session_id}.jsonl");
    for entry in entries.flatten() {
        let candidate = entry.path().join(&file_name);
        if candidate.is_file() {
            state.write_string(&cache_key, &candidate.to_string_lossy());
            return Some(candidate);
        }
    }
    None
}

/// Scan the transcript tail backwards for the last assistant message with
/// a non-zero usage total.
fn parse_last_usage(path: &std::path::Path) -> Option<SessionUsage> {
    let mut file = File::open(path).ok()?;
    let size = file.metadata().ok()?.len();
    if size > MAX_TAIL_BYTES {
        file.seek(SeekFrom::Start(size - MAX_TAIL_BYTES)).ok()?;
    }
    let mut tail = Vec::new();
    file.read_to_end(&mut tail).ok()?;
    let tail = String::from_utf8_lossy(&tail);

    for line in tail.lines().rev() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        // Quick rejects before paying for a full parse
        if !line.contains("\"usage\"") || !line.contains("\"input_tokens\"") {
            continue;
        }

        let Ok(parsed) = serde_json::from_str::<TranscriptLine>(line) else {
            continue;
        };
        if parsed.message.role != "assistant" {
            continue;
        }

        let u = &parsed.message.usage;
        let total = u.input_tokens + u.cache_creation_input_tokens + u.cache_read_input_tokens;
        if total > 0 {
            return Some(SessionUsage {
                tokens: total,
                model: parsed.message.model,
            });
        }
    }
    None
}

/// Context window for a known model ID. None signals callers to fall back
/// to configuration.
fn model_context_window(model: &str) -> Option<usize> {
    if model.is_empty() {
        return None;
    }

    // 1M-capable models; the host enables the long-context beta for these.
    const LONG_CONTEXT_PREFIXES: &[&str] = &[
        "claude-opus-4-6",
        "claude-sonnet-4-6",
        "claude-sonnet-4-5",
        "claude-sonnet-4-2",
    ];
    if LONG_CONTEXT_PREFIXES.iter().any(|p| model.starts_with(p))
        || model == "claude-sonnet-4"
        || model == "claude-sonnet-4-0"
    {
        return Some(CONTEXT_WINDOW_1M);
    }

    if model.starts_with("claude-") {
        return Some(DEFAULT_CONTEXT_WINDOW);
    }
    None
}

/// Effective window: transcript-detected model wins, then the configured
/// value.
pub fn effective_window(model: &str, configured: usize) -> usize {
    model_context_window(model).unwrap_or(configured)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn assistant_line(tokens: usize, model: &str) -> String {
        format!(
            r#"{{"type":"assistant","message":{{"role":"assistant","model":"{model}","usage":{{"input_tokens":{tokens},"cache_creation_input_tokens":0,"cache_read_input_tokens":0}}}}}}"#
        )
    }

    #[test]
    fn test_parse_last_usage_picks_latest_assistant() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("s1.jsonl");
        let mut content = String::new();
        content.push_str(&assistant_line(1000, "claude-x"));
        content.push('\n');
        content.push_str(r#"{"type":"user","message":{"role":"user"}}"#);
        content.push('\n');
        content.push_str(&assistant_line(52_000, "claude-x"));
        content.push('\n');
        fs::write(&path, content).unwrap();

        let usage = parse_last_usage(&path).unwrap();
        assert_eq!(usage.tokens, 52_000);
        assert_eq!(usage.model, "claude-x");
    }

    #[test]
    fn test_parse_last_usage_sums_cache_tokens() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("s1.jsonl");
        let line = r#"{"message":{"role":"assistant","model":"m","usage":{"input_tokens":10,"cache_creation_input_tokens":20,"cache_read_input_tokens":30}}}"#;
        fs::write(&path, format!("{line}\n")).unwrap();

        let usage = parse_last_usage(&path).unwrap();
        assert_eq!(usage.tokens, 60);
    }

    #[test]
    fn test_parse_last_usage_no_usage_data() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("s1.jsonl");
        fs::write(&path, "{\"type\":\"user\"}\nnot json\n").unwrap();
        assert!(parse_last_usage(&path).is_none());
    }

    #[test]
    fn test_unknown_session_reads_zero() {
        let tmp = TempDir::new().unwrap();
        let state = SessionState::at(tmp.path());
        let usage = read_session_usage(&state, SESSION_UNKNOWN);
        assert_eq!(usage.tokens, 0);
    }

    #[test]
    fn test_effective_window_model_overrides_config() {
        assert_eq!(
            effective_window("claude-opus-4-6-20260205", 200_000),
            1_000_000
        );
        assert_eq!(effective_window("claude-3-5-haiku", 50_000), 200_000);
        assert_eq!(effective_window("", 123_000), 123_000);
        assert_eq!(effective_window("gpt-x", 123_000), 123_000);
    }
}
