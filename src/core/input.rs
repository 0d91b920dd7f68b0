use serde::Deserialize;
use std::io::{IsTerminal, Read};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Sentinel session ID used when the host payload lacks one.
pub const SESSION_UNKNOWN: &str = "unknown";

/// Ceiling on how long a hook waits for stdin before proceeding with the
/// zero value.
const READ_TIMEOUT: Duration = Duration::from_secs(2);

/// JSON payload Claude Code sends to hook commands via stdin.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub tool_input: ToolInput,
}

/// Tool-specific fields from a hook invocation. For Bash hooks, `command`
/// holds the shell command.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolInput {
    #[serde(default)]
    pub command: String,
}

impl HookInput {
    /// Session ID with the `"unknown"` sentinel applied.
    pub fn session(&self) -> &str {
        if self.session_id.is_empty() {
            SESSION_UNKNOWN
        } else {
            &self.session_id
        }
    }
}

/// Read and parse the hook payload from stdin.
///
/// Returns the zero value on any failure — every downstream hook depends
/// on this function always returning:
///   - Terminal stdin (no data will ever arrive): returns immediately
///   - No EOF within the 2-second ceiling: abandons the read
///   - Malformed JSON: zero value
pub fn read_stdin() -> HookInput {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return HookInput::default();
    }
    read_bounded(stdin)
}

/// Read a payload from any reader with the timeout ceiling applied.
///
/// The reader thread is abandoned on timeout rather than joined; the
/// process exits shortly after, which reclaims it.
pub fn read_bounded<R: Read + Send + 'static>(mut reader: R) -> HookInput {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut data = String::new();
        let result = reader.read_to_string(&mut data).map(|_| data);
        let _ = tx.send(result);
    });

    match rx.recv_timeout(READ_TIMEOUT) {
        Ok(Ok(data)) => serde_json::from_str(&data).unwrap_or_default(),
        _ => HookInput::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parses_session_and_command() {
        let payload = r#"{"session_id":"abc-123","tool_input":{"command":"git status"}}"#;
        let input = read_bounded(Cursor::new(payload.to_string()));
        assert_eq!(input.session_id, "abc-123");
        assert_eq!(input.tool_input.command, "git status");
        assert_eq!(input.session(), "abc-123");
    }

    #[test]
    fn test_malformed_json_degrades_to_zero_value() {
        let input = read_bounded(Cursor::new("{not json".to_string()));
        assert_eq!(input.session_id, "");
        assert_eq!(input.session(), SESSION_UNKNOWN);
        assert_eq!(input.tool_input.command, "");
    }

    #[test]
    fn test_empty_stream_degrades_to_zero_value() {
        let input = read_bounded(Cursor::new(String::new()));
        assert_eq!(input.session(), SESSION_UNKNOWN);
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let payload = r#"{"session_id":"s","hook_event_name":"PreToolUse","cwd":"/tmp"}"#;
        let input = read_bounded(Cursor::new(payload.to_string()));
        assert_eq!(input.session_id, "s");
    }

    /// A reader that never produces data and never reaches EOF.
    struct Stuck;

    impl Read for Stuck {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            thread::sleep(Duration::from_secs(60));
            Ok(0)
        }
    }

    #[test]
    fn test_stuck_reader_times_out_with_zero_value() {
        let start = std::time::Instant::now();
        let input = read_bounded(Stuck);
        assert_eq!(input.session(), SESSION_UNKNOWN);
        // Must return close to the 2s ceiling, well before the reader's 60s
        assert!(start.elapsed() < Duration::from_secs(10));
    }
}
