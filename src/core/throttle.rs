use crate::core::state::SessionState;

/// One-shot-per-session gate.
///
/// Returns true exactly once per (hook, session): the first caller finds
/// the marker absent, writes it, and fires. The marker is written *before*
/// the caller computes or emits anything — the host may issue several tool
/// calls in parallel for the same session, and they must not all pass the
/// check. A second process can still read the marker as absent before the
/// first write lands; that narrow double-fire window is accepted rather
/// than introducing cross-process locking.
pub fn once_per_session(state: &SessionState, hook: &str, session: &str) -> bool {
    let marker = format!("{hook}-loaded-{session}");
    if state.exists(&marker) {
        return false;
    }
    state.touch(&marker);
    true
}

/// Daily throttle check. Fire when this returns false, then call
/// [`mark_fired_today`] after emitting.
pub fn daily_throttled(state: &SessionState, marker: &str) -> bool {
    state.is_daily_throttled(marker)
}

/// Record a daily-throttled fire. Idempotent across process restarts:
/// the marker's mtime carries the date.
pub fn mark_fired_today(state: &SessionState, marker: &str) {
    state.touch(marker);
}

/// Adaptive-frequency bands evaluated on a post-increment counter value.
///
/// Quiet through `quiet_until`; every `mid_every`-th count through
/// `mid_until`; every `late_every`-th count above that. A boundary value
/// (exactly `mid_until`) uses the lower band's rule, so ties favor firing.
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveBands {
    pub quiet_until: u64,
    pub mid_until: u64,
    pub mid_every: u64,
    pub late_every: u64,
}

impl Default for AdaptiveBands {
    fn default() -> Self {
        AdaptiveBands {
            quiet_until: 15,
            mid_until: 30,
            mid_every: 5,
            late_every: 3,
        }
    }
}

impl AdaptiveBands {
    /// Whether the hook fires at this counter value.
    pub fn fires_at(&self, count: u64) -> bool {
        if count > self.mid_until {
            count % self.late_every == 0
        } else if count > self.quiet_until {
            count % self.mid_every == 0
        } else {
            false
        }
    }
}

/// Pause gate. Returns 0 when the session has no pause counter (not
/// paused). When paused, increments the counter and returns the new
/// paused-turn count; callers silence themselves for any value > 0.
pub fn paused_turns(state: &SessionState, session: &str) -> u64 {
    let name = pause_marker(session);
    if !state.exists(&name) {
        return 0;
    }
    state.increment(&name)
}

/// Name of the pause counter entry for a session.
pub fn pause_marker(session: &str) -> String {
    format!("pause-{session}")
}

/// Status line for paused sessions. Only the designated emitter surfaces
/// this to the host; other hooks simply no-op while paused.
pub fn paused_message(turns: u64) -> String {
    match turns {
        0 => String::new(),
        1..=5 => "(mnemo hooks paused for this session)".to_string(),
        _ => format!(
            "(mnemo hooks paused for {turns} turns — run 'mnemo resume' to re-enable)"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_once_per_session_fires_then_stays_silent() {
        let tmp = TempDir::new().unwrap();
        let state = SessionState::at(tmp.path());

        assert!(once_per_session(&state, "context", "s1"));
        assert!(!once_per_session(&state, "context", "s1"));
        assert!(!once_per_session(&state, "context", "s1"));
        // Different session fires independently
        assert!(once_per_session(&state, "context", "s2"));
        // Different hook fires independently
        assert!(once_per_session(&state, "other", "s1"));
    }

    #[test]
    fn test_once_per_session_marker_written_before_return() {
        let tmp = TempDir::new().unwrap();
        let state = SessionState::at(tmp.path());

        assert!(once_per_session(&state, "context", "s1"));
        // The marker must already exist when the caller starts emitting.
        assert!(state.exists("context-loaded-s1"));
    }

    #[test]
    fn test_adaptive_bands_quiet_range() {
        let bands = AdaptiveBands::default();
        for count in 1..=15 {
            assert!(!bands.fires_at(count), "count {count} should be quiet");
        }
    }

    #[test]
    fn test_adaptive_bands_mid_range_multiples_of_five() {
        let bands = AdaptiveBands::default();
        let fired: Vec<u64> = (16..=30).filter(|&c| bands.fires_at(c)).collect();
        assert_eq!(fired, vec![20, 25, 30]);
    }

    #[test]
    fn test_adaptive_bands_late_range_multiples_of_three() {
        let bands = AdaptiveBands::default();
        let fired: Vec<u64> = (31..=40).filter(|&c| bands.fires_at(c)).collect();
        assert_eq!(fired, vec![33, 36, 39]);
    }

    #[test]
    fn test_adaptive_bands_boundary_uses_lower_band() {
        let bands = AdaptiveBands::default();
        // Exactly 30 is a multiple of 5 (mid band) and of 3 (late band);
        // it fires under the mid rule, not by accident of the late one.
        assert!(bands.fires_at(30));
        // 31 and 32 are silent under both rules.
        assert!(!bands.fires_at(31));
        assert!(!bands.fires_at(32));
    }

    #[test]
    fn test_pause_gate_absent_means_not_paused() {
        let tmp = TempDir::new().unwrap();
        let state = SessionState::at(tmp.path());

        assert_eq!(paused_turns(&state, "s1"), 0);
        // The gate must not create the counter as a side effect.
        assert!(!state.exists(&pause_marker("s1")));
    }

    #[test]
    fn test_pause_gate_counts_turns_while_paused() {
        let tmp = TempDir::new().unwrap();
        let state = SessionState::at(tmp.path());

        state.write_counter(&pause_marker("s1"), 0);
        assert_eq!(paused_turns(&state, "s1"), 1);
        assert_eq!(paused_turns(&state, "s1"), 2);
        assert_eq!(paused_turns(&state, "s1"), 3);
    }

    #[test]
    fn test_paused_message_tiers() {
        assert_eq!(paused_message(0), "");
        assert_eq!(paused_message(1), paused_message(5));
        assert!(!paused_message(1).contains('1'));
        let late = paused_message(6);
        assert!(late.contains('6'));
        assert!(late.contains("resume"));
    }
}
