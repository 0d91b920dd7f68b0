use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// File-backed cross-invocation state, keyed by entry name.
///
/// Every hook invocation is a fresh process, so all coordination state
/// lives in small files under a per-user directory. Three entry shapes
/// share the same mechanism: counters (decimal content), markers
/// (presence + mtime), and stored timestamps. All operations are
/// best-effort — I/O errors degrade to the "as if absent" value and are
/// never surfaced to hooks.
pub struct SessionState {
    dir: PathBuf,
}

impl SessionState {
    /// Open the store at the per-user secure directory.
    pub fn open() -> SessionState {
        SessionState { dir: secure_dir() }
    }

    /// Open the store at an explicit directory (tests, housekeeping).
    pub fn at(dir: impl Into<PathBuf>) -> SessionState {
        SessionState { dir: dir.into() }
    }

    /// Absolute path of a state entry.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Read an integer counter. Returns 0 if missing or unparseable.
    pub fn read_counter(&self, name: &str) -> u64 {
        fs::read_to_string(self.path(name))
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Write an integer counter.
    pub fn write_counter(&self, name: &str, n: u64) {
        write_private(&self.path(name), n.to_string().as_bytes());
    }

    /// Read-increment-write a counter and return the new value.
    ///
    /// Not atomicized: two simultaneous invocations can both read the same
    /// stale value and one increment is lost. Worst outcome is a missed
    /// throttle tick, not corruption, so no cross-process locking.
    pub fn increment(&self, name: &str) -> u64 {
        let n = self.read_counter(name) + 1;
        self.write_counter(name, n);
        n
    }

    /// Create a marker or update its modification time. Content is empty.
    pub fn touch(&self, name: &str) {
        write_private(&self.path(name), b"");
    }

    /// Whether a marker entry exists.
    pub fn exists(&self, name: &str) -> bool {
        self.path(name).exists()
    }

    /// Remove an entry. Missing entries are not an error.
    pub fn remove(&self, name: &str) {
        let _ = fs::remove_file(self.path(name));
    }

    /// Modification time of an entry, if it exists.
    pub fn modified(&self, name: &str) -> Option<SystemTime> {
        fs::metadata(self.path(name)).and_then(|m| m.modified()).ok()
    }

    /// Age of an entry relative to now, if it exists.
    pub fn age(&self, name: &str) -> Option<Duration> {
        self.modified(name)
            .and_then(|m| SystemTime::now().duration_since(m).ok())
    }

    /// Whether a marker was touched today, by local calendar date.
    ///
    /// Compares dates, not elapsed duration: a marker from 23:59 yesterday
    /// is not throttled at 00:01 today.
    pub fn is_daily_throttled(&self, name: &str) -> bool {
        let Some(modified) = self.modified(name) else {
            return false;
        };
        let marker_day = DateTime::<Local>::from(modified).date_naive();
        marker_day == Local::now().date_naive()
    }

    /// Read a stored timestamp value. Returns 0 if missing or unparseable.
    pub fn read_stamp(&self, name: &str) -> i64 {
        fs::read_to_string(self.path(name))
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Write a stored timestamp value.
    pub fn write_stamp(&self, name: &str, stamp: i64) {
        write_private(&self.path(name), stamp.to_string().as_bytes());
    }

    /// Read a cached string entry (e.g. a resolved path). None if missing
    /// or empty after trimming.
    pub fn read_string(&self, name: &str) -> Option<String> {
        let s = fs::read_to_string(self.path(name)).ok()?;
        let s = s.trim().to_string();
        if s.is_empty() {
            None
        } else {
            Some(s)
        }
    }

    /// Write a cached string entry.
    pub fn write_string(&self, name: &str, value: &str) {
        write_private(&self.path(name), value.as_bytes());
    }

    /// Remove entries older than `max_age`. Subdirectories are left alone.
    pub fn sweep(&self, max_age: Duration) {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return;
        };
        for entry in entries.flatten() {
            let Ok(meta) = entry.metadata() else {
                continue;
            };
            if meta.is_dir() {
                continue;
            }
            let stale = meta
                .modified()
                .ok()
                .and_then(|m| SystemTime::now().duration_since(m).ok())
                .map(|a| a > max_age)
                .unwrap_or(false);
            if stale {
                let _ = fs::remove_file(entry.path());
            }
        }
    }
}

/// Per-user state directory: `$XDG_RUNTIME_DIR/mnemo` when set (tmpfs,
/// user-owned), otherwise `<os-temp>/mnemo-<uid>`. Created `0700` on
/// first use.
pub fn secure_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_RUNTIME_DIR") {
        if !xdg.is_empty() {
            let dir = PathBuf::from(xdg).join("mnemo");
            create_private_dir(&dir);
            return dir;
        }
    }
    let dir = std::env::temp_dir().join(format!("mnemo-{}", uid()));
    create_private_dir(&dir);
    dir
}

#[cfg(unix)]
fn uid() -> u32 {
    // SAFETY: getuid has no failure modes and touches no memory.
    unsafe { libc::getuid() }
}

#[cfg(not(unix))]
fn uid() -> u32 {
    0
}

#[cfg(unix)]
fn create_private_dir(dir: &Path) {
    use std::os::unix::fs::DirBuilderExt;
    let _ = fs::DirBuilder::new().recursive(true).mode(0o700).create(dir);
}

#[cfg(not(unix))]
fn create_private_dir(dir: &Path) {
    let _ = fs::create_dir_all(dir);
}

#[cfg(unix)]
fn write_private(path: &Path, data: &[u8]) {
    use std::os::unix::fs::PermissionsExt;
    if fs::write(path, data).is_ok() {
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }
}

#[cfg(not(unix))]
fn write_private(path: &Path, data: &[u8]) {
    let _ = fs::write(path, data);
}
