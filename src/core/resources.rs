//! System resource severity for the resource-pressure hook.
//!
//! Sampling runs through the `sysinfo` crate; hooks consume only the
//! evaluated severity and pre-formatted alert messages.

use sysinfo::{Disks, System};

/// Severity of a resource reading. Hooks emit only at `Danger`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Ok,
    Warning,
    Danger,
}

/// One evaluated resource reading.
#[derive(Debug, Clone)]
pub struct Alert {
    pub severity: Severity,
    pub message: String,
}

const MEMORY_DANGER_PCT: u64 = 90;
const MEMORY_WARNING_PCT: u64 = 80;
const SWAP_DANGER_PCT: u64 = 75;
const SWAP_WARNING_PCT: u64 = 50;
const DISK_DANGER_PCT: u64 = 95;
const DISK_WARNING_PCT: u64 = 90;
const LOAD_DANGER_RATIO: f64 = 1.5;
const LOAD_WARNING_RATIO: f64 = 1.0;

/// Sample memory, swap, disk, and load and evaluate each against its
/// thresholds.
pub fn collect() -> Vec<Alert> {
    let mut sys = System::new();
    sys.refresh_memory();

    let mut alerts = Vec::new();

    if sys.total_memory() > 0 {
        let pct = sys.used_memory() * 100 / sys.total_memory();
        alerts.push(evaluate_pct(
            "Memory",
            pct,
            MEMORY_WARNING_PCT,
            MEMORY_DANGER_PCT,
        ));
    }

    if sys.total_swap() > 0 {
        let pct = sys.used_swap() * 100 / sys.total_swap();
        alerts.push(evaluate_pct("Swap", pct, SWAP_WARNING_PCT, SWAP_DANGER_PCT));
    }

    if let Some(pct) = project_disk_usage_pct() {
        alerts.push(evaluate_pct("Disk", pct, DISK_WARNING_PCT, DISK_DANGER_PCT));
    }

    let load = System::load_average().one;
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1) as f64;
    let ratio = load / cpus;
    let severity = if ratio >= LOAD_DANGER_RATIO {
        Severity::Danger
    } else if ratio >= LOAD_WARNING_RATIO {
        Severity::Warning
    } else {
        Severity::Ok
    };
    alerts.push(Alert {
        severity,
        message: format!("Load average {load:.2} over {cpus:.0} CPUs"),
    });

    alerts
}

/// Usage percentage of the disk holding the current directory. Falls back
/// to the fullest disk when no mount point matches.
fn project_disk_usage_pct() -> Option<u64> {
    let disks = Disks::new_with_refreshed_list();
    let cwd = std::env::current_dir().ok()?;

    let mut best: Option<(usize, u64)> = None; // (mount path length, usage pct)
    let mut fullest: Option<u64> = None;
    for disk in disks.list() {
        if disk.total_space() == 0 {
            continue;
        }
        let used = disk.total_space() - disk.available_space();
        let pct = used * 100 / disk.total_space();
        fullest = Some(fullest.map_or(pct, |f: u64| f.max(pct)));
        if cwd.starts_with(disk.mount_point()) {
            let len = disk.mount_point().as_os_str().len();
            if best.map_or(true, |(best_len, _)| len > best_len) {
                best = Some((len, pct));
            }
        }
    }
    best.map(|(_, pct)| pct).or(fullest)
}

fn evaluate_pct(what: &str, pct: u64, warning: u64, danger: u64) -> Alert {
    let severity = if pct >= danger {
        Severity::Danger
    } else if pct >= warning {
        Severity::Warning
    } else {
        Severity::Ok
    };
    Alert {
        severity,
        message: format!("{what} at {pct}% used"),
    }
}

/// Highest severity across the alerts. `Ok` for an empty slice.
pub fn max_severity(alerts: &[Alert]) -> Severity {
    alerts
        .iter()
        .map(|a| a.severity)
        .max()
        .unwrap_or(Severity::Ok)
}
