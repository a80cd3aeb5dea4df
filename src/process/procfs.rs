//! Best-effort readers for the host pseudo-files the monitor depends on.

use chrono::{DateTime, TimeZone, Utc};
use std::path::Path;
use sysinfo::System;

/// Used when `sys/kernel/pid_max` is missing or unparsable.
pub const DEFAULT_PID_MAX: usize = 32768;

/// Command line of `pid`: argv joined by spaces, else `[comm]`, else `None`.
pub fn read_cmdline(proc_dir: &Path, pid: u32) -> Option<String> {
    let pid_dir = proc_dir.join(pid.to_string());
    let cmdline = std::fs::read(pid_dir.join("cmdline"))
        .map(|raw| String::from_utf8_lossy(&raw).replace('\0', " ").trim().to_string())
        .unwrap_or_default();
    if !cmdline.is_empty() {
        return Some(cmdline);
    }
    let comm = std::fs::read_to_string(pid_dir.join("comm")).ok()?;
    Some(format!("[{}]", comm.trim()))
}

pub fn read_pid_max(proc_dir: &Path) -> usize {
    std::fs::read_to_string(proc_dir.join("sys").join("kernel").join("pid_max"))
        .ok()
        .and_then(|s| s.trim().parse::<usize>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(DEFAULT_PID_MAX)
}

/// Boot time from the `btime` line of `<proc>/stat`.
pub fn read_boot_time(proc_dir: &Path) -> Option<DateTime<Utc>> {
    let stat = std::fs::read_to_string(proc_dir.join("stat")).ok()?;
    let secs = stat
        .lines()
        .find_map(|line| line.strip_prefix("btime "))?
        .trim()
        .parse::<i64>()
        .ok()?;
    Utc.timestamp_opt(secs, 0).single()
}

/// Third whitespace-separated field of `<proc>/version`.
pub fn read_kernel_version(proc_dir: &Path) -> Option<String> {
    let version = std::fs::read_to_string(proc_dir.join("version")).ok()?;
    version.split_whitespace().nth(2).map(String::from)
}

pub fn hostname() -> Option<String> {
    System::host_name().filter(|h| !h.is_empty())
}
