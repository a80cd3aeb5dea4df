//! Boot-relative kmsg timestamps → wall clock, plus the startup cut-off.

use crate::process::procfs;
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootClock {
    boot_time: DateTime<Utc>,
    /// Microseconds since boot at monitor startup; older kmsg entries are history.
    startup_baseline: u64,
}

impl BootClock {
    pub fn new(boot_time: DateTime<Utc>, startup_baseline: u64) -> Self {
        Self {
            boot_time,
            startup_baseline,
        }
    }

    /// Baseline is the time elapsed between `boot_time` and `now`.
    pub fn starting_at(boot_time: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let elapsed = (now - boot_time).num_microseconds().unwrap_or(0).max(0) as u64;
        Self::new(boot_time, elapsed)
    }

    /// Read `btime` from `<proc>/stat`; if that fails, treat now as boot time.
    pub fn discover(proc_dir: &Path) -> Self {
        let now = Utc::now();
        let boot_time = procfs::read_boot_time(proc_dir).unwrap_or_else(|| {
            warn!(proc_dir = %proc_dir.display(), "boot time unavailable; using current time");
            now
        });
        let clock = Self::starting_at(boot_time, now);
        debug!(boot_time = %clock.boot_time, baseline_us = clock.startup_baseline, "boot clock ready");
        clock
    }

    pub fn boot_time(&self) -> DateTime<Utc> {
        self.boot_time
    }

    pub fn startup_baseline(&self) -> u64 {
        self.startup_baseline
    }

    /// Logged before the monitor started. An entry stamped exactly at the baseline is new.
    pub fn is_pre_existing(&self, timestamp_us: u64) -> bool {
        timestamp_us < self.startup_baseline
    }

    pub fn wall_clock_millis(&self, timestamp_us: u64) -> i64 {
        let offset_ms = i64::try_from(timestamp_us / 1000).unwrap_or(i64::MAX);
        self.boot_time.timestamp_millis().saturating_add(offset_ms)
    }
}
