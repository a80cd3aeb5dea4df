//! OOM detection pipeline: kmsg reader + process cache → `OomEvent`s.

mod clock;
mod oom;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::process::procfs;

pub use clock::BootClock;
pub use oom::{MonitorState, OomMonitor};

/// A detected OOM kill, ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OomEvent {
    pub cmdline: String,
    pub pid: String,
    pub hostname: String,
    #[serde(rename = "kernel")]
    pub kernel_version: String,
    /// Wall-clock Unix epoch milliseconds
    #[serde(rename = "time")]
    pub event_time_millis: i64,
}

/// Host identity stamped on every event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostInfo {
    pub hostname: String,
    pub kernel_version: String,
}

impl HostInfo {
    pub fn discover(proc_dir: &Path) -> Self {
        let hostname = procfs::hostname().unwrap_or_else(|| {
            tracing::warn!("hostname unavailable");
            "unknown".to_string()
        });
        let kernel_version = procfs::read_kernel_version(proc_dir).unwrap_or_else(|| {
            tracing::warn!(proc_dir = %proc_dir.display(), "kernel version unavailable");
            "unknown".to_string()
        });
        Self {
            hostname,
            kernel_version,
        }
    }
}
