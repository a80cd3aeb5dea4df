//! Notifier configuration: JSON file, then environment overrides.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Process table root
    pub proc_dir: PathBuf,
    /// Kernel message device
    pub kmsg_path: PathBuf,
    pub monitor: MonitorConfig,
    pub slack: SlackConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// How often buffered kernel messages are checked (seconds)
    pub check_interval_secs: u64,
    /// How often the process cache is rebuilt (seconds)
    pub refresh_interval_secs: u64,
    /// Events held between detection and delivery
    pub event_buffer: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlackConfig {
    /// Incoming webhook; events are only logged when unset
    pub webhook_url: Option<String>,
    pub channel: String,
    pub username: String,
    pub icon_emoji: String,
    /// Offset used when rendering the event time
    pub utc_offset_minutes: i32,
    pub timezone_label: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            proc_dir: PathBuf::from("/proc"),
            kmsg_path: PathBuf::from("/dev/kmsg"),
            monitor: MonitorConfig::default(),
            slack: SlackConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: 10,
            refresh_interval_secs: 5,
            event_buffer: 10,
        }
    }
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            channel: "#alerts".to_string(),
            username: "oom-notifier".to_string(),
            icon_emoji: ":firecracker:".to_string(),
            utc_offset_minutes: 330,
            timezone_label: "IST".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl MonitorConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}

impl NotifierConfig {
    /// Load from JSON file if present; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `OOM_NOTIFIER_SLACK_WEBHOOK`, `OOM_NOTIFIER_SLACK_CHANNEL` and `LOGGING_LEVEL`.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(url) = non_empty("OOM_NOTIFIER_SLACK_WEBHOOK") {
            self.slack.webhook_url = Some(url);
        }
        if let Some(channel) = non_empty("OOM_NOTIFIER_SLACK_CHANNEL") {
            self.slack.channel = channel;
        }
        if let Some(level) = non_empty("LOGGING_LEVEL") {
            self.log.level = level.to_lowercase();
        }
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.monitor.check_interval_secs == 0 {
            return Err(ConfigError::Zero {
                field: "monitor.check_interval_secs",
            });
        }
        if self.monitor.refresh_interval_secs == 0 {
            return Err(ConfigError::Zero {
                field: "monitor.refresh_interval_secs",
            });
        }
        if self.monitor.event_buffer == 0 {
            return Err(ConfigError::Zero {
                field: "monitor.event_buffer",
            });
        }
        Ok(())
    }
}
