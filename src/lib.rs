//! oom-notifier — watches the kernel log for OOM kills and reports the victims.
//!
//! Modular structure:
//! - [`kmsg`] — `/dev/kmsg` record parser, OOM classifier and background reader
//! - [`process`] — pid → command line LRU cache and procfs readers
//! - [`monitor`] — Detection orchestrator producing [`OomEvent`]s
//! - [`notifier`] — Slack webhook delivery
//! - [`config`] — JSON configuration with environment overrides
//! - [`logging`] — Structured logging setup

pub mod config;
pub mod error;
pub mod kmsg;
pub mod logging;
pub mod monitor;
pub mod notifier;
pub mod process;

pub use config::NotifierConfig;
pub use error::{CacheError, ConfigError, KmsgError, MonitorError, NotifyError};
pub use kmsg::{KmsgEntry, KmsgReader};
pub use logging::StructuredLogger;
pub use monitor::{BootClock, HostInfo, MonitorState, OomEvent, OomMonitor};
pub use notifier::SlackNotifier;
pub use process::ProcessCache;
