//! Orchestrator: drains the kmsg reader on a timer, filters for fresh OOM kills and
//! resolves each victim through the process cache.

use super::{BootClock, HostInfo, OomEvent};
use crate::error::MonitorError;
use crate::kmsg::{extract_pid, is_oom_kill, KmsgEntry, KmsgReader};
use crate::process::ProcessCache;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Running,
    Closed,
}

pub struct OomMonitor {
    reader: KmsgReader,
    cache: Arc<ProcessCache>,
    clock: BootClock,
    host: HostInfo,
    state: MonitorState,
}

impl OomMonitor {
    /// Open kmsg, populate the process cache and fix the startup baseline.
    pub fn new(kmsg_path: &Path, proc_dir: &Path) -> Result<Self, MonitorError> {
        let reader = KmsgReader::open(kmsg_path)?;
        let cache = ProcessCache::new(proc_dir)?;
        let clock = BootClock::discover(proc_dir);
        let host = HostInfo::discover(proc_dir);
        info!(
            processes = cache.len(),
            capacity = cache.capacity(),
            baseline_us = clock.startup_baseline(),
            "OOM monitor started"
        );
        Ok(Self::from_parts(reader, Arc::new(cache), clock, host))
    }

    pub fn from_parts(
        reader: KmsgReader,
        cache: Arc<ProcessCache>,
        clock: BootClock,
        host: HostInfo,
    ) -> Self {
        Self {
            reader,
            cache,
            clock,
            host,
            state: MonitorState::Running,
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn clock(&self) -> &BootClock {
        &self.clock
    }

    pub fn cache(&self) -> &Arc<ProcessCache> {
        &self.cache
    }

    /// One detection pass over everything the reader has queued.
    pub fn poll(&mut self) -> Vec<OomEvent> {
        if self.state == MonitorState::Closed {
            return Vec::new();
        }
        let entries = self.reader.drain_available();
        if !entries.is_empty() {
            debug!(count = entries.len(), "drained kmsg entries");
        }
        entries.iter().filter_map(|e| self.process_entry(e)).collect()
    }

    /// Turn a kmsg entry into an event if it is a post-startup OOM kill.
    pub fn process_entry(&self, entry: &KmsgEntry) -> Option<OomEvent> {
        if !is_oom_kill(entry) {
            return None;
        }
        if self.clock.is_pre_existing(entry.timestamp) {
            debug!(
                timestamp_us = entry.timestamp,
                sequence = entry.sequence,
                "skipping OOM kill from before startup"
            );
            return None;
        }
        let pid = match extract_pid(&entry.message) {
            Ok(pid) => pid,
            Err(e) => {
                warn!(error = %e, sequence = entry.sequence, "failed to extract PID from OOM message");
                return None;
            }
        };

        let cmdline = self
            .cache
            .lookup(pid)
            .unwrap_or_else(|| format!("<unknown process {}>", pid));

        Some(OomEvent {
            cmdline,
            pid: pid.to_string(),
            hostname: self.host.hostname.clone(),
            kernel_version: self.host.kernel_version.clone(),
            event_time_millis: self.clock.wall_clock_millis(entry.timestamp),
        })
    }

    /// Detection loop: poll every `interval` and publish onto `events` until shutdown.
    /// A full channel holds the loop back rather than buffering without bound.
    pub async fn run(
        mut self,
        interval: Duration,
        events: mpsc::Sender<OomEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        info!(interval_secs = interval.as_secs_f64(), "OOM detection loop running");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    for event in self.poll() {
                        info!(pid = %event.pid, cmdline = %event.cmdline, "OOM kill detected");
                        if events.send(event).await.is_err() {
                            warn!("event channel closed; stopping detection");
                            self.close();
                            return;
                        }
                    }
                }
                _ = shutdown.changed() => break,
            }
        }
        self.close();
        info!("OOM detection loop stopped");
    }

    /// Periodically rescan the process table off the async workers until shutdown.
    pub fn spawn_cache_refresh(
        &self,
        interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let cache = self.cache.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // Populated at construction; skip the immediate first tick.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let cache = cache.clone();
                        match tokio::task::spawn_blocking(move || cache.refresh()).await {
                            Ok(Ok(count)) => debug!(count, "process cache refresh complete"),
                            Ok(Err(e)) => warn!(error = %e, "failed to refresh process cache"),
                            Err(e) => warn!(error = %e, "process cache refresh task failed"),
                        }
                    }
                    _ = shutdown.changed() => break,
                }
            }
            debug!("process cache refresh stopped");
        })
    }

    /// Close the kmsg reader. Later polls return nothing; the cache is left alone.
    pub fn close(&mut self) {
        if self.state == MonitorState::Closed {
            return;
        }
        self.reader.close();
        self.state = MonitorState::Closed;
    }
}
