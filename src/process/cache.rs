//! Bounded LRU map of pid → command line, refreshed by sweeping the process table.
//!
//! Entries for exited processes are kept until capacity pressure evicts them: an
//! OOM victim is normally gone from the process table by the time its kill is read.

use super::{procfs, ProcessIdentity};
use crate::error::CacheError;
use lru::LruCache;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ProcessCache {
    proc_dir: PathBuf,
    capacity: usize,
    // Unbounded internally so a multi-million pid_max does not preallocate; `insert` enforces the cap.
    // `get` updates recency, so lookups need the lock exclusively.
    entries: Mutex<LruCache<u32, String>>,
}

impl ProcessCache {
    /// Size the cache from the host's pid_max and populate it once.
    pub fn new(proc_dir: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let proc_dir = proc_dir.into();
        let capacity = procfs::read_pid_max(&proc_dir);
        debug!(pid_max = capacity, proc_dir = %proc_dir.display(), "creating process cache");
        let cache = Self::with_capacity(proc_dir, capacity);
        cache.refresh()?;
        Ok(cache)
    }

    /// Empty cache with an explicit capacity (minimum 1).
    pub fn with_capacity(proc_dir: impl Into<PathBuf>, capacity: usize) -> Self {
        Self {
            proc_dir: proc_dir.into(),
            capacity: capacity.max(1),
            entries: Mutex::new(LruCache::unbounded()),
        }
    }

    pub fn proc_dir(&self) -> &Path {
        &self.proc_dir
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Rescan the process table and upsert every live pid. Returns how many were seen.
    pub fn refresh(&self) -> Result<usize, CacheError> {
        let processes = scan_processes(&self.proc_dir)?;
        let count = processes.len();

        let mut entries = self.entries.lock();
        for p in processes {
            insert_bounded(&mut entries, self.capacity, p.pid, p.cmdline);
        }
        drop(entries);

        debug!(count, "process cache refreshed");
        Ok(count)
    }

    /// Record a command line directly, evicting the least recently used pid when full.
    pub fn insert(&self, pid: u32, cmdline: impl Into<String>) {
        let mut entries = self.entries.lock();
        insert_bounded(&mut entries, self.capacity, pid, cmdline.into());
    }

    /// Cached command line for `pid`, if any. A hit counts as a use for eviction.
    pub fn lookup(&self, pid: u32) -> Option<String> {
        let found = self.entries.lock().get(&pid).cloned();
        match &found {
            Some(cmdline) => debug!(pid, cmdline = %cmdline, "process cache hit"),
            None => debug!(pid, "process not in cache"),
        }
        found
    }
}

fn insert_bounded(entries: &mut LruCache<u32, String>, capacity: usize, pid: u32, cmdline: String) {
    if !entries.contains(&pid) && entries.len() >= capacity {
        entries.pop_lru();
    }
    entries.put(pid, cmdline);
}

/// Every numerically named directory under `proc_dir` whose command line can be read.
fn scan_processes(proc_dir: &Path) -> Result<Vec<ProcessIdentity>, CacheError> {
    let dir = std::fs::read_dir(proc_dir).map_err(|source| CacheError::RefreshFailed {
        path: proc_dir.to_path_buf(),
        source,
    })?;

    let mut processes = Vec::new();
    for entry in dir.filter_map(|e| e.ok()) {
        let Some(pid) = entry.file_name().to_str().and_then(|n| n.parse::<u32>().ok()) else {
            continue;
        };
        if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
            continue;
        }
        // Processes that exit mid-scan simply drop out.
        if let Some(cmdline) = procfs::read_cmdline(proc_dir, pid) {
            processes.push(ProcessIdentity { pid, cmdline });
        }
    }
    debug!(count = processes.len(), proc_dir = %proc_dir.display(), "scanned process table");
    Ok(processes)
}
