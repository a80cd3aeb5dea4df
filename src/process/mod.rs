//! Process table access: pid → command line cache and host pseudo-file readers.

mod cache;
pub mod procfs;

pub use cache::ProcessCache;

/// A process discovered during a process-table sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessIdentity {
    pub pid: u32,
    pub cmdline: String,
}
