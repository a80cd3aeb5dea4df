//! Kernel message device (`/dev/kmsg`): record parsing, OOM classification and the
//! background reader that feeds the monitor.

mod classify;
mod parser;
mod reader;

use serde::{Deserialize, Serialize};

pub use classify::{extract_pid, is_oom_kill};
pub use parser::parse_line;
pub use reader::{KmsgReader, QUEUE_CAPACITY};

/// One record from the kernel ring buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KmsgEntry {
    /// Facility/level encoding, opaque beyond parsing
    pub priority: i32,
    pub sequence: u64,
    /// Microseconds since boot (monotonic)
    pub timestamp: u64,
    pub message: String,
}
