//! OOM-kill detection and victim PID extraction.

use super::KmsgEntry;
use crate::error::KmsgError;
use regex::Regex;
use std::sync::OnceLock;

static OOM_PATTERN: OnceLock<Regex> = OnceLock::new();
static PID_PATTERN: OnceLock<Regex> = OnceLock::new();

fn oom_pattern() -> &'static Regex {
    OOM_PATTERN.get_or_init(|| Regex::new(r"(?i)out of memory:").expect("OOM regex"))
}

fn pid_pattern() -> &'static Regex {
    PID_PATTERN.get_or_init(|| Regex::new(r"\bkilled process (\d+)\b").expect("PID regex"))
}

/// True if the message reports an OOM kill ("out of memory:", any case, anywhere).
pub fn is_oom_kill(entry: &KmsgEntry) -> bool {
    oom_pattern().is_match(&entry.message)
}

/// Pull the victim PID out of "Killed process <pid> (...)".
pub fn extract_pid(message: &str) -> Result<u32, KmsgError> {
    let lowered = message.to_lowercase();
    let digits = pid_pattern()
        .captures(&lowered)
        .and_then(|caps| caps.get(1))
        .ok_or(KmsgError::NoPidFound)?
        .as_str();

    digits.parse::<u32>().map_err(|_| KmsgError::PidOverflow {
        digits: digits.to_string(),
    })
}
