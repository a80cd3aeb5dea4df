//! kmsg record format: `priority,sequence,timestamp[,flags...];message`.

use super::KmsgEntry;
use crate::error::KmsgError;

fn parse_field<T: std::str::FromStr<Err = std::num::ParseIntError>>(
    field: &'static str,
    value: &str,
) -> Result<T, KmsgError> {
    value.parse().map_err(|source| KmsgError::InvalidField {
        field,
        value: value.to_string(),
        source,
    })
}

/// Parse one kmsg line. The message is everything after the first `;`, untouched.
pub fn parse_line(line: &str) -> Result<KmsgEntry, KmsgError> {
    let (header, message) = line.split_once(';').ok_or(KmsgError::MalformedEntry {
        reason: "missing ';' separator",
    })?;

    let fields: Vec<&str> = header.split(',').collect();
    if fields.len() < 3 {
        return Err(KmsgError::MalformedEntry {
            reason: "fewer than 3 header fields",
        });
    }

    let priority = parse_field("priority", fields[0])?;
    let sequence = parse_field("sequence", fields[1])?;
    // Trailing flags (`-`, `c`, ...) land in fields[3..] and are ignored.
    let timestamp = parse_field("timestamp", fields[2])?;

    Ok(KmsgEntry {
        priority,
        sequence,
        timestamp,
        message: message.to_string(),
    })
}
