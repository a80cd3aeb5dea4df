//! Downstream delivery of detected OOM events.

mod dispatch;
mod slack;

pub use dispatch::dispatch;
pub use slack::{build_payload, format_event_time, SlackAttachment, SlackField, SlackNotifier, SlackPayload};
