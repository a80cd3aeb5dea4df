//! Slack incoming-webhook delivery for OOM events.

use crate::config::SlackConfig;
use crate::error::NotifyError;
use crate::monitor::OomEvent;
use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize, PartialEq)]
pub struct SlackField {
    pub title: String,
    pub value: String,
    pub short: bool,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct SlackAttachment {
    pub color: String,
    pub title: String,
    pub fields: Vec<SlackField>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct SlackPayload {
    pub channel: String,
    pub text: String,
    pub username: String,
    pub icon_emoji: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<SlackAttachment>,
}

fn field(title: &str, value: &str, short: bool) -> SlackField {
    SlackField {
        title: title.to_string(),
        value: value.to_string(),
        short,
    }
}

/// `YYYY-MM-DD HH:MM:SS <label>` in the configured offset (UTC if the offset is invalid).
pub fn format_event_time(ms: i64, utc_offset_minutes: i32, label: &str) -> String {
    let offset = FixedOffset::east_opt(utc_offset_minutes.saturating_mul(60))
        .unwrap_or_else(|| Utc.fix());
    let utc: DateTime<Utc> = Utc.timestamp_millis_opt(ms).single().unwrap_or_else(Utc::now);
    format!("{} {}", utc.with_timezone(&offset).format("%Y-%m-%d %H:%M:%S"), label)
}

pub fn build_payload(config: &SlackConfig, event: &OomEvent) -> SlackPayload {
    let time = format_event_time(
        event.event_time_millis,
        config.utc_offset_minutes,
        &config.timezone_label,
    );
    let attachment = SlackAttachment {
        color: "danger".to_string(),
        title: "🚨 Out of Memory (OOM) Event Detected".to_string(),
        fields: vec![
            field("Process Command", &event.cmdline, false),
            field("Process ID", &event.pid, true),
            field("Hostname", &event.hostname, true),
            field("Kernel Version", &event.kernel_version, true),
            field(&format!("Time ({})", config.timezone_label), &time, true),
        ],
    };
    SlackPayload {
        channel: config.channel.clone(),
        text: "OOM Killer Alert".to_string(),
        username: config.username.clone(),
        icon_emoji: config.icon_emoji.clone(),
        attachments: vec![attachment],
    }
}

pub struct SlackNotifier {
    config: SlackConfig,
    client: reqwest::Client,
    webhook_url: String,
}

impl SlackNotifier {
    /// `Ok(None)` when no webhook is configured.
    pub fn new(config: SlackConfig) -> Result<Option<Self>, NotifyError> {
        let Some(webhook_url) = config.webhook_url.clone() else {
            return Ok(None);
        };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(NotifyError::Client)?;
        Ok(Some(Self {
            config,
            client,
            webhook_url,
        }))
    }

    pub fn channel(&self) -> &str {
        &self.config.channel
    }

    pub async fn notify(&self, event: &OomEvent) -> Result<(), NotifyError> {
        let payload = build_payload(&self.config, event);
        debug!(pid = %event.pid, channel = %self.config.channel, "sending slack notification");
        let res = self.client.post(&self.webhook_url).json(&payload).send().await?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let body = res.text().await.unwrap_or_default();
            return Err(NotifyError::Status { status, body });
        }
        Ok(())
    }
}
