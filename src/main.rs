//! oom-notifier entrypoint: watches kmsg until Ctrl+C / SIGTERM and delivers each
//! detected OOM kill to Slack (or just logs it when no webhook is configured).

use oom_notifier::{
    config::NotifierConfig,
    logging::StructuredLogger,
    monitor::{OomEvent, OomMonitor},
    notifier::{dispatch, SlackNotifier},
};
use tokio::sync::{mpsc, watch};
use tracing::{error, info, warn};

async fn deliver(notifier: Option<&SlackNotifier>, event: OomEvent) {
    let Some(slack) = notifier else {
        info!(
            pid = %event.pid,
            cmdline = %event.cmdline,
            hostname = %event.hostname,
            kernel = %event.kernel_version,
            time_ms = event.event_time_millis,
            "OOM event (no webhook configured)"
        );
        return;
    };
    match slack.notify(&event).await {
        Ok(()) => info!(pid = %event.pid, channel = %slack.channel(), "slack notification sent"),
        Err(e) => warn!(pid = %event.pid, error = %e, "failed to send slack notification"),
    }
}

async fn run(config: NotifierConfig) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let monitor = OomMonitor::new(&config.kmsg_path, &config.proc_dir).map_err(|e| {
        error!(error = %e, "failed to create OOM monitor");
        e
    })?;
    let notifier = match SlackNotifier::new(config.slack.clone()) {
        Ok(Some(notifier)) => Some(notifier),
        Ok(None) => {
            warn!("no slack webhook configured; OOM events will only be logged");
            None
        }
        Err(e) => {
            warn!(error = %e, "slack notifier unavailable; OOM events will only be logged");
            None
        }
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    ctrlc::set_handler(move || {
        let _ = shutdown_tx.send(true);
    })?;

    let refresh = monitor.spawn_cache_refresh(config.monitor.refresh_interval(), shutdown_rx.clone());
    let (event_tx, event_rx) = mpsc::channel(config.monitor.event_buffer);
    let detection = tokio::spawn(monitor.run(
        config.monitor.check_interval(),
        event_tx,
        shutdown_rx.clone(),
    ));

    info!("oom-notifier started");
    let slack = notifier.as_ref();
    dispatch(event_rx, shutdown_rx, move |event| deliver(slack, event)).await;

    let _ = detection.await;
    let _ = refresh.await;
    info!("oom-notifier stopped");
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config_path = std::env::var("OOM_NOTIFIER_CONFIG_PATH")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| std::path::PathBuf::from("config.json"));
    let (config, load_error) = match NotifierConfig::load(&config_path) {
        Ok(config) => (config, None),
        Err(e) => (NotifierConfig::default(), Some(e)),
    };
    let config = config.with_env_overrides();

    StructuredLogger::init(config.log.json, &config.log.level);
    if let Some(e) = load_error {
        warn!(error = %e, "config unreadable; using defaults");
    }
    config.validate()?;

    info!(
        proc_dir = %config.proc_dir.display(),
        kmsg = %config.kmsg_path.display(),
        check_interval_secs = config.monitor.check_interval_secs,
        refresh_interval_secs = config.monitor.refresh_interval_secs,
        channel = %config.slack.channel,
        "oom-notifier starting"
    );

    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;
    runtime.block_on(run(config))
}
