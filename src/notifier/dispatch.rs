//! Delivery loop between the detection task and a notifier.

use crate::monitor::OomEvent;
use std::future::Future;
use tokio::sync::{mpsc, watch};
use tracing::info;

/// Hand every event to `deliver` until the detection side hangs up.
///
/// A shutdown signal does not cut delivery short: events already queued (and any the
/// detection task emits while it winds down) are still delivered, and the loop ends
/// once every sender is gone.
pub async fn dispatch<F, Fut>(
    mut events: mpsc::Receiver<OomEvent>,
    mut shutdown: watch::Receiver<bool>,
    mut deliver: F,
) -> usize
where
    F: FnMut(OomEvent) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut delivered = 0;
    let mut stopping = *shutdown.borrow();
    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(event) => {
                    deliver(event).await;
                    delivered += 1;
                }
                None => break,
            },
            changed = shutdown.changed(), if !stopping => {
                stopping = true;
                if changed.is_ok() {
                    info!("shutdown requested; draining queued events");
                }
            }
        }
    }
    info!(delivered, "event delivery finished");
    delivered
}
