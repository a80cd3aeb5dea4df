//! Background kmsg ingestion: a dedicated thread reads records one at a time and
//! pushes parsed entries into a bounded queue that the monitor drains on its own schedule.

use super::{parse_line, KmsgEntry};
use crate::error::KmsgError;
use std::fs::File;
use std::io::{BufRead, BufReader, ErrorKind, Seek, SeekFrom};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Entries buffered between the ingestion thread and `drain_available`.
pub const QUEUE_CAPACITY: usize = 100;

pub struct KmsgReader {
    rx: mpsc::Receiver<KmsgEntry>,
    stop: Arc<AtomicBool>,
    worker: JoinHandle<()>,
}

impl KmsgReader {
    /// Open the kernel message device and skip its backlog by seeking to the end.
    pub fn open(path: &Path) -> Result<Self, KmsgError> {
        let mut file = File::open(path).map_err(|source| KmsgError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        file.seek(SeekFrom::End(0)).map_err(|source| KmsgError::Seek {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "kmsg reader opened");
        Self::from_reader(BufReader::new(file))
    }

    /// Start ingesting from an already-positioned line source.
    pub fn from_reader<R>(source: R) -> Result<Self, KmsgError>
    where
        R: BufRead + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(QUEUE_CAPACITY);
        let stop = Arc::new(AtomicBool::new(false));
        let worker = std::thread::Builder::new()
            .name("kmsg-reader".to_string())
            .spawn({
                let stop = stop.clone();
                move || ingest(source, tx, stop)
            })
            .map_err(KmsgError::Spawn)?;

        Ok(Self { rx, stop, worker })
    }

    /// Everything queued since the last drain; never waits for new records.
    pub fn drain_available(&mut self) -> Vec<KmsgEntry> {
        let mut out = Vec::new();
        while let Ok(entry) = self.rx.try_recv() {
            out.push(entry);
        }
        out
    }

    /// Whether the ingestion thread is still running.
    pub fn is_running(&self) -> bool {
        !self.worker.is_finished()
    }

    /// Stop ingestion. The thread exits at its next record (or immediately if it is
    /// blocked on a full queue) and drops the stream handle on the way out.
    /// Entries already queued can still be drained.
    pub fn close(&mut self) {
        if self.stop.swap(true, Ordering::Relaxed) {
            return;
        }
        self.rx.close();
        // Not joined: the thread may be parked in a blocking read on the device.
        debug!("kmsg reader closed");
    }
}

impl Drop for KmsgReader {
    fn drop(&mut self) {
        self.close();
    }
}

fn ingest<R: BufRead>(mut source: R, tx: mpsc::Sender<KmsgEntry>, stop: Arc<AtomicBool>) {
    let mut buf = Vec::with_capacity(1024);
    while !stop.load(Ordering::Relaxed) {
        buf.clear();
        match source.read_until(b'\n', &mut buf) {
            Ok(0) => {
                info!("kmsg stream ended");
                break;
            }
            Ok(_) => {}
            // The ring buffer overwrote records we had not read yet; carry on from the next one.
            Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                warn!("kmsg records overwritten before read");
                continue;
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                warn!(error = %e, "kmsg read failed; stopping ingestion");
                break;
            }
        }

        let line = String::from_utf8_lossy(&buf);
        let line = line.trim_end_matches(['\n', '\r']);
        if line.is_empty() {
            continue;
        }
        let entry = match parse_line(line) {
            Ok(entry) => entry,
            Err(e) => {
                debug!(error = %e, line, "failed to parse kmsg line");
                continue;
            }
        };

        // Blocks while the queue is full; fails only once the reader is closed.
        if tx.blocking_send(entry).is_err() {
            break;
        }
    }
    debug!("kmsg ingestion thread exiting");
}
