//! Background snapshot writer.
//!
//! # Responsibility
//! - Perform storage writes off the caller thread (fire-and-forget).
//! - Apply writes for the cart key strictly in enqueue order.
//!
//! # Invariants
//! - Snapshots superseded while queued are coalesced; only the newest lands.
//! - Write failures are logged and dropped, never retried.

use crate::model::snapshot::CartSnapshot;
use crate::storage::KeyValueStore;
use crate::sync::codec::encode_snapshot;
use crossbeam::channel::{Receiver, Sender};
use log::{debug, warn};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

enum WriteCommand {
    Save(CartSnapshot),
    Flush(Sender<()>),
    Shutdown,
}

pub(crate) struct SnapshotWriter {
    tx: Sender<WriteCommand>,
    handle: Option<JoinHandle<()>>,
}

impl SnapshotWriter {
    pub(crate) fn start(storage: Arc<dyn KeyValueStore>, key: String) -> std::io::Result<Self> {
        let (tx, rx) = crossbeam::channel::unbounded();
        let handle = thread::Builder::new()
            .name("cart-writer".to_string())
            .spawn(move || run_writer_loop(storage.as_ref(), &key, &rx))?;
        Ok(Self {
            tx,
            handle: Some(handle),
        })
    }

    /// Queues `snapshot` for writing. Returns `false` when the writer is gone.
    pub(crate) fn enqueue(&self, snapshot: CartSnapshot) -> bool {
        self.tx.send(WriteCommand::Save(snapshot)).is_ok()
    }

    /// Blocks until every snapshot queued before this call was handled.
    pub(crate) fn flush(&self) -> bool {
        let (ack_tx, ack_rx) = crossbeam::channel::bounded(1);
        if self.tx.send(WriteCommand::Flush(ack_tx)).is_err() {
            return false;
        }
        ack_rx.recv().is_ok()
    }
}

impl Drop for SnapshotWriter {
    fn drop(&mut self) {
        let _ = self.tx.send(WriteCommand::Shutdown);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("event=cart_writer_stop module=sync status=error error_code=writer_panicked");
            }
        }
    }
}

fn run_writer_loop(storage: &dyn KeyValueStore, key: &str, rx: &Receiver<WriteCommand>) {
    let mut deferred: Option<WriteCommand> = None;
    loop {
        let command = match deferred.take() {
            Some(command) => command,
            None => match rx.recv() {
                Ok(command) => command,
                Err(_) => break,
            },
        };

        match command {
            WriteCommand::Save(mut snapshot) => {
                let mut superseded = 0_usize;
                while let Ok(next) = rx.try_recv() {
                    match next {
                        WriteCommand::Save(newer) => {
                            snapshot = newer;
                            superseded += 1;
                        }
                        other => {
                            deferred = Some(other);
                            break;
                        }
                    }
                }
                write_snapshot(storage, key, &snapshot, superseded);
            }
            WriteCommand::Flush(ack) => {
                let _ = ack.send(());
            }
            WriteCommand::Shutdown => break,
        }
    }
}

fn write_snapshot(
    storage: &dyn KeyValueStore,
    key: &str,
    snapshot: &CartSnapshot,
    superseded: usize,
) {
    let started_at = Instant::now();
    let encoded = match encode_snapshot(snapshot) {
        Ok(encoded) => encoded,
        Err(err) => {
            warn!(
                "event=cart_save module=sync status=error items={} error_code=encode_failed error={}",
                snapshot.len(),
                err
            );
            return;
        }
    };

    match storage.set_item(key, &encoded) {
        Ok(()) => debug!(
            "event=cart_save module=sync status=ok items={} bytes={} superseded={} duration_ms={}",
            snapshot.len(),
            encoded.len(),
            superseded,
            started_at.elapsed().as_millis()
        ),
        Err(err) => warn!(
            "event=cart_save module=sync status=error items={} duration_ms={} error_code=write_failed error={}",
            snapshot.len(),
            started_at.elapsed().as_millis(),
            err
        ),
    }
}
