//! Persistence bridge between the cart store and device storage.
//!
//! # Responsibility
//! - Load the persisted snapshot once at startup.
//! - Hand every changed snapshot to the background writer.
//!
//! # Invariants
//! - State only moves forward: `Uninitialized -> Loading -> Ready`.
//! - Empty snapshots are never written, so a not-yet-loaded cart cannot
//!   clobber a saved one.
//! - Load failures recover to an empty cart; the stored value is left as is.

use crate::model::snapshot::CartSnapshot;
use crate::storage::KeyValueStore;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

pub mod codec;
mod writer;

use codec::decode_snapshot;
use writer::SnapshotWriter;

/// Lifecycle of the persistence bridge within one app session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Uninitialized,
    Loading,
    Ready,
}

/// What the startup load found in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing stored under the cart key.
    Empty,
    /// A stored snapshot was decoded and installed.
    Restored { items: usize },
    /// Reading or decoding failed; the cart starts empty.
    Recovered { reason: String },
}

/// Result of offering a changed snapshot to the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveDecision {
    Queued,
    SkippedEmpty,
    SkippedNotReady,
    WriterUnavailable,
}

#[derive(Debug)]
pub enum SyncError {
    AlreadyInitialized,
    WriterSpawn(std::io::Error),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyInitialized => write!(f, "cart persistence is already initialized"),
            Self::WriterSpawn(err) => write!(f, "failed to start cart writer thread: {err}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::AlreadyInitialized => None,
            Self::WriterSpawn(err) => Some(err),
        }
    }
}

/// Keeps storage eventually consistent with the live cart snapshot.
pub struct PersistenceSync {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    state: SyncState,
    writer: Option<SnapshotWriter>,
}

impl PersistenceSync {
    pub fn new(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
            state: SyncState::Uninitialized,
            writer: None,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn storage_key(&self) -> &str {
        &self.key
    }

    /// Loads the persisted snapshot and starts the writer.
    ///
    /// Runs once. Returns the snapshot to install in the cart store together
    /// with a description of what was found.
    ///
    /// # Errors
    /// - `AlreadyInitialized` on a second call.
    /// - `WriterSpawn` when the writer thread cannot be started; the state
    ///   then stays `Loading`.
    pub fn initialize(&mut self) -> Result<(CartSnapshot, LoadOutcome), SyncError> {
        if self.state != SyncState::Uninitialized {
            return Err(SyncError::AlreadyInitialized);
        }
        self.state = SyncState::Loading;
        let started_at = Instant::now();
        info!("event=cart_load module=sync status=start");

        let (snapshot, outcome) = self.load();

        let writer = SnapshotWriter::start(Arc::clone(&self.storage), self.key.clone())
            .map_err(SyncError::WriterSpawn)?;
        self.writer = Some(writer);
        self.state = SyncState::Ready;

        info!(
            "event=cart_load module=sync status=ok outcome={} items={} duration_ms={}",
            outcome_label(&outcome),
            snapshot.len(),
            started_at.elapsed().as_millis()
        );
        Ok((snapshot, outcome))
    }

    /// Save trigger, invoked after every observed snapshot change.
    ///
    /// Never blocks on storage and never reports write failures.
    pub fn snapshot_changed(&self, snapshot: &CartSnapshot) -> SaveDecision {
        if self.state != SyncState::Ready {
            warn!("event=cart_save module=sync status=skipped reason=not_ready");
            return SaveDecision::SkippedNotReady;
        }
        if snapshot.is_empty() {
            return SaveDecision::SkippedEmpty;
        }
        match &self.writer {
            Some(writer) if writer.enqueue(snapshot.clone()) => SaveDecision::Queued,
            _ => {
                warn!("event=cart_save module=sync status=error error_code=writer_unavailable");
                SaveDecision::WriterUnavailable
            }
        }
    }

    /// Waits for queued writes to reach storage. Returns `false` before
    /// initialization or when the writer has stopped.
    pub fn flush(&self) -> bool {
        self.writer.as_ref().is_some_and(SnapshotWriter::flush)
    }

    fn load(&self) -> (CartSnapshot, LoadOutcome) {
        let raw = match self.storage.get_item(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return (CartSnapshot::empty(), LoadOutcome::Empty),
            Err(err) => {
                warn!(
                    "event=cart_load module=sync status=recovered error_code=read_failed error={}",
                    err
                );
                return recovered(err.to_string());
            }
        };

        match decode_snapshot(&raw) {
            Ok(snapshot) => {
                let items = snapshot.len();
                (snapshot, LoadOutcome::Restored { items })
            }
            Err(err) => {
                warn!(
                    "event=cart_load module=sync status=recovered error_code=decode_failed bytes={} error={}",
                    raw.len(),
                    err
                );
                recovered(err.to_string())
            }
        }
    }
}

fn recovered(reason: String) -> (CartSnapshot, LoadOutcome) {
    (CartSnapshot::empty(), LoadOutcome::Recovered { reason })
}

fn outcome_label(outcome: &LoadOutcome) -> &'static str {
    match outcome {
        LoadOutcome::Empty => "empty",
        LoadOutcome::Restored { .. } => "restored",
        LoadOutcome::Recovered { .. } => "recovered",
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadOutcome, PersistenceSync, SaveDecision, SyncError, SyncState};
    use crate::model::line_item::{LineItem, NewLineItem};
    use crate::model::snapshot::CartSnapshot;
    use crate::storage::memory::MemoryKeyValueStore;
    use crate::storage::KeyValueStore;
    use std::sync::Arc;

    const KEY: &str = "@Test:products";
    const SAVED: &str = r#"[{"id":"a","title":"T","image_url":"u","price":10,"quantity":2}]"#;

    fn one_item() -> CartSnapshot {
        CartSnapshot::from_items(vec![LineItem::first_unit(NewLineItem::new(
            "a", "T", "u", 10.0,
        ))])
    }

    #[test]
    fn state_moves_to_ready_after_empty_load() {
        let mut sync = PersistenceSync::new(Arc::new(MemoryKeyValueStore::new()), KEY);
        assert_eq!(sync.state(), SyncState::Uninitialized);

        let (snapshot, outcome) = sync.initialize().unwrap();

        assert!(snapshot.is_empty());
        assert_eq!(outcome, LoadOutcome::Empty);
        assert_eq!(sync.state(), SyncState::Ready);
    }

    #[test]
    fn second_initialize_is_rejected() {
        let mut sync = PersistenceSync::new(Arc::new(MemoryKeyValueStore::new()), KEY);
        sync.initialize().unwrap();
        assert!(matches!(
            sync.initialize(),
            Err(SyncError::AlreadyInitialized)
        ));
    }

    #[test]
    fn save_before_ready_is_skipped() {
        let store = MemoryKeyValueStore::new();
        let sync = PersistenceSync::new(Arc::new(store.clone()), KEY);

        assert_eq!(
            sync.snapshot_changed(&one_item()),
            SaveDecision::SkippedNotReady
        );
        assert!(!sync.flush());
        assert_eq!(store.write_count(), 0);
    }

    #[test]
    fn empty_snapshot_is_never_written() {
        let store = MemoryKeyValueStore::with_item(KEY, SAVED);
        let mut sync = PersistenceSync::new(Arc::new(store.clone()), KEY);
        sync.initialize().unwrap();

        assert_eq!(
            sync.snapshot_changed(&CartSnapshot::empty()),
            SaveDecision::SkippedEmpty
        );
        assert!(sync.flush());
        assert_eq!(store.write_count(), 0);
        assert!(store.get_item(KEY).unwrap().is_some());
    }

    #[test]
    fn corrupt_payload_recovers_to_empty_and_keeps_stored_value() {
        let store = MemoryKeyValueStore::with_item(KEY, "not json");
        let mut sync = PersistenceSync::new(Arc::new(store.clone()), KEY);

        let (snapshot, outcome) = sync.initialize().unwrap();

        assert!(snapshot.is_empty());
        assert!(matches!(outcome, LoadOutcome::Recovered { .. }));
        assert_eq!(store.get_item(KEY).unwrap().as_deref(), Some("not json"));
    }

    #[test]
    fn queued_snapshot_lands_after_flush() {
        let store = MemoryKeyValueStore::new();
        let mut sync = PersistenceSync::new(Arc::new(store.clone()), KEY);
        sync.initialize().unwrap();

        assert_eq!(sync.snapshot_changed(&one_item()), SaveDecision::Queued);
        assert!(sync.flush());

        let raw = store.get_item(KEY).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json[0]["id"], "a");
        assert_eq!(json[0]["image_url"], "u");
        assert_eq!(json[0]["quantity"], 1);
    }
}
