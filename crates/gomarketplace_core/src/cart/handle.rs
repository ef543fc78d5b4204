//! Cart handle: store + persistence + observers.
//!
//! # Invariants
//! - Observers and the persistence bridge run synchronously after each
//!   successful mutation, and only then.
//! - No-op mutations notify nobody.

use crate::cart::store::CartStore;
use crate::model::line_item::NewLineItem;
use crate::model::snapshot::CartSnapshot;
use crate::storage::KeyValueStore;
use crate::sync::{LoadOutcome, PersistenceSync, SyncError, SyncState};
use log::debug;
use std::sync::Arc;

/// Post-mutation callback.
pub trait CartObserver: Send {
    fn snapshot_changed(&self, snapshot: &CartSnapshot);
}

impl<F> CartObserver for F
where
    F: Fn(&CartSnapshot) + Send,
{
    fn snapshot_changed(&self, snapshot: &CartSnapshot) {
        self(snapshot)
    }
}

/// Consumer-facing cart capability.
pub struct Cart {
    store: CartStore,
    sync: PersistenceSync,
    observers: Vec<Box<dyn CartObserver>>,
    load_outcome: LoadOutcome,
}

impl Cart {
    /// Loads the persisted cart under `key` and returns a ready handle.
    pub fn open(
        storage: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
    ) -> Result<Self, SyncError> {
        let mut sync = PersistenceSync::new(storage, key);
        let (snapshot, load_outcome) = sync.initialize()?;
        Ok(Self {
            store: CartStore::with_snapshot(snapshot),
            sync,
            observers: Vec::new(),
            load_outcome,
        })
    }

    /// Current line items in insertion order.
    pub fn products(&self) -> &CartSnapshot {
        self.store.products()
    }

    pub fn add_to_cart(&mut self, product: NewLineItem) -> bool {
        let id = product.id.clone();
        let changed = self.store.add_to_cart(product);
        self.after_mutation("add", &id, changed)
    }

    pub fn increment(&mut self, id: &str) -> bool {
        let changed = self.store.increment(id);
        self.after_mutation("increment", id, changed)
    }

    pub fn decrement(&mut self, id: &str) -> bool {
        let changed = self.store.decrement(id);
        self.after_mutation("decrement", id, changed)
    }

    /// Registers a callback run after every successful mutation.
    pub fn subscribe(&mut self, observer: impl CartObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn load_outcome(&self) -> &LoadOutcome {
        &self.load_outcome
    }

    pub fn sync_state(&self) -> SyncState {
        self.sync.state()
    }

    /// Blocks until queued writes reached storage.
    pub fn flush(&self) -> bool {
        self.sync.flush()
    }

    fn after_mutation(&self, op: &'static str, id: &str, changed: bool) -> bool {
        debug!(
            "event=cart_mutation module=cart op={op} id={id} changed={changed} items={}",
            self.store.products().len()
        );
        if !changed {
            return false;
        }

        let snapshot = self.store.products();
        self.sync.snapshot_changed(snapshot);
        for observer in &self.observers {
            observer.snapshot_changed(snapshot);
        }
        true
    }
}
