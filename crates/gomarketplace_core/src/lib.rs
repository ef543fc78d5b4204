//! Core cart logic for the GoMarketplace storefront app.
//! This crate owns the cart invariants and their persistence.

pub mod cart;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod storage;
pub mod sync;

pub use cart::handle::{Cart, CartObserver};
pub use cart::provider::{CartProvider, CartUsageError, MountError};
pub use cart::store::CartStore;
pub use config::{CartConfig, ConfigError, STORAGE_KEY};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::line_item::{LineItem, LineItemValidationError, NewLineItem, ProductId};
pub use model::snapshot::CartSnapshot;
pub use storage::memory::MemoryKeyValueStore;
pub use storage::sqlite::SqliteKeyValueStore;
pub use storage::{KeyValueStore, StorageError, StorageResult};
pub use sync::codec::{decode_snapshot, encode_snapshot, CodecError};
pub use sync::{LoadOutcome, PersistenceSync, SaveDecision, SyncError, SyncState};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
