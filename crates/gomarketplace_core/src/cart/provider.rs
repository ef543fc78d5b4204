//! Explicit owner of the one mounted cart.
//!
//! # Responsibility
//! - Mount the cart (load persisted state) before any consumer can reach it.
//! - Hand out scoped access to the mounted `Cart`.
//!
//! # Invariants
//! - At most one cart is mounted at a time.
//! - Access before `mount` (or after `unmount`) is a usage error.
//! - Mounting holds the provider lock, so consumers wait for the load.

use crate::cart::handle::Cart;
use crate::config::CartConfig;
use crate::db::DbError;
use crate::storage::sqlite::SqliteKeyValueStore;
use crate::storage::KeyValueStore;
use crate::sync::{LoadOutcome, SyncError};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard};

/// Programmer errors when reaching the cart outside its valid scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartUsageError {
    NotMounted,
    AlreadyMounted,
    /// A consumer panicked while holding the cart.
    Poisoned,
}

impl Display for CartUsageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotMounted => write!(f, "cart must be used within a mounted CartProvider"),
            Self::AlreadyMounted => write!(f, "CartProvider is already mounted"),
            Self::Poisoned => write!(f, "CartProvider lock is poisoned"),
        }
    }
}

impl Error for CartUsageError {}

#[derive(Debug)]
pub enum MountError {
    Usage(CartUsageError),
    Db(DbError),
    Sync(SyncError),
}

impl Display for MountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Usage(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "cart storage open failed: {err}"),
            Self::Sync(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Usage(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Sync(err) => Some(err),
        }
    }
}

impl From<CartUsageError> for MountError {
    fn from(value: CartUsageError) -> Self {
        Self::Usage(value)
    }
}

impl From<DbError> for MountError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<SyncError> for MountError {
    fn from(value: SyncError) -> Self {
        Self::Sync(value)
    }
}

/// Scope owner for the app's cart.
#[derive(Default)]
pub struct CartProvider {
    slot: Mutex<Option<Cart>>,
}

impl CartProvider {
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    /// Opens the SQLite store at `config.db_path` and mounts the cart.
    pub fn mount(&self, config: &CartConfig) -> Result<LoadOutcome, MountError> {
        let mut slot = self.lock()?;
        if slot.is_some() {
            return Err(CartUsageError::AlreadyMounted.into());
        }
        let storage = SqliteKeyValueStore::open(&config.db_path)?;
        Self::install(&mut slot, Arc::new(storage), &config.storage_key)
    }

    /// Mounts the cart over an arbitrary storage backend.
    pub fn mount_with_storage(
        &self,
        storage: Arc<dyn KeyValueStore>,
        key: &str,
    ) -> Result<LoadOutcome, MountError> {
        let mut slot = self.lock()?;
        if slot.is_some() {
            return Err(CartUsageError::AlreadyMounted.into());
        }
        Self::install(&mut slot, storage, key)
    }

    /// Drops the mounted cart. Its writer drains pending snapshots before
    /// the thread exits.
    ///
    /// Also the way out after a consumer panicked inside `with_cart`: the
    /// poisoned cart is discarded and the provider can be mounted again.
    ///
    /// Returns whether a cart was mounted.
    pub fn unmount(&self) -> Result<bool, CartUsageError> {
        let cart = match self.slot.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => {
                let cart = poisoned.into_inner().take();
                self.slot.clear_poison();
                warn!("event=cart_unmount module=cart status=recovered error_code=lock_poisoned");
                cart
            }
        };
        let Some(cart) = cart else {
            return Ok(false);
        };
        drop(cart);
        info!("event=cart_unmount module=cart status=ok");
        Ok(true)
    }

    pub fn is_mounted(&self) -> bool {
        self.lock().is_ok_and(|slot| slot.is_some())
    }

    /// Runs `f` against the mounted cart.
    ///
    /// # Errors
    /// - `NotMounted` when called outside the mounted scope.
    /// - `Poisoned` after an earlier `f` panicked, until `unmount` is called.
    pub fn with_cart<T>(&self, f: impl FnOnce(&mut Cart) -> T) -> Result<T, CartUsageError> {
        let mut slot = self.lock()?;
        let cart = slot.as_mut().ok_or(CartUsageError::NotMounted)?;
        Ok(f(cart))
    }

    fn install(
        slot: &mut Option<Cart>,
        storage: Arc<dyn KeyValueStore>,
        key: &str,
    ) -> Result<LoadOutcome, MountError> {
        let cart = Cart::open(storage, key)?;
        let outcome = cart.load_outcome().clone();
        *slot = Some(cart);
        info!("event=cart_mount module=cart status=ok");
        Ok(outcome)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Cart>>, CartUsageError> {
        self.slot.lock().map_err(|_| CartUsageError::Poisoned)
    }
}
