//! Cart runtime configuration.
//!
//! # Responsibility
//! - Resolve where the cart database lives and which key holds the cart.
//!
//! # Invariants
//! - `storage_key` is never empty and carries no surrounding whitespace.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Namespaced key under which the cart's product list is stored.
pub const STORAGE_KEY: &str = "@GoMarketplace:products";
/// Environment override for the cart database location.
pub const DB_PATH_ENV: &str = "GOMARKETPLACE_DB_PATH";
const DEFAULT_DB_FILE_NAME: &str = "gomarketplace_cart.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidStorageKey(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidStorageKey(key) => write!(f, "invalid storage key `{key}`"),
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    pub db_path: PathBuf,
    pub storage_key: String,
}

impl CartConfig {
    /// Uses `db_path` with the default storage key.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            storage_key: STORAGE_KEY.to_string(),
        }
    }

    /// Resolves the database path from `GOMARKETPLACE_DB_PATH`, falling back
    /// to a file in the system temp directory.
    pub fn from_env() -> Self {
        Self::new(resolve_db_path(std::env::var(DB_PATH_ENV).ok()))
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() || key.trim() != key {
            return Err(ConfigError::InvalidStorageKey(key));
        }
        self.storage_key = key;
        Ok(self)
    }
}

fn resolve_db_path(raw: Option<String>) -> PathBuf {
    raw.as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map_or_else(
            || std::env::temp_dir().join(DEFAULT_DB_FILE_NAME),
            PathBuf::from,
        )
}
