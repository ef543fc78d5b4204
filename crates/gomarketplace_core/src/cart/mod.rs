//! Cart state container and its consumer-facing handle.
//!
//! # Responsibility
//! - `store`: pure mutation logic over the live snapshot.
//! - `handle`: wires the store to persistence and observers.
//! - `provider`: owns the single mounted cart for one consumer tree.
//!
//! # Invariants
//! - A `Cart` only exists after its persisted snapshot finished loading, so
//!   mutations can never race the startup load.

pub mod handle;
pub mod provider;
pub mod store;
