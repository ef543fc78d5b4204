//! Cart domain model.
//!
//! # Responsibility
//! - Define the line item record shared by the store, codec and FFI layers.
//! - Provide the immutable snapshot type handed between store and sync.
//!
//! # Invariants
//! - Every line item is identified by a stable, caller-supplied `ProductId`.
//! - A snapshot never contains two items with the same `id`.

pub mod line_item;
pub mod snapshot;
