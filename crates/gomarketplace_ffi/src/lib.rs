//! Flutter-facing bindings for the cart core.

pub mod api;
