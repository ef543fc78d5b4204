//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose the cart capability (`products`, add, increment, decrement) to
//!   Dart via FRB.
//! - Own the process-wide `CartProvider` the app mounts once at startup.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Cart calls before `cart_mount` return the provider usage error message.

use gomarketplace_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    CartConfig, CartProvider, CartSnapshot, LineItem, LoadOutcome, NewLineItem,
};
use log::warn;

static CART: CartProvider = CartProvider::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// One cart line as rendered by the Flutter cart screen.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItemView {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub price: f64,
    pub quantity: u32,
}

/// Envelope returned by every cart call.
#[derive(Debug, Clone, PartialEq)]
pub struct CartResponse {
    /// Whether the call reached a mounted cart.
    pub ok: bool,
    /// Cart contents after the call, in insertion order.
    pub items: Vec<CartItemView>,
    /// Whether the call changed the cart.
    pub changed: bool,
    /// Human-readable diagnostics.
    pub message: String,
}

impl CartResponse {
    fn from_snapshot(snapshot: &CartSnapshot, changed: bool, message: impl Into<String>) -> Self {
        Self {
            ok: true,
            items: snapshot.iter().map(to_item_view).collect(),
            changed,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            changed: false,
            message: message.into(),
        }
    }
}

/// Loads the persisted cart and makes it available to the other cart calls.
///
/// `db_path` overrides the configured database location; `None` resolves it
/// from `GOMARKETPLACE_DB_PATH` or the temp directory.
///
/// # FFI contract
/// - Async from Dart; await it before rendering cart screens.
/// - A second mount without `cart_unmount` fails with a usage message.
pub fn cart_mount(db_path: Option<String>) -> CartResponse {
    let config = match db_path.as_deref().map(str::trim) {
        Some(path) if !path.is_empty() => CartConfig::new(path),
        _ => CartConfig::from_env(),
    };

    let outcome = match CART.mount(&config) {
        Ok(outcome) => outcome,
        Err(err) => return CartResponse::failure(format!("cart_mount failed: {err}")),
    };
    let message = match &outcome {
        LoadOutcome::Empty => "No saved cart.".to_string(),
        LoadOutcome::Restored { items } => format!("Restored {items} item(s)."),
        LoadOutcome::Recovered { reason } => {
            warn!("event=ffi_cart_mount module=ffi status=recovered");
            format!("Saved cart was unreadable and was reset: {reason}")
        }
    };
    with_cart(|cart| CartResponse::from_snapshot(cart.products(), false, message))
}

/// Drops the mounted cart after pending writes were stored.
pub fn cart_unmount() -> bool {
    CART.unmount().unwrap_or(false)
}

#[flutter_rust_bridge::frb(sync)]
pub fn cart_products() -> CartResponse {
    with_cart(|cart| CartResponse::from_snapshot(cart.products(), false, "ok"))
}

/// Adds one unit of a product; existing entries are left unchanged.
#[flutter_rust_bridge::frb(sync)]
pub fn cart_add(id: String, title: String, image_url: String, price: f64) -> CartResponse {
    with_cart(|cart| {
        let changed = cart.add_to_cart(NewLineItem::new(id, title, image_url, price));
        CartResponse::from_snapshot(cart.products(), changed, "ok")
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn cart_increment(id: String) -> CartResponse {
    with_cart(|cart| {
        let changed = cart.increment(&id);
        CartResponse::from_snapshot(cart.products(), changed, "ok")
    })
}

/// Removes one unit; the last unit of an item is kept.
#[flutter_rust_bridge::frb(sync)]
pub fn cart_decrement(id: String) -> CartResponse {
    with_cart(|cart| {
        let changed = cart.decrement(&id);
        CartResponse::from_snapshot(cart.products(), changed, "ok")
    })
}

/// Waits until queued cart writes reached storage. Call before the app is
/// backgrounded.
pub fn cart_flush() -> bool {
    CART.with_cart(|cart| cart.flush()).unwrap_or(false)
}

fn with_cart(f: impl FnOnce(&mut gomarketplace_core::Cart) -> CartResponse) -> CartResponse {
    CART.with_cart(f)
        .unwrap_or_else(|err| CartResponse::failure(err.to_string()))
}

fn to_item_view(item: &LineItem) -> CartItemView {
    CartItemView {
        id: item.id.clone(),
        title: item.title.clone(),
        image_url: item.image_url.clone(),
        price: item.price,
        quantity: item.quantity,
    }
}
