//! Snapshot wire codec.
//!
//! # Responsibility
//! - Encode a `CartSnapshot` as the JSON array stored under the cart key.
//! - Decode stored values before they reach the cart store.
//!
//! # Invariants
//! - Decoded snapshots satisfy id uniqueness and quantity >= 1.
//! - One unreadable entry never discards the rest of the cart: it is dropped
//!   on its own and logged.
//! - Field names are `id`, `title`, `image_url`, `price`, `quantity`.

use crate::model::line_item::LineItem;
use crate::model::snapshot::CartSnapshot;
use log::warn;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CodecResult<T> = Result<T, CodecError>;

/// Payload-level decode failure. Item-level problems are not errors.
#[derive(Debug)]
pub enum CodecError {
    Json(serde_json::Error),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "malformed cart payload: {err}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

pub fn encode_snapshot(snapshot: &CartSnapshot) -> CodecResult<String> {
    Ok(serde_json::to_string(snapshot)?)
}

/// Decodes a stored cart.
///
/// # Errors
/// - `Json` when the payload is not a JSON array.
///
/// Entries that do not parse as a line item (e.g. a non-finite price that
/// was written as `null`), have quantity 0, or repeat an earlier id are
/// skipped with a `warn` event.
pub fn decode_snapshot(raw: &str) -> CodecResult<CartSnapshot> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(raw)?;
    let mut seen = HashSet::with_capacity(entries.len());
    let mut items = Vec::with_capacity(entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        let item = match serde_json::from_value::<LineItem>(entry) {
            Ok(item) => item,
            Err(err) => {
                warn!(
                    "event=cart_decode module=sync status=skipped index={index} error_code=item_malformed error={err}"
                );
                continue;
            }
        };
        if let Err(err) = item.validate() {
            warn!(
                "event=cart_decode module=sync status=skipped index={index} error_code=item_invalid error={err}"
            );
            continue;
        }
        if !seen.insert(item.id.clone()) {
            warn!(
                "event=cart_decode module=sync status=skipped index={index} error_code=duplicate_id"
            );
            continue;
        }
        items.push(item);
    }

    Ok(CartSnapshot::from_items(items))
}
