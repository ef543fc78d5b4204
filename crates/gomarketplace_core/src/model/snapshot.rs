//! Immutable cart snapshot.
//!
//! # Responsibility
//! - Hold the full ordered cart state at one point in time.
//! - Allow change detection by identity without comparing contents.
//!
//! # Invariants
//! - A snapshot is never mutated after construction; mutations build a new one.
//! - Order is insertion order of first add.

use crate::model::line_item::{LineItem, LineItemValidationError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::sync::Arc;

/// Full ordered cart state. Cloning is a reference-count bump.
#[derive(Debug, Clone)]
pub struct CartSnapshot {
    items: Arc<[LineItem]>,
}

impl CartSnapshot {
    pub fn empty() -> Self {
        Self {
            items: Arc::from(Vec::new()),
        }
    }

    /// Builds a snapshot without checking invariants.
    ///
    /// Stored payloads should go through `sync::codec::decode_snapshot`.
    pub fn from_items(items: Vec<LineItem>) -> Self {
        Self {
            items: Arc::from(items),
        }
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LineItem> {
        self.items.iter()
    }

    /// Linear lookup by product id.
    pub fn find(&self, id: &str) -> Option<&LineItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub(crate) fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    /// Returns whether both values are the very same snapshot instance.
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }

    /// Sum of quantities across all items.
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of line subtotals.
    pub fn total_price(&self) -> f64 {
        self.items.iter().map(LineItem::subtotal).sum()
    }

    /// Checks item invariants and id uniqueness.
    pub fn validate(&self) -> Result<(), LineItemValidationError> {
        let mut seen = HashSet::with_capacity(self.items.len());
        for item in self.items.iter() {
            item.validate()?;
            if !seen.insert(item.id.as_str()) {
                return Err(LineItemValidationError::DuplicateId {
                    id: item.id.clone(),
                });
            }
        }
        Ok(())
    }
}

impl Default for CartSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

impl PartialEq for CartSnapshot {
    fn eq(&self, other: &Self) -> bool {
        self.same_as(other) || self.items == other.items
    }
}

impl From<Vec<LineItem>> for CartSnapshot {
    fn from(items: Vec<LineItem>) -> Self {
        Self::from_items(items)
    }
}

impl<'a> IntoIterator for &'a CartSnapshot {
    type Item = &'a LineItem;
    type IntoIter = std::slice::Iter<'a, LineItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// Serialized as a bare JSON array so the stored value stays a plain list.
impl Serialize for CartSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for CartSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<LineItem>::deserialize(deserializer).map(Self::from_items)
    }
}

#[cfg(test)]
mod tests {
    use super::CartSnapshot;
    use crate::model::line_item::{LineItem, LineItemValidationError, NewLineItem};

    fn item(id: &str, quantity: u32) -> LineItem {
        LineItem::first_unit(NewLineItem::new(id, "title", "url", 1.5)).with_quantity(quantity)
    }

    #[test]
    fn clones_share_identity_but_rebuilt_snapshots_do_not() {
        let snapshot = CartSnapshot::from_items(vec![item("a", 1)]);
        let clone = snapshot.clone();
        let rebuilt = CartSnapshot::from_items(vec![item("a", 1)]);

        assert!(snapshot.same_as(&clone));
        assert!(!snapshot.same_as(&rebuilt));
        assert_eq!(snapshot, rebuilt);
    }

    #[test]
    fn validate_rejects_duplicate_ids() {
        let snapshot = CartSnapshot::from_items(vec![item("a", 1), item("b", 2), item("a", 3)]);
        assert_eq!(
            snapshot.validate().unwrap_err(),
            LineItemValidationError::DuplicateId {
                id: "a".to_string()
            }
        );
    }

    #[test]
    fn totals_cover_all_items() {
        let snapshot = CartSnapshot::from_items(vec![item("a", 2), item("b", 3)]);
        assert_eq!(snapshot.total_quantity(), 5);
        assert_eq!(snapshot.total_price(), 7.5);
    }
}
