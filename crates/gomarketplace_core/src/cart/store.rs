//! Pure in-memory cart store.
//!
//! # Responsibility
//! - Own the live `CartSnapshot` and apply the three cart mutations.
//!
//! # Invariants
//! - No I/O; every operation is synchronous.
//! - Item ids stay unique and every quantity stays >= 1.
//! - A successful mutation swaps in a new snapshot; a no-op keeps the old one.

use crate::model::line_item::{LineItem, NewLineItem};
use crate::model::snapshot::CartSnapshot;

/// Canonical owner of the in-memory cart state.
#[derive(Debug, Default)]
pub struct CartStore {
    snapshot: CartSnapshot,
}

impl CartStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with a restored snapshot.
    pub fn with_snapshot(snapshot: CartSnapshot) -> Self {
        Self { snapshot }
    }

    /// Current snapshot in insertion order.
    pub fn products(&self) -> &CartSnapshot {
        &self.snapshot
    }

    /// Appends `product` with quantity 1 unless its id is already present.
    ///
    /// Duplicate adds leave the existing entry untouched, including its
    /// quantity and position. Returns whether the snapshot changed.
    pub fn add_to_cart(&mut self, product: NewLineItem) -> bool {
        if self.snapshot.find(&product.id).is_some() {
            return false;
        }

        let mut items = Vec::with_capacity(self.snapshot.len() + 1);
        items.extend_from_slice(self.snapshot.items());
        items.push(LineItem::first_unit(product));
        self.snapshot = CartSnapshot::from_items(items);
        true
    }

    /// Raises the quantity of `id` by one. Unknown ids are ignored.
    pub fn increment(&mut self, id: &str) -> bool {
        self.update_quantity(id, |quantity| quantity.checked_add(1))
    }

    /// Lowers the quantity of `id` by one.
    ///
    /// Refuses to go below 1: the last unit is never removed by this call.
    /// Unknown ids are ignored.
    pub fn decrement(&mut self, id: &str) -> bool {
        self.update_quantity(id, |quantity| {
            quantity.checked_sub(1).filter(|next| *next > 0)
        })
    }

    fn update_quantity(&mut self, id: &str, next: impl FnOnce(u32) -> Option<u32>) -> bool {
        let Some(index) = self.snapshot.position(id) else {
            return false;
        };
        let current = &self.snapshot.items()[index];
        let Some(quantity) = next(current.quantity) else {
            return false;
        };
        let updated = current.with_quantity(quantity);

        let mut items = self.snapshot.items().to_vec();
        items[index] = updated;
        self.snapshot = CartSnapshot::from_items(items);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::CartStore;
    use crate::model::line_item::{LineItem, NewLineItem};
    use crate::model::snapshot::CartSnapshot;

    fn product(id: &str) -> NewLineItem {
        NewLineItem::new(id, format!("title {id}"), format!("https://img/{id}.png"), 10.0)
    }

    fn quantities(store: &CartStore) -> Vec<(String, u32)> {
        store
            .products()
            .iter()
            .map(|item| (item.id.clone(), item.quantity))
            .collect()
    }

    #[test]
    fn add_to_empty_cart_creates_single_unit() {
        let mut store = CartStore::new();
        assert!(store.add_to_cart(product("a")));

        let items = store.products().items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "a");
        assert_eq!(items[0].title, "title a");
        assert_eq!(items[0].image_url, "https://img/a.png");
        assert_eq!(items[0].price, 10.0);
        assert_eq!(items[0].quantity, 1);
    }

    #[test]
    fn duplicate_add_keeps_quantity_and_position() {
        let mut store = CartStore::new();
        store.add_to_cart(product("a"));
        store.add_to_cart(product("b"));
        store.increment("a");
        store.increment("a");
        let before = store.products().clone();

        assert!(!store.add_to_cart(product("a")));

        assert!(store.products().same_as(&before));
        assert_eq!(
            quantities(&store),
            vec![("a".to_string(), 3), ("b".to_string(), 1)]
        );
    }

    #[test]
    fn increment_unknown_id_keeps_same_snapshot() {
        let mut store = CartStore::new();
        store.add_to_cart(product("a"));
        let before = store.products().clone();

        assert!(!store.increment("missing"));
        assert!(store.products().same_as(&before));
    }

    #[test]
    fn increment_at_max_quantity_is_refused() {
        let full = LineItem::first_unit(product("a")).with_quantity(u32::MAX);
        let mut store = CartStore::with_snapshot(CartSnapshot::from_items(vec![full]));
        let before = store.products().clone();

        assert!(!store.increment("a"));
        assert!(store.products().same_as(&before));
        assert_eq!(store.products().items()[0].quantity, u32::MAX);
    }

    #[test]
    fn decrement_at_one_is_refused() {
        let mut store = CartStore::new();
        store.add_to_cart(product("a"));
        let before = store.products().clone();

        assert!(!store.decrement("a"));
        assert!(store.products().same_as(&before));
        assert_eq!(quantities(&store), vec![("a".to_string(), 1)]);
    }

    #[test]
    fn decrement_from_two_reaches_one() {
        let mut store = CartStore::new();
        store.add_to_cart(product("a"));
        store.increment("a");

        assert!(store.decrement("a"));
        assert_eq!(quantities(&store), vec![("a".to_string(), 1)]);
    }

    #[test]
    fn decrement_unknown_id_is_ignored() {
        let mut store = CartStore::new();
        assert!(!store.decrement("missing"));
        assert!(store.products().is_empty());
    }

    #[test]
    fn mutation_leaves_previous_snapshot_untouched() {
        let mut store = CartStore::new();
        store.add_to_cart(product("a"));
        let before = store.products().clone();

        store.increment("a");

        assert_eq!(before.items()[0].quantity, 1);
        assert_eq!(store.products().items()[0].quantity, 2);
        assert!(!store.products().same_as(&before));
    }

    #[test]
    fn quantity_changes_do_not_reorder_items() {
        let mut store = CartStore::new();
        for id in ["c", "a", "b"] {
            store.add_to_cart(product(id));
        }
        store.increment("b");
        store.increment("c");
        store.decrement("c");

        let ids: Vec<_> = store.products().iter().map(|item| item.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn with_snapshot_seeds_restored_state() {
        let mut seed = CartStore::new();
        seed.add_to_cart(product("a"));
        let restored = CartStore::with_snapshot(seed.products().clone());

        assert_eq!(restored.products(), seed.products());
        assert!(restored.products().same_as(seed.products()));
        assert!(CartStore::with_snapshot(CartSnapshot::empty()).products().is_empty());
    }
}
