//! Cart State Machine
//!
//! `Cart` is immutable from the outside: the only way to change it is
//! [`Cart::apply`], which returns a new cart with `total` and `item_count`
//! recomputed from the items.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::action::CartAction;
use crate::error::CartError;
use crate::item::CartItem;

/// Cart contents plus derived totals
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "PersistedCart")]
pub struct Cart {
    items: Vec<CartItem>,
    #[serde(with = "rust_decimal::serde::float")]
    total: Decimal,
    item_count: u32,
}

impl Cart {
    /// The empty cart
    pub fn new() -> Self {
        Self::default()
    }

    fn from_items(items: Vec<CartItem>) -> Self {
        let total = items
            .iter()
            .fold(Decimal::ZERO, |acc, item| {
                acc.checked_add(item.line_total()).unwrap_or(Decimal::MAX)
            });
        let item_count = items
            .iter()
            .fold(0u32, |acc, item| acc.saturating_add(item.quantity));

        Self {
            items,
            total,
            item_count,
        }
    }

    /// Items in insertion order
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Σ(price × quantity)
    pub fn total(&self) -> Decimal {
        self.total
    }

    /// Σ(quantity)
    pub fn item_count(&self) -> u32 {
        self.item_count
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Apply one transition and return the resulting cart
    pub fn apply(&self, action: &CartAction) -> Cart {
        match action {
            CartAction::AddItem(item) => {
                let mut items = self.items.clone();

                if let Some(existing) = items.iter_mut().find(|i| i.id == item.id) {
                    existing.quantity = existing.quantity.saturating_add(item.quantity.max(1));
                } else {
                    // new lines always start at one
                    let mut line = item.clone();
                    line.quantity = 1;
                    line.price = line.price.max(Decimal::ZERO);
                    items.push(line);
                }

                Cart::from_items(items)
            }

            CartAction::RemoveItem(id) => {
                if self.get(id).is_none() {
                    return self.clone();
                }
                let items = self
                    .items
                    .iter()
                    .filter(|item| &item.id != id)
                    .cloned()
                    .collect();
                Cart::from_items(items)
            }

            CartAction::UpdateQuantity { id, quantity } => {
                let clamped = u32::try_from((*quantity).max(1)).unwrap_or(u32::MAX);
                let items = self
                    .items
                    .iter()
                    .map(|item| {
                        if &item.id == id {
                            item.clone().with_quantity(clamped)
                        } else {
                            item.clone()
                        }
                    })
                    .collect();
                Cart::from_items(items)
            }

            CartAction::ClearCart => Cart::new(),
        }
    }
}

/// Wire shape of a stored cart; stored totals are skipped and recomputed
#[derive(Deserialize)]
struct PersistedCart {
    items: Vec<CartItem>,
}

impl TryFrom<PersistedCart> for Cart {
    type Error = CartError;

    fn try_from(persisted: PersistedCart) -> Result<Self, Self::Error> {
        let mut seen = HashSet::new();

        for item in &persisted.items {
            if !seen.insert(item.id.as_str()) {
                return Err(CartError::InvalidState(format!("duplicate item id {}", item.id)));
            }
            if item.quantity == 0 {
                return Err(CartError::InvalidState(format!("zero quantity for {}", item.id)));
            }
            if item.price.is_sign_negative() && !item.price.is_zero() {
                return Err(CartError::InvalidState(format!("negative price for {}", item.id)));
            }
        }

        Ok(Cart::from_items(persisted.items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemKind;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn logo() -> CartItem {
        CartItem::new("logo-design", "Logo Design", dec!(800), "branding", ItemKind::Service)
    }

    fn site() -> CartItem {
        CartItem::new("starter-site", "Starter Website", dec!(2400), "web", ItemKind::Package)
    }

    #[test]
    fn test_add_same_item_twice() {
        let cart = Cart::new()
            .apply(&CartAction::add(logo()))
            .apply(&CartAction::add(logo()));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.total(), dec!(1600));
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let cart = Cart::new()
            .apply(&CartAction::add(site()))
            .apply(&CartAction::add(logo()))
            .apply(&CartAction::add(site()));

        let ids: Vec<_> = cart.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["starter-site", "logo-design"]);
        assert_eq!(cart.total(), dec!(5600));
    }

    #[test]
    fn test_add_with_quantity() {
        let cart = Cart::new()
            .apply(&CartAction::add(logo()))
            .apply(&CartAction::add(logo().with_quantity(3)));
        assert_eq!(cart.get("logo-design").map(|i| i.quantity), Some(4));
    }

    #[test]
    fn test_new_line_starts_at_one() {
        let cart = Cart::new().apply(&CartAction::add(logo().with_quantity(5)));
        assert_eq!(cart.get("logo-design").map(|i| i.quantity), Some(1));
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_remove_item() {
        let cart = Cart::new()
            .apply(&CartAction::add(logo()))
            .apply(&CartAction::add(site()))
            .apply(&CartAction::remove("logo-design"));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.total(), dec!(2400));
        assert_eq!(cart.item_count(), 1);
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let cart = Cart::new().apply(&CartAction::add(logo()));
        let after = cart.apply(&CartAction::remove("nope"));
        assert_eq!(cart, after);
    }

    #[test]
    fn test_update_quantity_clamps_to_one() {
        let cart = Cart::new().apply(&CartAction::add(logo()));

        let zero = cart.apply(&CartAction::update_quantity("logo-design", 0));
        assert_eq!(zero.items()[0].quantity, 1);
        assert_eq!(zero.total(), dec!(800));

        let negative = cart.apply(&CartAction::update_quantity("logo-design", -5));
        assert_eq!(negative.items()[0].quantity, 1);
    }

    #[test]
    fn test_update_quantity_recomputes() {
        let cart = Cart::new()
            .apply(&CartAction::add(logo()))
            .apply(&CartAction::update_quantity("logo-design", 5));
        assert_eq!(cart.total(), dec!(4000));
        assert_eq!(cart.item_count(), 5);
    }

    #[test]
    fn test_clear_cart() {
        let cart = Cart::new()
            .apply(&CartAction::add(logo()))
            .apply(&CartAction::ClearCart);
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_persisted_shape() {
        let cart = Cart::new().apply(&CartAction::add(logo()));
        let json = serde_json::to_value(&cart).unwrap();

        assert_eq!(json["itemCount"], 1);
        assert_eq!(json["total"].as_f64(), Some(800.0));
        assert_eq!(json["items"][0]["id"], "logo-design");
    }

    #[test]
    fn test_deserialize_recomputes_totals() {
        let raw = r#"{"items":[{"id":"logo-design","name":"Logo Design","price":800,
            "category":"branding","type":"service","quantity":2}],"total":1,"itemCount":99}"#;
        let cart: Cart = serde_json::from_str(raw).unwrap();
        assert_eq!(cart.total(), dec!(1600));
        assert_eq!(cart.item_count(), 2);
    }

    #[test]
    fn test_deserialize_rejects_duplicates() {
        let raw = r#"{"items":[
            {"id":"a","name":"A","price":1,"category":"c","type":"service","quantity":1},
            {"id":"a","name":"A","price":1,"category":"c","type":"service","quantity":1}
        ],"total":2,"itemCount":2}"#;
        assert!(serde_json::from_str::<Cart>(raw).is_err());
    }

    #[test]
    fn test_deserialize_rejects_zero_quantity() {
        let raw = r#"{"items":[{"id":"a","name":"A","price":1,"category":"c","type":"service","quantity":0}]}"#;
        assert!(serde_json::from_str::<Cart>(raw).is_err());
    }

    fn arb_item() -> impl Strategy<Value = CartItem> {
        (0u8..6, 0u32..100_000, 1u32..5).prop_map(|(id, cents, qty)| {
            CartItem::new(
                format!("item-{id}"),
                format!("Item {id}"),
                Decimal::new(i64::from(cents), 2),
                "test",
                ItemKind::Service,
            )
            .with_quantity(qty)
        })
    }

    fn arb_action() -> impl Strategy<Value = CartAction> {
        prop_oneof![
            4 => arb_item().prop_map(CartAction::AddItem),
            2 => (0u8..6).prop_map(|id| CartAction::remove(format!("item-{id}"))),
            2 => (0u8..6, -3i64..20).prop_map(|(id, q)| CartAction::update_quantity(format!("item-{id}"), q)),
            1 => Just(CartAction::ClearCart),
        ]
    }

    proptest! {
        #[test]
        fn prop_totals_match_items(actions in proptest::collection::vec(arb_action(), 0..40)) {
            let cart = actions.iter().fold(Cart::new(), |cart, action| cart.apply(action));

            let expected_total: Decimal = cart.items().iter().map(|i| i.price * Decimal::from(i.quantity)).sum();
            let expected_count: u32 = cart.items().iter().map(|i| i.quantity).sum();

            prop_assert_eq!(cart.total(), expected_total);
            prop_assert_eq!(cart.item_count(), expected_count);
        }

        #[test]
        fn prop_ids_unique_and_quantities_positive(actions in proptest::collection::vec(arb_action(), 0..40)) {
            let cart = actions.iter().fold(Cart::new(), |cart, action| cart.apply(action));

            let ids: HashSet<_> = cart.items().iter().map(|i| i.id.clone()).collect();
            prop_assert_eq!(ids.len(), cart.items().len());
            prop_assert!(cart.items().iter().all(|i| i.quantity >= 1));
        }

        #[test]
        fn prop_quantity_floor(item in arb_item(), q in -1000i64..=0) {
            let cart = Cart::new()
                .apply(&CartAction::AddItem(item.clone()))
                .apply(&CartAction::update_quantity(item.id.clone(), q));
            prop_assert_eq!(cart.get(&item.id).map(|i| i.quantity), Some(1));
        }

        #[test]
        fn prop_persisted_cart_restores(actions in proptest::collection::vec(arb_action(), 0..20)) {
            let cart = actions.iter().fold(Cart::new(), |cart, action| cart.apply(action));
            let json = serde_json::to_string(&cart).unwrap();
            let restored: Cart = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(restored.item_count(), cart.item_count());
            prop_assert_eq!(restored.total(), cart.total());
        }
    }
}
