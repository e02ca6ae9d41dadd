//! Cart Actions

use crate::item::CartItem;

/// The four transitions a cart accepts
#[derive(Clone, Debug, PartialEq)]
pub enum CartAction {
    /// Add an item; `item.quantity` is the amount to add
    AddItem(CartItem),

    /// Remove the line with this id (no-op when absent)
    RemoveItem(String),

    /// Set a line's quantity, clamped to at least 1
    UpdateQuantity { id: String, quantity: i64 },

    /// Reset to the empty cart
    ClearCart,
}

impl CartAction {
    pub fn add(item: CartItem) -> Self {
        CartAction::AddItem(item)
    }

    pub fn remove(id: impl Into<String>) -> Self {
        CartAction::RemoveItem(id.into())
    }

    pub fn update_quantity(id: impl Into<String>, quantity: i64) -> Self {
        CartAction::UpdateQuantity {
            id: id.into(),
            quantity,
        }
    }
}
