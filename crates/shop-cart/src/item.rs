//! Cart Items

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What kind of offering a cart line refers to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// A single service (e.g. logo design)
    Service,
    /// A bundle of services sold as one package
    Package,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Service => "service",
            ItemKind::Package => "package",
        }
    }
}

/// A line in the cart
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Stable product/package key
    pub id: String,

    /// Display name
    pub name: String,

    /// Unit price (non-negative)
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Category tag
    pub category: String,

    /// Service or package
    #[serde(rename = "type")]
    pub kind: ItemKind,

    /// Quantity (at least 1)
    pub quantity: u32,
}

impl CartItem {
    /// Create an item with quantity 1
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: Decimal,
        category: impl Into<String>,
        kind: ItemKind,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            category: category.into(),
            kind,
            quantity: 1,
        }
    }

    /// Set the quantity (floored at 1)
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity.max(1);
        self
    }

    /// Price × quantity, saturating instead of overflowing
    pub fn line_total(&self) -> Decimal {
        self.price
            .checked_mul(Decimal::from(self.quantity))
            .unwrap_or(Decimal::MAX)
    }
}
