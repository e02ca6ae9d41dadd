//! Offering Catalog
//!
//! Services and packages that can be placed in the cart. The storefront
//! renders this list and the server prices cart checkouts from it, so a
//! client-side price is never trusted.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::item::{CartItem, ItemKind};

/// A purchasable offering
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Offering {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Unit price in cents
    pub price_cents: i64,
    pub category: &'static str,
    pub kind: ItemKind,
}

const OFFERINGS: &[Offering] = &[
    Offering {
        id: "logo-design",
        name: "Logo Design",
        description: "Three concepts and two rounds of revisions",
        price_cents: 25_000,
        category: "branding",
        kind: ItemKind::Service,
    },
    Offering {
        id: "brand-guide",
        name: "Brand Style Guide",
        description: "Colors, type and usage rules in one document",
        price_cents: 40_000,
        category: "branding",
        kind: ItemKind::Service,
    },
    Offering {
        id: "landing-page",
        name: "Landing Page",
        description: "Single responsive page with contact form",
        price_cents: 75_000,
        category: "web",
        kind: ItemKind::Service,
    },
    Offering {
        id: "seo-audit",
        name: "SEO Audit",
        description: "Technical and content audit with action plan",
        price_cents: 30_000,
        category: "marketing",
        kind: ItemKind::Service,
    },
    Offering {
        id: "launch-package",
        name: "Launch Package",
        description: "Logo, style guide and landing page",
        price_cents: 120_000,
        category: "bundles",
        kind: ItemKind::Package,
    },
    Offering {
        id: "growth-package",
        name: "Growth Package",
        description: "Landing page, SEO audit and three blog posts",
        price_cents: 150_000,
        category: "bundles",
        kind: ItemKind::Package,
    },
];

impl Offering {
    /// All offerings, in display order
    pub fn all() -> &'static [Offering] {
        OFFERINGS
    }

    pub fn find(id: &str) -> Option<&'static Offering> {
        OFFERINGS.iter().find(|o| o.id == id)
    }

    pub fn price(&self) -> Decimal {
        Decimal::new(self.price_cents, 2)
    }

    /// A cart line for this offering (quantity 1)
    pub fn to_cart_item(&self) -> CartItem {
        CartItem::new(self.id, self.name, self.price(), self.category, self.kind)
    }
}
