//! # shop-cart
//!
//! Client-side shopping cart for the storefront.
//!
//! ## Model
//!
//! ```text
//! ┌──────────────┐   CartAction    ┌──────────────┐   serialize   ┌──────────────┐
//! │  Cart (old)  │────────────────▶│  Cart (new)  │──────────────▶│ CartStorage  │
//! │ items/total  │  Cart::apply()  │ items/total  │ every change  │ (localStorage│
//! └──────────────┘                 └──────────────┘               │  or memory)  │
//!                                                                 └──────────────┘
//! ```
//!
//! Every transition is a pure function of `(cart, action)`. The `total` and
//! `item_count` fields are recomputed from `items` after each transition and
//! are never updated incrementally, so they cannot drift.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use shop_cart::{CartAction, CartItem, ItemKind, MemoryStorage, PersistentCart};
//!
//! let mut cart = PersistentCart::load(MemoryStorage::default());
//! cart.dispatch(CartAction::AddItem(CartItem::new(
//!     "logo-design", "Logo Design", price, "branding", ItemKind::Service,
//! )));
//! assert_eq!(cart.state().item_count(), 1);
//! ```

mod action;
mod cart;
mod catalog;
mod error;
mod item;
mod storage;

pub use action::CartAction;
pub use cart::Cart;
pub use catalog::Offering;
pub use error::{CartError, Result};
pub use item::{CartItem, ItemKind};
pub use storage::{CartStorage, MemoryStorage, PersistentCart, STORAGE_KEY};
