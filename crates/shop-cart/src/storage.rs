//! Cart Persistence
//!
//! The cart is written to durable storage after every transition and read
//! back once when the cart is created. Anything unreadable at load time is
//! discarded in favour of an empty cart.

use std::cell::RefCell;

use crate::action::CartAction;
use crate::cart::Cart;
use crate::error::Result;

/// Fixed key the cart document is stored under
pub const STORAGE_KEY: &str = "storefront-cart";

/// Durable key-value storage for the serialized cart
///
/// Implemented by browser `localStorage` in the web crate and by
/// [`MemoryStorage`] for tests and non-browser hosts.
pub trait CartStorage {
    /// Read the raw document, if any
    fn read(&self, key: &str) -> Result<Option<String>>;

    /// Replace the raw document
    fn write(&self, key: &str, document: &str) -> Result<()>;
}

/// In-memory storage (single document)
#[derive(Debug, Default)]
pub struct MemoryStorage {
    document: RefCell<Option<String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed with a raw document
    pub fn with_document(document: impl Into<String>) -> Self {
        Self {
            document: RefCell::new(Some(document.into())),
        }
    }

    pub fn document(&self) -> Option<String> {
        self.document.borrow().clone()
    }
}

impl CartStorage for MemoryStorage {
    fn read(&self, _key: &str) -> Result<Option<String>> {
        Ok(self.document.borrow().clone())
    }

    fn write(&self, _key: &str, document: &str) -> Result<()> {
        *self.document.borrow_mut() = Some(document.to_string());
        Ok(())
    }
}

/// A cart bound to a storage backend
pub struct PersistentCart<S: CartStorage> {
    storage: S,
    state: Cart,
}

impl<S: CartStorage> PersistentCart<S> {
    /// Restore the cart from storage, falling back to empty
    pub fn load(storage: S) -> Self {
        let state = match storage.read(STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Cart>(&raw) {
                Ok(cart) => cart,
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding malformed persisted cart");
                    Cart::new()
                }
            },
            Ok(None) => Cart::new(),
            Err(e) => {
                tracing::warn!(error = %e, "Cart storage unreadable, starting empty");
                Cart::new()
            }
        };

        Self { storage, state }
    }

    pub fn state(&self) -> &Cart {
        &self.state
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Apply a transition and persist the result
    ///
    /// A failed write is logged; the in-memory state still advances.
    pub fn dispatch(&mut self, action: CartAction) -> &Cart {
        self.state = self.state.apply(&action);

        if let Err(e) = self.persist() {
            tracing::warn!(error = %e, "Failed to persist cart");
        }

        &self.state
    }

    fn persist(&self) -> Result<()> {
        let document = serde_json::to_string(&self.state)?;
        self.storage.write(STORAGE_KEY, &document)
    }
}
