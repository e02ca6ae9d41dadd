//! Cart Context
//!
//! One [`PersistentCart`] per page session, shared through Leptos context.
//! Every dispatch writes the cart back to `localStorage`.

use leptos::prelude::*;
use shop_cart::{Cart, CartAction, CartError, CartStorage, PersistentCart};

/// Browser `localStorage` backend
///
/// Looks the storage object up on each call so the handle stays `Send`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStorage;

impl BrowserStorage {
    fn storage() -> shop_cart::Result<web_sys::Storage> {
        web_sys::window()
            .ok_or_else(|| CartError::StorageUnavailable("no window".into()))?
            .local_storage()
            .map_err(|e| CartError::StorageUnavailable(format!("{e:?}")))?
            .ok_or_else(|| CartError::StorageUnavailable("localStorage disabled".into()))
    }
}

impl CartStorage for BrowserStorage {
    fn read(&self, key: &str) -> shop_cart::Result<Option<String>> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| CartError::StorageUnavailable(format!("{e:?}")))
    }

    fn write(&self, key: &str, document: &str) -> shop_cart::Result<()> {
        Self::storage()?
            .set_item(key, document)
            .map_err(|e| CartError::StorageWrite(format!("{e:?}")))
    }
}

/// Shared cart handle
#[derive(Clone, Copy)]
pub struct CartContext {
    inner: RwSignal<PersistentCart<BrowserStorage>>,
}

impl CartContext {
    /// Load the persisted cart and provide it to descendants
    pub fn provide() -> Self {
        let context = Self {
            inner: RwSignal::new(PersistentCart::load(BrowserStorage)),
        };
        provide_context(context);
        context
    }

    pub fn dispatch(&self, action: CartAction) {
        self.inner.update(|cart| {
            cart.dispatch(action);
        });
    }

    /// Snapshot of the current cart (tracked)
    pub fn state(&self) -> Cart {
        self.inner.with(|cart| cart.state().clone())
    }

    /// Item count badge value (tracked)
    pub fn item_count(&self) -> u32 {
        self.inner.with(|cart| cart.state().item_count())
    }
}

/// The cart provided by [`App`](crate::App)
pub fn use_cart() -> CartContext {
    expect_context::<CartContext>()
}
