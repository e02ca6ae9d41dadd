//! Storefront Web Frontend
//!
//! Leptos-based WASM storefront: plans, services and a cart that survives
//! reloads through browser `localStorage`.

mod api;
mod app;
mod cart;
mod components;
mod pages;

pub use app::App;

use wasm_bindgen::prelude::*;

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    leptos::mount::mount_to_body(App);
}
