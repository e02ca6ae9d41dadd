//! Main App Component

use leptos::prelude::*;
use leptos_router::{components::*, path};

use crate::cart::CartContext;
use crate::components::NavBar;
use crate::pages::{CartPage, CheckoutSuccessPage, HomePage, PricingPage, ServicesPage};

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    CartContext::provide();

    view! {
        <Router>
            <NavBar />
            <main class="app">
                <Routes fallback=|| view! { <p>"Page not found"</p> }>
                    <Route path=path!("/") view=HomePage />
                    <Route path=path!("/pricing") view=PricingPage />
                    <Route path=path!("/services") view=ServicesPage />
                    <Route path=path!("/cart") view=CartPage />
                    <Route path=path!("/checkout/success") view=CheckoutSuccessPage />
                </Routes>
            </main>
        </Router>
    }
}
