//! Checkout Success Page

use leptos::prelude::*;
use shop_cart::CartAction;

use crate::cart::use_cart;

#[component]
pub fn CheckoutSuccessPage() -> impl IntoView {
    // paid for; start the next visit with an empty cart
    let cart = use_cart();
    cart.dispatch(CartAction::ClearCart);

    view! {
        <div class="success">
            <h1>"Thank you!"</h1>
            <p>"Your payment went through. A confirmation email is on its way."</p>
            <p>"Subscribers receive their sign-in details in the same email."</p>
            <a href="/" class="btn">"Back to home"</a>
        </div>
    }
}
