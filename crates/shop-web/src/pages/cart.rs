//! Cart Page

use leptos::prelude::*;
use shop_cart::CartAction;

use crate::api::{self, CheckoutPayload};
use crate::cart::use_cart;
use crate::components::{CartLine, format_price};

#[component]
pub fn CartPage() -> impl IntoView {
    let cart = use_cart();
    let (email, set_email) = signal(String::new());
    let (error, set_error) = signal(None::<String>);
    let (pending, set_pending) = signal(false);

    let checkout = move |_| {
        let items = cart.state().items().to_vec();
        if items.is_empty() || pending.get_untracked() {
            return;
        }
        let email = email.get_untracked().trim().to_string();
        let payload = CheckoutPayload::Cart {
            items,
            email: (!email.is_empty()).then_some(email),
        };

        set_pending.set(true);
        leptos::task::spawn_local(async move {
            let result = match api::create_checkout(&payload).await {
                Ok(url) => api::redirect(&url),
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                set_error.set(Some(e));
                set_pending.set(false);
            }
        });
    };

    view! {
        <div class="cart">
            <h1>"Your cart"</h1>

            <Show
                when=move || !cart.state().is_empty()
                fallback=|| view! {
                    <p class="empty">"Your cart is empty. "<a href="/services">"Browse services"</a></p>
                }
            >
                <ul class="cart-lines">
                    <For
                        each=move || cart.state().items().to_vec()
                        key=|item| (item.id.clone(), item.quantity)
                        children=move |item| view! { <CartLine item=item /> }
                    />
                </ul>

                <div class="summary">
                    <span>{move || format!("{} items", cart.item_count())}</span>
                    <strong>{move || format_price(cart.state().total())}</strong>
                </div>

                <div class="field">
                    <label>"Email (optional)"</label>
                    <input
                        type="email"
                        placeholder="you@example.com"
                        prop:value=move || email.get()
                        on:input=move |ev| set_email.set(event_target_value(&ev))
                    />
                </div>

                <Show when=move || error.get().is_some()>
                    <p class="error">{move || error.get().unwrap_or_default()}</p>
                </Show>

                <div class="actions">
                    <button class="btn" on:click=move |_| cart.dispatch(CartAction::ClearCart)>
                        "Clear cart"
                    </button>
                    <button class="btn btn-primary" on:click=checkout disabled=move || pending.get()>
                        {move || if pending.get() { "Redirecting..." } else { "Checkout" }}
                    </button>
                </div>
            </Show>
        </div>
    }
}
