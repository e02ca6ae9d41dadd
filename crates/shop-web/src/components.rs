//! UI Components

use leptos::prelude::*;
use rust_decimal::Decimal;
use shop_cart::{CartAction, CartItem, Offering};

use crate::cart::use_cart;

/// `$1,234.50` style price label
pub fn format_price(amount: Decimal) -> String {
    let rounded = amount.round_dp(2);
    let cents = format!("{rounded:.2}");
    let (whole, frac) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let digits: Vec<char> = whole.chars().collect();
    let mut grouped = String::new();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    format!("${grouped}.{frac}")
}

/// Top navigation with cart badge
#[component]
pub fn NavBar() -> impl IntoView {
    let cart = use_cart();

    view! {
        <nav class="nav">
            <a href="/" class="brand">"Storefront"</a>
            <a href="/pricing">"Plans"</a>
            <a href="/services">"Services"</a>
            <a href="/cart" class="cart-link">
                "Cart"
                <Show when=move || { cart.item_count() > 0 }>
                    <span class="badge">{move || cart.item_count()}</span>
                </Show>
            </a>
        </nav>
    }
}

/// Catalog card with an add-to-cart button
#[component]
pub fn OfferingCard(offering: &'static Offering) -> impl IntoView {
    let cart = use_cart();
    let add = move |_| cart.dispatch(CartAction::add(offering.to_cart_item()));

    view! {
        <div class=format!("offering offering-{}", offering.kind.as_str())>
            <h3>{offering.name}</h3>
            <p>{offering.description}</p>
            <div class="price">{format_price(offering.price())}</div>
            <button class="btn" on:click=add>"Add to cart"</button>
        </div>
    }
}

/// One editable cart line
///
/// Decrementing a single unit removes the line; quantity never shows 0.
#[component]
pub fn CartLine(item: CartItem) -> impl IntoView {
    let cart = use_cart();
    let id = item.id.clone();
    let quantity = i64::from(item.quantity);

    let dec_id = id.clone();
    let decrement = move |_| {
        if quantity <= 1 {
            cart.dispatch(CartAction::remove(dec_id.clone()));
        } else {
            cart.dispatch(CartAction::update_quantity(dec_id.clone(), quantity - 1));
        }
    };
    let inc_id = id.clone();
    let increment = move |_| cart.dispatch(CartAction::update_quantity(inc_id.clone(), quantity + 1));
    let remove = move |_| cart.dispatch(CartAction::remove(id.clone()));

    view! {
        <li class="cart-line">
            <span class="name">{item.name.clone()}</span>
            <span class="unit">{format_price(item.price)}</span>
            <div class="qty">
                <button on:click=decrement>"−"</button>
                <span>{item.quantity}</span>
                <button on:click=increment>"+"</button>
            </div>
            <span class="line-total">{format_price(item.line_total())}</span>
            <button class="remove" on:click=remove>"Remove"</button>
        </li>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(Decimal::new(25_000, 2)), "$250.00");
        assert_eq!(format_price(Decimal::new(123_450, 2)), "$1,234.50");
        assert_eq!(format_price(Decimal::ZERO), "$0.00");
        assert_eq!(format_price(Decimal::new(1_000_000_05, 2)), "$1,000,000.05");
    }
}
