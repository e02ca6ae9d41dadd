//! Services Page

use leptos::prelude::*;
use shop_cart::{ItemKind, Offering};

use crate::components::OfferingCard;

#[component]
pub fn ServicesPage() -> impl IntoView {
    let of_kind = |kind: ItemKind| {
        Offering::all()
            .iter()
            .filter(move |o| o.kind == kind)
            .map(|offering| view! { <OfferingCard offering=offering /> })
            .collect_view()
    };

    view! {
        <div class="services">
            <h1>"Services"</h1>

            <h2>"Packages"</h2>
            <div class="offerings">{of_kind(ItemKind::Package)}</div>

            <h2>"Individual services"</h2>
            <div class="offerings">{of_kind(ItemKind::Service)}</div>
        </div>
    }
}
