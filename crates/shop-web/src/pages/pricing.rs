//! Pricing Page

use leptos::prelude::*;
use rust_decimal::Decimal;

use crate::api::{self, CheckoutPayload, PlanListing};
use crate::components::format_price;

#[component]
pub fn PricingPage() -> impl IntoView {
    let (yearly, set_yearly) = signal(false);
    let (email, set_email) = signal(String::new());
    let (error, set_error) = signal(None::<String>);
    let (plans, set_plans) = signal(Vec::<PlanListing>::new());
    let (pending, set_pending) = signal(false);

    // prices come from the server's plan table
    leptos::task::spawn_local(async move {
        match api::fetch_plans().await {
            Ok(list) => set_plans.set(list),
            Err(e) => set_error.set(Some(e)),
        }
    });

    let checkout = move |plan: String| {
        if pending.get_untracked() {
            return;
        }
        let email = email.get_untracked().trim().to_string();
        let payload = CheckoutPayload::Subscription {
            plan_slug: plan,
            billing_cycle: if yearly.get_untracked() { "yearly" } else { "monthly" }.to_string(),
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
        <div class="pricing">
            <h1>"Pricing"</h1>
            <p class="subtitle">"Two months free with yearly billing"</p>

            <label class="toggle">
                <input
                    type="checkbox"
                    prop:checked=move || yearly.get()
                    on:change=move |ev| set_yearly.set(event_target_checked(&ev))
                />
                "Bill yearly"
            </label>

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

            <div class="plans">
                <For
                    each=move || plans.get()
                    key=|plan| plan.slug.clone()
                    children=move |plan| {
                        let PlanListing { slug, name, description, monthly_cents, yearly_cents, featured, highlights } = plan;
                        let price = move || {
                            let cents = if yearly.get() { yearly_cents } else { monthly_cents };
                            format_price(Decimal::new(cents, 2))
                        };
                        let period = move || if yearly.get() { "/year" } else { "/month" };
                        view! {
                            <div class="plan" class:featured=featured>
                                <h2>{name}</h2>
                                <p class="description">{description}</p>
                                <div class="price">{price}<span>{period}</span></div>
                                <ul>
                                    {highlights.into_iter().map(|h| view! { <li>{h}</li> }).collect_view()}
                                </ul>
                                <button
                                    class="btn btn-primary"
                                    disabled=move || pending.get()
                                    on:click=move |_| checkout(slug.clone())
                                >
                                    "Subscribe"
                                </button>
                            </div>
                        }
                    }
                />
            </div>
        </div>
    }
}
