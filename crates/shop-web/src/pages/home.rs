//! Home Page

use leptos::prelude::*;

#[component]
pub fn HomePage() -> impl IntoView {
    view! {
        <div class="home">
            <header class="hero">
                <h1>"Design and web care for small businesses"</h1>
                <p class="tagline">"Pick a monthly plan or order individual services."</p>
                <div class="cta">
                    <a href="/pricing" class="btn btn-primary">"View Plans"</a>
                    <a href="/services" class="btn">"Browse Services"</a>
                </div>
            </header>

            <section class="features">
                <div class="feature">
                    <h3>"Plans"</h3>
                    <p>"Hosting, updates and support on a predictable subscription."</p>
                </div>
                <div class="feature">
                    <h3>"Services"</h3>
                    <p>"One-off branding, web and marketing work, priced up front."</p>
                </div>
                <div class="feature">
                    <h3>"Secure checkout"</h3>
                    <p>"Payments are handled on Stripe's hosted checkout page."</p>
                </div>
            </section>
        </div>
    }
}
