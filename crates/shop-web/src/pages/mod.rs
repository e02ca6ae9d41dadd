//! Page Components

mod cart;
mod home;
mod pricing;
mod services;
mod success;

pub use cart::CartPage;
pub use home::HomePage;
pub use pricing::PricingPage;
pub use services::ServicesPage;
pub use success::CheckoutSuccessPage;
