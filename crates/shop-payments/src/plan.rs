//! Subscription Plans
//!
//! Known plan slugs, their display names and list prices. This table is
//! the only price source: checkout charges from it and the storefront
//! renders it through `GET /api/plans`.

use serde::{Deserialize, Serialize};

/// Label used when neither the slug nor the payload names the plan
pub const DEFAULT_PLAN_NAME: &str = "Subscription";

/// Subscription plan tiers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Essentials,
    Growth,
    Premium,
}

impl Plan {
    pub const ALL: [Plan; 3] = [Plan::Essentials, Plan::Growth, Plan::Premium];

    pub fn slug(&self) -> &'static str {
        match self {
            Plan::Essentials => "essentials",
            Plan::Growth => "growth",
            Plan::Premium => "premium",
        }
    }

    /// Look up a plan by slug (case-insensitive)
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug.trim().to_lowercase().as_str() {
            "essentials" => Some(Plan::Essentials),
            "growth" => Some(Plan::Growth),
            "premium" => Some(Plan::Premium),
            _ => None,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Plan::Essentials => "Essentials",
            Plan::Growth => "Growth",
            Plan::Premium => "Premium",
        }
    }

    /// Get pricing for this plan
    pub fn pricing(&self, cycle: BillingCycle) -> PlanPricing {
        let (description, monthly_cents) = match self {
            Plan::Essentials => ("Website care, hosting and monthly updates", 4900),
            Plan::Growth => ("Everything in Essentials plus SEO and content", 9900),
            Plan::Premium => ("Dedicated designer, priority support, campaigns", 19900),
        };

        PlanPricing {
            name: self.display_name().to_string(),
            description: description.to_string(),
            // yearly billing: two months free
            cents: match cycle {
                BillingCycle::Monthly => monthly_cents,
                BillingCycle::Yearly => monthly_cents * 10,
            },
            cycle,
        }
    }
}

impl Plan {
    /// Bullet points shown on the pricing page
    pub fn highlights(&self) -> &'static [&'static str] {
        match self {
            Plan::Essentials => &["Hosting and SSL", "Monthly content updates", "Email support"],
            Plan::Growth => &["Everything in Essentials", "SEO monitoring", "Two blog posts a month"],
            Plan::Premium => &["Everything in Growth", "Dedicated designer", "Priority support"],
        }
    }

    /// Highlighted tier on the pricing page
    pub fn is_featured(&self) -> bool {
        matches!(self, Plan::Growth)
    }

    pub fn listing(&self) -> PlanListing {
        let monthly = self.pricing(BillingCycle::Monthly);
        PlanListing {
            slug: self.slug(),
            name: self.display_name(),
            description: monthly.description,
            monthly_cents: monthly.cents,
            yearly_cents: self.pricing(BillingCycle::Yearly).cents,
            featured: self.is_featured(),
            highlights: self.highlights(),
        }
    }

    /// Every plan, in display order
    pub fn catalog() -> Vec<PlanListing> {
        Plan::ALL.iter().map(Plan::listing).collect()
    }
}

/// Public view of a plan with both cycle prices
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlanListing {
    pub slug: &'static str,
    pub name: &'static str,
    pub description: String,
    pub monthly_cents: i64,
    pub yearly_cents: i64,
    pub featured: bool,
    pub highlights: &'static [&'static str],
}

/// Billing interval
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    #[default]
    Monthly,
    Yearly,
}

impl BillingCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Yearly => "yearly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "monthly" | "month" => Some(BillingCycle::Monthly),
            "yearly" | "year" | "annual" | "annually" => Some(BillingCycle::Yearly),
            _ => None,
        }
    }
}

/// Pricing information
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PlanPricing {
    pub name: String,
    pub description: String,
    pub cents: i64,
    pub cycle: BillingCycle,
}

/// Resolve the display name for a purchased plan
///
/// Known slug wins, then whatever name the payload carries, then the
/// generic label.
pub fn resolve_plan_name(slug: Option<&str>, payload_name: Option<&str>) -> String {
    slug.and_then(Plan::from_slug)
        .map(|p| p.display_name().to_string())
        .or_else(|| {
            payload_name
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| DEFAULT_PLAN_NAME.to_string())
}
