//! Capability registry keyed by provider identity.
//!
//! Replaces per-call lookup tables (route, icon, color by service name) so the
//! coordinator and decision surface stay provider-agnostic.

use std::collections::HashMap;

use log::debug;

use super::{ProviderCategory, ProviderDescriptor};

const BUILTIN_PROVIDERS: &[ProviderDescriptor] = &[
    ProviderDescriptor::builtin(
        "razorpay",
        "Razorpay",
        ProviderCategory::Payments,
        "/services/razorpay/setup",
        "credit-card",
        "#0c2451",
    ),
    ProviderDescriptor::builtin(
        "paypal",
        "PayPal",
        ProviderCategory::Payments,
        "/services/paypal/setup",
        "wallet",
        "#003087",
    ),
    ProviderDescriptor::builtin(
        "stripe",
        "Stripe",
        ProviderCategory::Payments,
        "/services/stripe/setup",
        "credit-card",
        "#635bff",
    ),
    ProviderDescriptor::builtin(
        "cashfree",
        "Cashfree",
        ProviderCategory::Payments,
        "/services/cashfree/setup",
        "indian-rupee",
        "#5a2ca0",
    ),
    ProviderDescriptor::builtin(
        "twilio",
        "Twilio",
        ProviderCategory::Sms,
        "/services/twilio/setup",
        "message-square",
        "#f22f46",
    ),
    ProviderDescriptor::builtin(
        "msg91",
        "MSG91",
        ProviderCategory::Sms,
        "/services/msg91/setup",
        "message-square",
        "#1a73e8",
    ),
    ProviderDescriptor::builtin(
        "resend",
        "Resend",
        ProviderCategory::Email,
        "/services/resend/setup",
        "mail",
        "#000000",
    ),
    ProviderDescriptor::builtin(
        "sendgrid",
        "SendGrid",
        ProviderCategory::Email,
        "/services/sendgrid/setup",
        "mail",
        "#1a82e2",
    ),
];

/// Lookup of provider descriptors by id (case-insensitive).
#[derive(Debug, Clone)]
pub struct ProviderRegistry {
    providers: HashMap<String, ProviderDescriptor>,
}

impl ProviderRegistry {
    /// Registry with no providers; every lookup falls back to a generic descriptor.
    pub fn empty() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Registry pre-populated with the built-in payment, SMS and email providers.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        for descriptor in BUILTIN_PROVIDERS {
            registry.register(descriptor.clone());
        }
        registry
    }

    /// Add or replace a provider descriptor.
    pub fn register(&mut self, descriptor: ProviderDescriptor) {
        let key = descriptor.id.to_ascii_lowercase();
        if self.providers.insert(key, descriptor).is_some() {
            debug!("[ProviderRegistry] Replaced existing descriptor");
        }
    }

    pub fn get(&self, provider_id: &str) -> Option<&ProviderDescriptor> {
        self.providers.get(&provider_id.to_ascii_lowercase())
    }

    /// Descriptor for `provider_id`, or a generic one if it is not registered.
    pub fn describe(&self, provider_id: &str) -> ProviderDescriptor {
        self.get(provider_id)
            .cloned()
            .unwrap_or_else(|| ProviderDescriptor::generic(provider_id))
    }

    pub fn is_known(&self, provider_id: &str) -> bool {
        self.get(provider_id).is_some()
    }

    /// Registered providers in a category, sorted by display name.
    pub fn by_category(&self, category: ProviderCategory) -> Vec<&ProviderDescriptor> {
        let mut matches: Vec<&ProviderDescriptor> = self
            .providers
            .values()
            .filter(|d| d.category == category)
            .collect();
        matches.sort_by(|a, b| a.display_name.cmp(&b.display_name));
        matches
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}
