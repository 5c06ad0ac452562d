//! Provider descriptor model.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// What a provider does for the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderCategory {
    Payments,
    Sms,
    Email,
    Other,
}

impl fmt::Display for ProviderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Payments => write!(f, "Payments"),
            Self::Sms => write!(f, "SMS"),
            Self::Email => write!(f, "Email"),
            Self::Other => write!(f, "Other"),
        }
    }
}

/// Presentation and setup metadata for a provider, keyed by provider id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderDescriptor {
    /// Provider id as it appears in `Service::service_name`
    pub id: Cow<'static, str>,
    pub display_name: Cow<'static, str>,
    pub category: ProviderCategory,
    /// Dashboard route where live credentials for this provider are configured
    pub setup_route: Cow<'static, str>,
    pub icon: Cow<'static, str>,
    /// Brand color as a hex string
    pub color: Cow<'static, str>,
}

impl ProviderDescriptor {
    pub const fn builtin(
        id: &'static str,
        display_name: &'static str,
        category: ProviderCategory,
        setup_route: &'static str,
        icon: &'static str,
        color: &'static str,
    ) -> Self {
        Self {
            id: Cow::Borrowed(id),
            display_name: Cow::Borrowed(display_name),
            category,
            setup_route: Cow::Borrowed(setup_route),
            icon: Cow::Borrowed(icon),
            color: Cow::Borrowed(color),
        }
    }

    /// Descriptor for a provider the registry does not know about.
    pub fn generic(id: &str) -> Self {
        Self {
            id: Cow::Owned(id.to_string()),
            display_name: Cow::Owned(title_case(id)),
            category: ProviderCategory::Other,
            setup_route: Cow::Owned(format!("/services/{}/setup", id)),
            icon: Cow::Borrowed("plug"),
            color: Cow::Borrowed("#6b7280"),
        }
    }
}

fn title_case(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
