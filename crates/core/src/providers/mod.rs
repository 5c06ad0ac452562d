//! Providers module - capability registry for connected providers.

mod provider_registry;
mod providers_model;

pub use provider_registry::ProviderRegistry;
pub use providers_model::{ProviderCategory, ProviderDescriptor};
