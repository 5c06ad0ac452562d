//! Aggregate environment derivation.
//!
//! Everything here is pure: it is called on every render by downstream
//! consumers and must never perform I/O.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::{AggregateEnvironmentMode, Environment, Service};

/// Derive the aggregate mode from a set of services.
///
/// - no services: `Test`
/// - every effective environment equal: that environment
/// - otherwise: `Mixed`
pub fn derive_mode(services: &[Service]) -> AggregateEnvironmentMode {
    let effective: HashSet<Environment> = services
        .iter()
        .map(Service::effective_environment)
        .collect();

    let mut iter = effective.into_iter();
    match (iter.next(), iter.next()) {
        (None, _) => AggregateEnvironmentMode::Test,
        (Some(env), None) => env.into(),
        (Some(_), Some(_)) => AggregateEnvironmentMode::Mixed,
    }
}

/// Per-environment counts, for "3 of 5 services live" style summaries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentCounts {
    pub test: usize,
    pub live: usize,
}

impl EnvironmentCounts {
    pub fn from_services(services: &[Service]) -> Self {
        services
            .iter()
            .fold(Self::default(), |mut counts, service| {
                match service.effective_environment() {
                    Environment::Test => counts.test += 1,
                    Environment::Live => counts.live += 1,
                }
                counts
            })
    }

    pub fn total(&self) -> usize {
        self.test + self.live
    }
}
