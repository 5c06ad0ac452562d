//! Readiness report model.

use serde::{Deserialize, Serialize};

/// Result of the live-transition precheck.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadinessReport {
    /// True only if every connected service has live credentials
    pub can_go_live: bool,
    /// Service names that already have live credentials
    #[serde(default)]
    pub services_with_live: Vec<String>,
    /// Service names still lacking live credentials
    #[serde(default)]
    pub services_missing_live: Vec<String>,
}

impl ReadinessReport {
    /// The report used whenever readiness could not be confirmed.
    ///
    /// Not ready, with nothing offered as a partial-switch shortcut.
    pub fn fail_closed() -> Self {
        Self {
            can_go_live: false,
            services_with_live: Vec::new(),
            services_missing_live: Vec::new(),
        }
    }

    pub fn has_ready_services(&self) -> bool {
        !self.services_with_live.is_empty()
    }
}
