//! Decision surface shown when not every service is ready for live.
//!
//! Render-agnostic: it carries the readiness report enriched with provider
//! descriptors and the set of actions the user may take. A UI layer decides
//! how to draw it.

use serde::{Deserialize, Serialize};

use crate::providers::{ProviderDescriptor, ProviderRegistry};
use crate::readiness::ReadinessReport;

/// Action the user can take from the decision surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DecisionAction {
    /// Back out; nothing is switched.
    Cancel,
    /// Switch only the services that already have live credentials.
    ConfirmPartial,
}

/// Readiness report prepared for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecisionSurface {
    pub report: ReadinessReport,
    pub ready: Vec<ProviderDescriptor>,
    pub missing: Vec<ProviderDescriptor>,
}

impl DecisionSurface {
    pub fn new(report: ReadinessReport, registry: &ProviderRegistry) -> Self {
        let ready = report
            .services_with_live
            .iter()
            .map(|name| registry.describe(name))
            .collect();
        let missing = report
            .services_missing_live
            .iter()
            .map(|name| registry.describe(name))
            .collect();

        Self {
            report,
            ready,
            missing,
        }
    }

    /// Whether a partial switch has anything to switch.
    pub fn can_confirm_partial(&self) -> bool {
        self.report.has_ready_services()
    }

    /// Actions to offer, in display order. Always includes `Cancel`.
    pub fn actions(&self) -> Vec<DecisionAction> {
        if self.can_confirm_partial() {
            vec![DecisionAction::Cancel, DecisionAction::ConfirmPartial]
        } else {
            vec![DecisionAction::Cancel]
        }
    }

    /// Service names a partial switch would be restricted to.
    pub fn partial_targets(&self) -> &[String] {
        &self.report.services_with_live
    }

    /// One-paragraph, plain-text explanation of the situation.
    pub fn summary(&self) -> String {
        if self.ready.is_empty() && self.missing.is_empty() {
            return "Live readiness could not be confirmed. Check your connection and try again."
                .to_string();
        }

        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            parts.push(format!(
                "Live credentials are missing for {}.",
                join_names(&self.missing)
            ));
        }
        if self.ready.is_empty() {
            parts.push("No service is ready to go live yet.".to_string());
        } else {
            parts.push(format!(
                "{} can be switched to live now; the rest will stay in test.",
                join_names(&self.ready)
            ));
        }
        parts.join(" ")
    }
}

fn join_names(descriptors: &[ProviderDescriptor]) -> String {
    let names: Vec<&str> = descriptors
        .iter()
        .map(|d| d.display_name.as_ref())
        .collect();
    match names.as_slice() {
        [] => String::new(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} and {}", init.join(", "), last),
    }
}
