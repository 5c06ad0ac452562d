//! Outcomes and user-facing errors of the switch coordinator.

use serde::{Deserialize, Serialize};

use super::SwitchPhase;
use crate::decision::DecisionSurface;
use crate::environment::{AggregateEnvironmentMode, Environment, EnvironmentCounts, Service};

/// Failure categories surfaced to the user.
///
/// Readiness-check failures never appear here: they fail closed into a
/// decision surface instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwitchErrorCode {
    /// Token acquisition failed or returned an empty token.
    AuthenticationFailure,
    /// The switch call errored or returned a non-success status.
    SwitchRequestFailure,
}

impl SwitchErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AuthenticationFailure => "AUTHENTICATION_FAILURE",
            Self::SwitchRequestFailure => "SWITCH_REQUEST_FAILURE",
        }
    }
}

/// Error surfaced to the user after a failed switch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchError {
    pub code: SwitchErrorCode,
    pub message: String,
}

impl SwitchError {
    pub fn authentication(message: impl Into<String>) -> Self {
        Self {
            code: SwitchErrorCode::AuthenticationFailure,
            message: message.into(),
        }
    }

    pub fn request_failed(message: impl Into<String>) -> Self {
        Self {
            code: SwitchErrorCode::SwitchRequestFailure,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SwitchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for SwitchError {}

/// What a confirmed switch did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchSummary {
    pub environment: Environment,
    /// Aggregate mode after reconciliation
    pub mode: AggregateEnvironmentMode,
    pub partial: bool,
    pub switched_services: Vec<String>,
    pub skipped_services: Vec<String>,
}

/// Result of a coordinator operation. Switch operations never return `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The directory confirmed the switch.
    Switched(SwitchSummary),
    /// Not every service is ready; the user must cancel or confirm a partial switch.
    DecisionRequired(DecisionSurface),
    /// The user backed out of the decision surface.
    Cancelled,
    /// The attempt failed and the previous mode was restored.
    Failed(SwitchError),
    /// Another operation is in progress, or the action is not valid right now.
    Rejected,
}

impl SwitchOutcome {
    pub fn is_switched(&self) -> bool {
        matches!(self, Self::Switched(_))
    }
}

/// Read model for components displaying the environment state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentSnapshot {
    pub mode: AggregateEnvironmentMode,
    pub phase: SwitchPhase,
    pub services: Vec<Service>,
    pub counts: EnvironmentCounts,
    pub pending_decision: Option<DecisionSurface>,
    pub last_error: Option<SwitchError>,
}
