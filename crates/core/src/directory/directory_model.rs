//! Wire types for the switch-environment call.

use serde::{Deserialize, Serialize};

use crate::environment::Environment;

const SUCCESS_STATUS: &str = "success";

/// Body of `POST switch-environment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchRequest {
    pub environment: Environment,
    /// Set only for partial switches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partial_switch: Option<bool>,
    /// Services the partial switch is restricted to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<String>,
}

impl SwitchRequest {
    /// Switch every connected service.
    pub fn full(environment: Environment) -> Self {
        Self {
            environment,
            partial_switch: None,
            services: Vec::new(),
        }
    }

    /// Switch only the given services, leaving the rest where they are.
    pub fn partial(environment: Environment, services: Vec<String>) -> Self {
        Self {
            environment,
            partial_switch: Some(true),
            services,
        }
    }

    pub fn is_partial(&self) -> bool {
        self.partial_switch.unwrap_or(false)
    }
}

/// Response of `POST switch-environment`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchResponse {
    pub status: String,
    #[serde(default)]
    pub environment: Option<Environment>,
    #[serde(default)]
    pub switched_services: Vec<String>,
    #[serde(default)]
    pub skipped_services: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SwitchResponse {
    pub fn is_success(&self) -> bool {
        self.status.eq_ignore_ascii_case(SUCCESS_STATUS)
    }
}
