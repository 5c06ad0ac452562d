//! Response shapes specific to the HTTP transport.

use apigate_core::Service;
use serde::Deserialize;

/// `GET /services` returns either a bare array or `{ "services": [...] }`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ServicesEnvelope {
    List(Vec<Service>),
    Wrapped { services: Vec<Service> },
}

impl ServicesEnvelope {
    pub(crate) fn into_services(self) -> Vec<Service> {
        match self {
            Self::List(services) | Self::Wrapped { services } => services,
        }
    }
}

/// Error body returned with non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiErrorResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorResponse {
    pub(crate) fn into_message(self) -> Option<String> {
        self.error
            .or(self.message)
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
    }
}
