//! Collaborator traits for the credential directory and the session token source.

use async_trait::async_trait;

use super::{SwitchRequest, SwitchResponse};
use crate::environment::Service;
use crate::errors::Result;
use crate::readiness::ReadinessReport;

/// Backend store of per-service credential sets.
///
/// Every call is authenticated with a bearer token acquired by the caller.
#[async_trait]
pub trait CredentialDirectory: Send + Sync {
    /// `GET services`
    async fn list_services(&self, token: &str) -> Result<Vec<Service>>;

    /// `GET environment-readiness`
    async fn environment_readiness(&self, token: &str) -> Result<ReadinessReport>;

    /// `POST switch-environment`
    async fn switch_environment(
        &self,
        token: &str,
        request: &SwitchRequest,
    ) -> Result<SwitchResponse>;
}

/// Supplies a bearer token for authenticated calls.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}
