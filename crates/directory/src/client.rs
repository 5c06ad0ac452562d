//! Credential directory API client.
//!
//! Talks to the dashboard REST API for the service list, the live-readiness
//! precheck and the environment switch itself.

use std::time::Duration;

use apigate_core::directory::{CredentialDirectory, SwitchRequest, SwitchResponse};
use apigate_core::readiness::ReadinessReport;
use apigate_core::Service;
use async_trait::async_trait;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::config::DirectoryConfig;
use crate::error::{DirectoryError, Result};
use crate::types::{ApiErrorResponse, ServicesEnvelope};

/// Client for the credential directory API.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    client: reqwest::Client,
    base_url: String,
}

impl DirectoryClient {
    /// Create a new directory client.
    pub fn new(config: DirectoryConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create headers for an API request.
    fn headers(&self, token: &str) -> Result<HeaderMap> {
        if token.trim().is_empty() {
            return Err(DirectoryError::auth("Missing access token"));
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let auth_value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| DirectoryError::auth("Invalid access token format"))?;
        headers.insert(AUTHORIZATION, auth_value);

        Ok(headers)
    }

    /// Parse a JSON response body.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();
        let body = response.text().await?;
        debug!("[Directory] Response ({}): {}", status, body);

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .ok()
                .and_then(ApiErrorResponse::into_message)
                .unwrap_or_else(|| format!("Request failed: {}", body));
            return Err(DirectoryError::api(status.as_u16(), message));
        }

        serde_json::from_str(&body).map_err(|e| {
            log::error!(
                "[Directory] Failed to deserialize response. Body: {}, Error: {}",
                body,
                e
            );
            DirectoryError::Json(e)
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Services
    // ─────────────────────────────────────────────────────────────────────────

    /// List every connected service credential set.
    ///
    /// GET /services
    pub async fn fetch_services(&self, token: &str) -> Result<Vec<Service>> {
        let url = format!("{}/services", self.base_url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers(token)?)
            .send()
            .await?;

        let envelope: ServicesEnvelope = Self::parse_response(response).await?;
        Ok(envelope.into_services())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Environment
    // ─────────────────────────────────────────────────────────────────────────

    /// Ask whether every connected service has live credentials.
    ///
    /// GET /environment-readiness
    pub async fn fetch_readiness(&self, token: &str) -> Result<ReadinessReport> {
        let url = format!("{}/environment-readiness", self.base_url);

        let response = self
            .client
            .get(&url)
            .headers(self.headers(token)?)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Switch services to the requested environment.
    ///
    /// POST /switch-environment
    pub async fn send_switch(
        &self,
        token: &str,
        request: &SwitchRequest,
    ) -> Result<SwitchResponse> {
        if request.is_partial() && request.services.is_empty() {
            return Err(DirectoryError::invalid_request(
                "Partial switch requires at least one service",
            ));
        }

        let url = format!("{}/switch-environment", self.base_url);
        debug!("[Directory] Switching environment: {:?}", request);

        let response = self
            .client
            .post(&url)
            .headers(self.headers(token)?)
            .json(request)
            .send()
            .await?;

        Self::parse_response(response).await
    }
}

#[async_trait]
impl CredentialDirectory for DirectoryClient {
    async fn list_services(&self, token: &str) -> apigate_core::Result<Vec<Service>> {
        Ok(self.fetch_services(token).await?)
    }

    async fn environment_readiness(&self, token: &str) -> apigate_core::Result<ReadinessReport> {
        Ok(self.fetch_readiness(token).await?)
    }

    async fn switch_environment(
        &self,
        token: &str,
        request: &SwitchRequest,
    ) -> apigate_core::Result<SwitchResponse> {
        Ok(self.send_switch(token, request).await?)
    }
}
