//! Session token sources.

use apigate_core::directory::TokenProvider;
use async_trait::async_trait;

/// Environment variable read by [`EnvTokenProvider`].
pub const SESSION_TOKEN_VAR: &str = "APIGATE_SESSION_TOKEN";

/// Always hands out the same token. Useful for scripts and tests.
#[derive(Debug, Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> apigate_core::Result<String> {
        Ok(self.token.clone())
    }
}

/// Reads the token from an environment variable on every call, so a rotated
/// token is picked up without rebuilding the coordinator.
#[derive(Debug, Clone)]
pub struct EnvTokenProvider {
    var: String,
}

impl EnvTokenProvider {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvTokenProvider {
    fn default() -> Self {
        Self::new(SESSION_TOKEN_VAR)
    }
}

#[async_trait]
impl TokenProvider for EnvTokenProvider {
    async fn access_token(&self) -> apigate_core::Result<String> {
        match std::env::var(&self.var) {
            Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(apigate_core::Error::authentication(format!(
                "No session token in {}",
                self.var
            ))),
        }
    }
}
