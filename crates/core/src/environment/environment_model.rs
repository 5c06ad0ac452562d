//! Environment domain models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The environment a credential set belongs to, or is switched to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Sandbox credentials; no real money or messages move.
    #[default]
    Test,
    /// Production credentials.
    Live,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Live => "live",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "test" => Ok(Self::Test),
            "live" => Ok(Self::Live),
            other => Err(format!("Unknown environment '{}'", other)),
        }
    }
}

/// Aggregate environment across every connected service.
///
/// Always derived from the service list (or seeded from the stored
/// preference); never stored authoritatively on the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AggregateEnvironmentMode {
    #[default]
    Test,
    Live,
    /// Services disagree on their effective environment.
    Mixed,
}

impl AggregateEnvironmentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Live => "live",
            Self::Mixed => "mixed",
        }
    }

    /// The single environment this mode stands for, if any.
    pub fn as_environment(&self) -> Option<Environment> {
        match self {
            Self::Test => Some(Environment::Test),
            Self::Live => Some(Environment::Live),
            Self::Mixed => None,
        }
    }
}

impl From<Environment> for AggregateEnvironmentMode {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Test => Self::Test,
            Environment::Live => Self::Live,
        }
    }
}

impl fmt::Display for AggregateEnvironmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A connected provider credential set, as reported by the credential directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    /// Opaque identifier assigned by the directory
    pub id: String,
    /// Provider identity (e.g. "razorpay"); repeats across environments
    pub service_name: String,
    /// Environment this credential record belongs to
    pub environment: Environment,
    /// Environment currently selected for use, when the service holds both
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_environment: Option<Environment>,
}

impl Service {
    pub fn new(
        id: impl Into<String>,
        service_name: impl Into<String>,
        environment: Environment,
    ) -> Self {
        Self {
            id: id.into(),
            service_name: service_name.into(),
            environment,
            active_environment: None,
        }
    }

    pub fn with_active_environment(mut self, active: Environment) -> Self {
        self.active_environment = Some(active);
        self
    }

    /// `active_environment` when set, otherwise the record's own environment.
    pub fn effective_environment(&self) -> Environment {
        self.active_environment.unwrap_or(self.environment)
    }
}
