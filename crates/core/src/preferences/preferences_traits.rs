//! Preference store trait.

use serde::{Deserialize, Serialize};

use crate::environment::Environment;
use crate::errors::Result;

/// Key under which the environment preference is stored.
pub const ENVIRONMENT_PREFERENCE_KEY: &str = "environment_preference";

/// Key under which the partial-switch marker is stored.
pub const PARTIAL_SWITCH_KEY: &str = "environment_partial_switch";

/// The last confirmed environment choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPreference {
    pub environment: Environment,
    /// The confirming switch left services behind, so the derived mode wins
    #[serde(default)]
    pub partial: bool,
}

impl StoredPreference {
    pub fn full(environment: Environment) -> Self {
        Self {
            environment,
            partial: false,
        }
    }

    pub fn partial(environment: Environment) -> Self {
        Self {
            environment,
            partial: true,
        }
    }
}

/// Durable storage for the user's last explicit environment choice.
///
/// Only `test` and `live` are storable; `mixed` is always re-derived.
pub trait PreferenceStore: Send + Sync {
    /// Load the stored preference. `None` when nothing has been stored yet.
    fn load(&self) -> Result<Option<StoredPreference>>;

    /// Persist a preference, replacing any previous value.
    fn save(&self, preference: StoredPreference) -> Result<()>;

    /// The stored environment alone.
    fn read(&self) -> Result<Option<Environment>> {
        Ok(self.load()?.map(|p| p.environment))
    }

    /// Store `environment` as a full switch.
    fn write(&self, environment: Environment) -> Result<()> {
        self.save(StoredPreference::full(environment))
    }
}
