//! Environment event types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::environment::{AggregateEnvironmentMode, Environment};

/// Events emitted by the switch coordinator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EnvironmentEvent {
    /// A switch was confirmed by the credential directory.
    Switched {
        environment: Environment,
        /// Aggregate mode after reconciliation (`mixed` if services were skipped)
        mode: AggregateEnvironmentMode,
        partial: bool,
        switched_services: Vec<String>,
        skipped_services: Vec<String>,
        at: DateTime<Utc>,
    },

    /// A switch attempt failed and the previous mode was restored.
    SwitchFailed {
        target: Environment,
        restored_mode: AggregateEnvironmentMode,
        code: String,
        message: String,
        at: DateTime<Utc>,
    },

    /// The aggregate mode changed after a service-list refresh.
    ModeChanged {
        previous: AggregateEnvironmentMode,
        current: AggregateEnvironmentMode,
    },
}

impl EnvironmentEvent {
    /// Creates a Switched event stamped with the current time.
    pub fn switched(
        environment: Environment,
        mode: AggregateEnvironmentMode,
        partial: bool,
        switched_services: Vec<String>,
        skipped_services: Vec<String>,
    ) -> Self {
        Self::Switched {
            environment,
            mode,
            partial,
            switched_services,
            skipped_services,
            at: Utc::now(),
        }
    }

    /// Creates a SwitchFailed event stamped with the current time.
    pub fn switch_failed(
        target: Environment,
        restored_mode: AggregateEnvironmentMode,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::SwitchFailed {
            target,
            restored_mode,
            code: code.into(),
            message: message.into(),
            at: Utc::now(),
        }
    }

    /// Creates a ModeChanged event.
    pub fn mode_changed(previous: AggregateEnvironmentMode, current: AggregateEnvironmentMode) -> Self {
        Self::ModeChanged { previous, current }
    }
}
