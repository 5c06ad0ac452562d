//! Switch state machine.
//!
//! Phases and inputs are plain enums and [`transition`] is a pure function,
//! so the whole table can be exercised without any I/O. The coordinator owns
//! the current phase and performs the side effects each phase calls for.
//!
//! | From             | Input                          | To                          |
//! |------------------|--------------------------------|-----------------------------|
//! | Idle             | Request(live)                  | Checking                    |
//! | Idle             | Request(test)                  | Switching (full)            |
//! | Checking         | ReadinessReported(ready)       | Switching (full)            |
//! | Checking         | ReadinessReported(not ready)   | AwaitingDecision            |
//! | Checking         | Aborted                        | Idle                        |
//! | AwaitingDecision | Cancel                         | Idle                        |
//! | AwaitingDecision | ConfirmPartial (some ready)    | Switching (partial)         |
//! | Switching        | SwitchReturned                 | Reconciling                 |
//! | Switching        | Aborted                        | Idle                        |
//! | Reconciling      | Settled                        | Idle                        |

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::directory::SwitchRequest;
use crate::environment::{AggregateEnvironmentMode, Environment};
use crate::readiness::ReadinessReport;

/// Current phase of the coordinator.
///
/// Every phase but `Idle` carries the aggregate mode captured when the
/// transition began, which is what a failure restores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "camelCase")]
pub enum SwitchPhase {
    #[default]
    Idle,
    #[serde(rename_all = "camelCase")]
    Checking {
        target: Environment,
        previous_mode: AggregateEnvironmentMode,
    },
    #[serde(rename_all = "camelCase")]
    AwaitingDecision {
        report: ReadinessReport,
        previous_mode: AggregateEnvironmentMode,
    },
    #[serde(rename_all = "camelCase")]
    Switching {
        request: SwitchRequest,
        previous_mode: AggregateEnvironmentMode,
    },
    #[serde(rename_all = "camelCase")]
    Reconciling {
        request: SwitchRequest,
        previous_mode: AggregateEnvironmentMode,
    },
}

impl SwitchPhase {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Checking { .. } => "Checking",
            Self::AwaitingDecision { .. } => "AwaitingDecision",
            Self::Switching { .. } => "Switching",
            Self::Reconciling { .. } => "Reconciling",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// True while a remote call is outstanding or its result is being applied.
    ///
    /// Triggering controls should be disabled for the duration.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            Self::Checking { .. } | Self::Switching { .. } | Self::Reconciling { .. }
        )
    }

    pub fn previous_mode(&self) -> Option<AggregateEnvironmentMode> {
        match self {
            Self::Idle => None,
            Self::Checking { previous_mode, .. }
            | Self::AwaitingDecision { previous_mode, .. }
            | Self::Switching { previous_mode, .. }
            | Self::Reconciling { previous_mode, .. } => Some(*previous_mode),
        }
    }
}

/// Inputs driving the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchInput {
    /// The user asked for `target`; `current_mode` is captured for rollback.
    Request {
        target: Environment,
        current_mode: AggregateEnvironmentMode,
    },
    ReadinessReported(ReadinessReport),
    Cancel,
    ConfirmPartial,
    SwitchReturned,
    Settled,
    /// Token acquisition failed before any remote mutation.
    Aborted,
}

impl SwitchInput {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Request { .. } => "Request",
            Self::ReadinessReported(_) => "ReadinessReported",
            Self::Cancel => "Cancel",
            Self::ConfirmPartial => "ConfirmPartial",
            Self::SwitchReturned => "SwitchReturned",
            Self::Settled => "Settled",
            Self::Aborted => "Aborted",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid transition: {input} while {from}")]
pub struct InvalidTransition {
    pub from: &'static str,
    pub input: &'static str,
}

/// Compute the next phase, or reject the input for the current phase.
pub fn transition(
    phase: &SwitchPhase,
    input: &SwitchInput,
) -> Result<SwitchPhase, InvalidTransition> {
    use SwitchInput as I;
    use SwitchPhase as P;

    let next = match (phase, input) {
        (
            P::Idle,
            I::Request {
                target: Environment::Live,
                current_mode,
            },
        ) => P::Checking {
            target: Environment::Live,
            previous_mode: *current_mode,
        },
        // Lowering trust never needs a precheck.
        (
            P::Idle,
            I::Request {
                target: Environment::Test,
                current_mode,
            },
        ) => P::Switching {
            request: SwitchRequest::full(Environment::Test),
            previous_mode: *current_mode,
        },

        (
            P::Checking {
                target,
                previous_mode,
            },
            I::ReadinessReported(report),
        ) => {
            if report.can_go_live {
                P::Switching {
                    request: SwitchRequest::full(*target),
                    previous_mode: *previous_mode,
                }
            } else {
                P::AwaitingDecision {
                    report: report.clone(),
                    previous_mode: *previous_mode,
                }
            }
        }

        (P::AwaitingDecision { .. }, I::Cancel) => P::Idle,
        (
            P::AwaitingDecision {
                report,
                previous_mode,
            },
            I::ConfirmPartial,
        ) if report.has_ready_services() => P::Switching {
            request: SwitchRequest::partial(
                Environment::Live,
                report.services_with_live.clone(),
            ),
            previous_mode: *previous_mode,
        },

        (
            P::Switching {
                request,
                previous_mode,
            },
            I::SwitchReturned,
        ) => P::Reconciling {
            request: request.clone(),
            previous_mode: *previous_mode,
        },

        (P::Checking { .. } | P::Switching { .. }, I::Aborted) => P::Idle,
        (P::Reconciling { .. }, I::Settled) => P::Idle,

        _ => {
            return Err(InvalidTransition {
                from: phase.name(),
                input: input.name(),
            })
        }
    };

    Ok(next)
}
