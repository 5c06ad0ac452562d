//! Switch module - the environment-switching state machine and its coordinator.

mod switch_coordinator;
mod switch_machine;
mod switch_model;

#[cfg(test)]
mod switch_coordinator_tests;

pub use switch_coordinator::SwitchCoordinator;
pub use switch_machine::{transition, InvalidTransition, SwitchInput, SwitchPhase};
pub use switch_model::{
    EnvironmentSnapshot, SwitchError, SwitchErrorCode, SwitchOutcome, SwitchSummary,
};
