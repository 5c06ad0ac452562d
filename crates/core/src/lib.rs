//! Apigate Core - environment switching for the gateway dashboard.
//!
//! This crate holds the domain types and the switch coordinator. It is
//! transport-agnostic: the credential directory, token source, preference
//! storage and event delivery are all traits, implemented by the
//! `apigate-directory` crate or by the host application.

pub mod decision;
pub mod directory;
pub mod environment;
pub mod errors;
pub mod events;
pub mod preferences;
pub mod providers;
pub mod readiness;
pub mod switch;

#[cfg(test)]
mod test_support;

// Re-export the types most callers need
pub use environment::{AggregateEnvironmentMode, Environment, Service};
pub use switch::{SwitchCoordinator, SwitchOutcome};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
