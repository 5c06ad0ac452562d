//! Environment module - the test/live data model and the aggregate mode deriver.

mod environment_deriver;
mod environment_model;

pub use environment_deriver::{derive_mode, EnvironmentCounts};
pub use environment_model::{AggregateEnvironmentMode, Environment, Service};
