//! Readiness module - the precheck run before any transition to live.

mod readiness_model;
mod readiness_service;

pub use readiness_model::ReadinessReport;
pub use readiness_service::ReadinessChecker;
