//! Live-transition precheck.

use std::sync::Arc;

use log::{debug, warn};

use super::ReadinessReport;
use crate::directory::CredentialDirectory;

/// Asks the credential directory which services could go live right now.
pub struct ReadinessChecker {
    directory: Arc<dyn CredentialDirectory>,
}

impl ReadinessChecker {
    pub fn new(directory: Arc<dyn CredentialDirectory>) -> Self {
        Self { directory }
    }

    /// Run the precheck with an already-acquired token.
    ///
    /// Fails closed: any transport, authorization or parse error yields
    /// [`ReadinessReport::fail_closed`] rather than an error.
    pub async fn check_can_go_live(&self, token: &str) -> ReadinessReport {
        match self.directory.environment_readiness(token).await {
            Ok(report) => {
                debug!(
                    "[ReadinessChecker] canGoLive={}, ready={:?}, missing={:?}",
                    report.can_go_live, report.services_with_live, report.services_missing_live
                );
                report
            }
            Err(e) => {
                warn!(
                    "[ReadinessChecker] Readiness check failed, treating as not ready: {}",
                    e
                );
                ReadinessReport::fail_closed()
            }
        }
    }
}
