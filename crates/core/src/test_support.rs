//! Shared mocks for the collaborator traits.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::directory::{CredentialDirectory, SwitchRequest, SwitchResponse, TokenProvider};
use crate::environment::Service;
use crate::errors::{Error, Result};
use crate::readiness::ReadinessReport;

#[derive(Default)]
struct DirectoryState {
    services: Vec<Service>,
    readiness: ReadinessReport,
    switch_response: Option<SwitchResponse>,
    fail_readiness: bool,
    fail_switch: bool,
    fail_list: bool,
    list_calls: usize,
    readiness_calls: usize,
    switch_requests: Vec<SwitchRequest>,
    tokens_seen: Vec<String>,
}

/// In-memory credential directory recording every call it receives.
#[derive(Clone, Default)]
pub struct MockDirectory {
    state: Arc<Mutex<DirectoryState>>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_services(&self, services: Vec<Service>) {
        self.state.lock().unwrap().services = services;
    }

    pub fn set_readiness(&self, report: ReadinessReport) {
        self.state.lock().unwrap().readiness = report;
    }

    pub fn set_switch_response(&self, response: SwitchResponse) {
        self.state.lock().unwrap().switch_response = Some(response);
    }

    pub fn set_fail_readiness(&self, fail: bool) {
        self.state.lock().unwrap().fail_readiness = fail;
    }

    pub fn set_fail_switch(&self, fail: bool) {
        self.state.lock().unwrap().fail_switch = fail;
    }

    pub fn set_fail_list(&self, fail: bool) {
        self.state.lock().unwrap().fail_list = fail;
    }

    pub fn list_calls(&self) -> usize {
        self.state.lock().unwrap().list_calls
    }

    pub fn readiness_calls(&self) -> usize {
        self.state.lock().unwrap().readiness_calls
    }

    pub fn switch_requests(&self) -> Vec<SwitchRequest> {
        self.state.lock().unwrap().switch_requests.clone()
    }

    pub fn tokens_seen(&self) -> Vec<String> {
        self.state.lock().unwrap().tokens_seen.clone()
    }
}

#[async_trait]
impl CredentialDirectory for MockDirectory {
    async fn list_services(&self, token: &str) -> Result<Vec<Service>> {
        let mut state = self.state.lock().unwrap();
        state.list_calls += 1;
        state.tokens_seen.push(token.to_string());
        if state.fail_list {
            return Err(Error::directory("Intentional list failure"));
        }
        Ok(state.services.clone())
    }

    async fn environment_readiness(&self, token: &str) -> Result<ReadinessReport> {
        let mut state = self.state.lock().unwrap();
        state.readiness_calls += 1;
        state.tokens_seen.push(token.to_string());
        if state.fail_readiness {
            return Err(Error::directory("Intentional readiness failure"));
        }
        Ok(state.readiness.clone())
    }

    async fn switch_environment(
        &self,
        token: &str,
        request: &SwitchRequest,
    ) -> Result<SwitchResponse> {
        let mut state = self.state.lock().unwrap();
        state.switch_requests.push(request.clone());
        state.tokens_seen.push(token.to_string());
        if state.fail_switch {
            return Err(Error::directory("Intentional switch failure"));
        }
        Ok(state
            .switch_response
            .clone()
            .unwrap_or_else(|| SwitchResponse {
                status: "success".to_string(),
                environment: Some(request.environment),
                switched_services: request.services.clone(),
                skipped_services: Vec::new(),
                message: None,
            }))
    }
}

/// Token provider handing out numbered tokens, or failing on demand.
#[derive(Clone, Default)]
pub struct MockTokenProvider {
    issued: Arc<Mutex<usize>>,
    fail: Arc<Mutex<bool>>,
    fail_after: Arc<Mutex<Option<usize>>>,
    empty: Arc<Mutex<bool>>,
}

impl MockTokenProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    /// Hand out `count` tokens, then fail every later request.
    pub fn set_fail_after(&self, count: usize) {
        *self.fail_after.lock().unwrap() = Some(count);
    }

    pub fn set_empty(&self, empty: bool) {
        *self.empty.lock().unwrap() = empty;
    }

    pub fn issued(&self) -> usize {
        *self.issued.lock().unwrap()
    }
}

#[async_trait]
impl TokenProvider for MockTokenProvider {
    async fn access_token(&self) -> Result<String> {
        if *self.fail.lock().unwrap() {
            return Err(Error::authentication("Session expired"));
        }
        if *self.empty.lock().unwrap() {
            return Ok(String::new());
        }
        let mut issued = self.issued.lock().unwrap();
        if let Some(limit) = *self.fail_after.lock().unwrap() {
            if *issued >= limit {
                return Err(Error::authentication("Session expired"));
            }
        }
        *issued += 1;
        Ok(format!("token-{}", *issued))
    }
}
