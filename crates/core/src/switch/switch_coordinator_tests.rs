//! Tests for the SwitchCoordinator.
//!
//! These exercise the full flow against in-memory collaborators:
//!
//! 1. Test switches never run the readiness precheck
//! 2. Live switches run the precheck and either switch fully or stop at a decision
//! 3. The aggregate mode moves only after the directory confirms
//! 4. Failures restore the exact pre-attempt mode and surface an error
//! 5. Token failures abort before any remote mutation

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::directory::{CredentialDirectory, SwitchRequest, SwitchResponse};
use crate::environment::{AggregateEnvironmentMode, Environment, Service};
use crate::errors::{Error, Result};
use crate::events::{EnvironmentEvent, MockEventSink};
use crate::preferences::{InMemoryPreferenceStore, PreferenceStore, StoredPreference};
use crate::readiness::ReadinessReport;
use crate::switch::{SwitchCoordinator, SwitchErrorCode, SwitchOutcome, SwitchPhase};
use crate::test_support::{MockDirectory, MockTokenProvider};

// =========================================================================
// Fixtures
// =========================================================================

struct Harness {
    directory: MockDirectory,
    tokens: MockTokenProvider,
    preferences: InMemoryPreferenceStore,
    events: MockEventSink,
    coordinator: SwitchCoordinator,
}

fn harness() -> Harness {
    harness_with(MockDirectory::new(), InMemoryPreferenceStore::new())
}

fn harness_with(directory: MockDirectory, preferences: InMemoryPreferenceStore) -> Harness {
    let tokens = MockTokenProvider::new();
    let events = MockEventSink::new();
    let coordinator = SwitchCoordinator::new(
        Arc::new(directory.clone()),
        Arc::new(tokens.clone()),
        Arc::new(preferences.clone()),
        Arc::new(events.clone()),
    );
    Harness {
        directory,
        tokens,
        preferences,
        events,
        coordinator,
    }
}

fn svc(name: &str, env: Environment) -> Service {
    Service::new(format!("{}_{}", name, env), name, env)
}

fn mixed_services() -> Vec<Service> {
    vec![
        svc("razorpay", Environment::Live),
        svc("twilio", Environment::Test),
    ]
}

fn ready_report() -> ReadinessReport {
    ReadinessReport {
        can_go_live: true,
        services_with_live: vec!["razorpay".to_string(), "twilio".to_string()],
        services_missing_live: vec![],
    }
}

fn partial_report() -> ReadinessReport {
    ReadinessReport {
        can_go_live: false,
        services_with_live: vec!["razorpay".to_string()],
        services_missing_live: vec!["twilio".to_string()],
    }
}

/// Directory whose switch call blocks until released, to observe in-flight state.
#[derive(Clone)]
struct GatedDirectory {
    inner: MockDirectory,
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

impl GatedDirectory {
    fn new(inner: MockDirectory) -> Self {
        Self {
            inner,
            entered: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }
}

#[async_trait]
impl CredentialDirectory for GatedDirectory {
    async fn list_services(&self, token: &str) -> Result<Vec<Service>> {
        self.inner.list_services(token).await
    }

    async fn environment_readiness(&self, token: &str) -> Result<ReadinessReport> {
        self.inner.environment_readiness(token).await
    }

    async fn switch_environment(
        &self,
        token: &str,
        request: &SwitchRequest,
    ) -> Result<SwitchResponse> {
        self.entered.notify_one();
        self.release.notified().await;
        self.inner.switch_environment(token, request).await
    }
}

struct FailingPreferenceStore;

impl PreferenceStore for FailingPreferenceStore {
    fn load(&self) -> Result<Option<StoredPreference>> {
        Err(Error::preference("disk unavailable"))
    }

    fn save(&self, _preference: StoredPreference) -> Result<()> {
        Err(Error::preference("disk unavailable"))
    }
}

// =========================================================================
// Deriving and seeding the mode
// =========================================================================

#[test]
fn test_mixed_services_without_preference_derive_mixed() {
    let h = harness();
    assert_eq!(h.coordinator.initialize(), AggregateEnvironmentMode::Test);
    assert_eq!(
        h.coordinator.apply_services(mixed_services()),
        AggregateEnvironmentMode::Mixed
    );
    assert_eq!(h.coordinator.snapshot().counts.total(), 2);
}

#[test]
fn test_initialize_seeds_mode_from_preference() {
    let h = harness_with(
        MockDirectory::new(),
        InMemoryPreferenceStore::with_value(Environment::Live),
    );
    assert_eq!(h.coordinator.initialize(), AggregateEnvironmentMode::Live);
    assert_eq!(h.coordinator.mode(), AggregateEnvironmentMode::Live);
}

#[test]
fn test_stored_preference_overrides_derived_mode() {
    let h = harness_with(
        MockDirectory::new(),
        InMemoryPreferenceStore::with_value(Environment::Live),
    );
    assert_eq!(
        h.coordinator.apply_services(mixed_services()),
        AggregateEnvironmentMode::Live
    );
    // No change from the seeded mode, so nothing to announce
    assert!(h.events.is_empty());
}

#[test]
fn test_mode_change_is_announced() {
    let h = harness();
    h.coordinator.apply_services(mixed_services());
    assert_eq!(
        h.events.events(),
        vec![EnvironmentEvent::mode_changed(
            AggregateEnvironmentMode::Test,
            AggregateEnvironmentMode::Mixed
        )]
    );
}

#[test]
fn test_unreadable_preference_is_ignored() {
    let coordinator = SwitchCoordinator::new(
        Arc::new(MockDirectory::new()),
        Arc::new(MockTokenProvider::new()),
        Arc::new(FailingPreferenceStore),
        Arc::new(MockEventSink::new()),
    );
    assert_eq!(coordinator.initialize(), AggregateEnvironmentMode::Test);
    assert_eq!(
        coordinator.apply_services(mixed_services()),
        AggregateEnvironmentMode::Mixed
    );
}

#[tokio::test]
async fn test_refresh_services_fetches_and_derives() {
    let h = harness();
    h.directory.set_services(vec![
        svc("razorpay", Environment::Live),
        svc("resend", Environment::Live),
    ]);

    let mode = h.coordinator.refresh_services().await.unwrap();

    assert_eq!(mode, AggregateEnvironmentMode::Live);
    assert_eq!(h.directory.list_calls(), 1);
    assert_eq!(h.coordinator.services().len(), 2);
}

#[tokio::test]
async fn test_refresh_services_propagates_directory_error() {
    let h = harness();
    h.directory.set_fail_list(true);
    assert!(h.coordinator.refresh_services().await.is_err());
}

// =========================================================================
// Switching to test
// =========================================================================

#[tokio::test]
async fn test_switch_to_test_never_prechecks() {
    let h = harness();
    h.coordinator.apply_services(mixed_services());

    let outcome = h.coordinator.request_switch(Environment::Test).await;

    assert!(outcome.is_switched());
    assert_eq!(h.directory.readiness_calls(), 0);
    assert_eq!(
        h.directory.switch_requests(),
        vec![SwitchRequest::full(Environment::Test)]
    );
    assert_eq!(h.coordinator.mode(), AggregateEnvironmentMode::Test);
    assert_eq!(h.preferences.read().unwrap(), Some(Environment::Test));
    assert_eq!(h.coordinator.phase(), SwitchPhase::Idle);
}

// =========================================================================
// Switching to live
// =========================================================================

#[tokio::test]
async fn test_ready_live_switch_is_full() {
    let h = harness();
    h.directory.set_readiness(ready_report());

    let outcome = h.coordinator.request_switch(Environment::Live).await;

    let requests = h.directory.switch_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].environment, Environment::Live);
    assert_eq!(requests[0].partial_switch, None);
    match outcome {
        SwitchOutcome::Switched(summary) => {
            assert_eq!(summary.mode, AggregateEnvironmentMode::Live);
            assert!(!summary.partial);
        }
        other => panic!("Expected Switched, got {:?}", other),
    }
    assert_eq!(h.coordinator.mode(), AggregateEnvironmentMode::Live);
}

#[tokio::test]
async fn test_mode_moves_only_after_switch_confirms() {
    let inner = MockDirectory::new();
    inner.set_readiness(ready_report());
    let gated = GatedDirectory::new(inner.clone());
    let coordinator = SwitchCoordinator::new(
        Arc::new(gated.clone()),
        Arc::new(MockTokenProvider::new()),
        Arc::new(InMemoryPreferenceStore::new()),
        Arc::new(MockEventSink::new()),
    );
    coordinator.apply_services(mixed_services());

    let (outcome, observed) = tokio::join!(coordinator.request_switch(Environment::Live), async {
        gated.entered.notified().await;
        let in_flight = (coordinator.mode(), coordinator.phase());
        gated.release.notify_one();
        in_flight
    });

    let (mode_in_flight, phase_in_flight) = observed;
    assert_eq!(mode_in_flight, AggregateEnvironmentMode::Mixed);
    assert_eq!(phase_in_flight.name(), "Switching");
    assert!(outcome.is_switched());
    assert_eq!(coordinator.mode(), AggregateEnvironmentMode::Live);
}

#[tokio::test]
async fn test_second_request_while_switching_is_rejected() {
    let inner = MockDirectory::new();
    let gated = GatedDirectory::new(inner.clone());
    let coordinator = SwitchCoordinator::new(
        Arc::new(gated.clone()),
        Arc::new(MockTokenProvider::new()),
        Arc::new(InMemoryPreferenceStore::new()),
        Arc::new(MockEventSink::new()),
    );

    let (first, second) = tokio::join!(coordinator.request_switch(Environment::Test), async {
        gated.entered.notified().await;
        let second = coordinator.request_switch(Environment::Live).await;
        gated.release.notify_one();
        second
    });

    assert!(first.is_switched());
    assert_eq!(second, SwitchOutcome::Rejected);
    assert_eq!(inner.switch_requests().len(), 1);
    assert_eq!(inner.readiness_calls(), 0);
}

#[tokio::test]
async fn test_unready_live_switch_opens_decision() {
    let h = harness();
    h.directory.set_readiness(partial_report());

    let outcome = h.coordinator.request_switch(Environment::Live).await;

    match outcome {
        SwitchOutcome::DecisionRequired(surface) => {
            assert!(surface.can_confirm_partial());
            assert_eq!(surface.missing[0].display_name, "Twilio");
        }
        other => panic!("Expected DecisionRequired, got {:?}", other),
    }
    assert!(h.directory.switch_requests().is_empty());
    assert_eq!(h.coordinator.phase().name(), "AwaitingDecision");
    assert!(h.coordinator.pending_decision().is_some());
    assert_eq!(h.preferences.write_count(), 0);
}

#[tokio::test]
async fn test_request_while_awaiting_decision_is_rejected() {
    let h = harness();
    h.directory.set_readiness(partial_report());
    h.coordinator.request_switch(Environment::Live).await;

    let outcome = h.coordinator.request_switch(Environment::Test).await;

    assert_eq!(outcome, SwitchOutcome::Rejected);
    assert!(h.directory.switch_requests().is_empty());
}

#[tokio::test]
async fn test_cancel_decision_changes_nothing() {
    let h = harness();
    h.coordinator.apply_services(mixed_services());
    h.directory.set_readiness(partial_report());
    h.coordinator.request_switch(Environment::Live).await;

    assert_eq!(h.coordinator.cancel_decision(), SwitchOutcome::Cancelled);

    assert_eq!(h.coordinator.phase(), SwitchPhase::Idle);
    assert_eq!(h.coordinator.mode(), AggregateEnvironmentMode::Mixed);
    assert!(h.coordinator.pending_decision().is_none());
    assert!(h.directory.switch_requests().is_empty());
    assert_eq!(h.preferences.write_count(), 0);

    // Nothing left to cancel
    assert_eq!(h.coordinator.cancel_decision(), SwitchOutcome::Rejected);
}

#[tokio::test]
async fn test_partial_switch_leaves_mode_mixed() {
    let h = harness();
    h.coordinator.apply_services(mixed_services());
    h.directory.set_readiness(partial_report());
    h.directory.set_switch_response(SwitchResponse {
        status: "success".to_string(),
        environment: Some(Environment::Live),
        switched_services: vec!["razorpay".to_string()],
        skipped_services: vec!["twilio".to_string()],
        message: None,
    });

    h.coordinator.request_switch(Environment::Live).await;
    let outcome = h.coordinator.confirm_partial().await;

    let requests = h.directory.switch_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].partial_switch, Some(true));
    assert_eq!(requests[0].services, vec!["razorpay"]);
    match outcome {
        SwitchOutcome::Switched(summary) => {
            assert!(summary.partial);
            assert_eq!(summary.skipped_services, vec!["twilio"]);
        }
        other => panic!("Expected Switched, got {:?}", other),
    }
    assert_eq!(h.coordinator.mode(), AggregateEnvironmentMode::Mixed);
    assert!(h.coordinator.pending_decision().is_none());
}

#[tokio::test]
async fn test_partial_switch_with_nothing_skipped_is_live() {
    let h = harness();
    h.directory.set_readiness(partial_report());
    h.directory.set_switch_response(SwitchResponse {
        status: "success".to_string(),
        environment: Some(Environment::Live),
        switched_services: vec!["razorpay".to_string()],
        skipped_services: vec![],
        message: None,
    });

    h.coordinator.request_switch(Environment::Live).await;
    h.coordinator.confirm_partial().await;

    assert_eq!(h.coordinator.mode(), AggregateEnvironmentMode::Live);
}

#[tokio::test]
async fn test_derived_mode_wins_after_partial_switch() {
    let h = harness();
    h.directory.set_readiness(partial_report());
    h.directory.set_switch_response(SwitchResponse {
        status: "success".to_string(),
        environment: Some(Environment::Live),
        switched_services: vec!["razorpay".to_string()],
        skipped_services: vec!["twilio".to_string()],
        message: None,
    });
    h.coordinator.request_switch(Environment::Live).await;
    h.coordinator.confirm_partial().await;

    // The preference says live, but the refreshed list is still mixed.
    assert_eq!(h.preferences.read().unwrap(), Some(Environment::Live));
    assert_eq!(
        h.coordinator.apply_services(mixed_services()),
        AggregateEnvironmentMode::Mixed
    );
}

#[tokio::test]
async fn test_partial_switch_exception_survives_reload() {
    let h = harness();
    h.directory.set_readiness(partial_report());
    h.directory.set_switch_response(SwitchResponse {
        status: "success".to_string(),
        environment: Some(Environment::Live),
        switched_services: vec!["razorpay".to_string()],
        skipped_services: vec!["twilio".to_string()],
        message: None,
    });
    h.coordinator.request_switch(Environment::Live).await;
    h.coordinator.confirm_partial().await;
    assert_eq!(
        h.preferences.load().unwrap(),
        Some(StoredPreference::partial(Environment::Live))
    );

    // A fresh session over the same store
    let reloaded = harness_with(MockDirectory::new(), h.preferences.clone());
    assert_eq!(reloaded.coordinator.initialize(), AggregateEnvironmentMode::Mixed);
    assert_eq!(
        reloaded.coordinator.apply_services(mixed_services()),
        AggregateEnvironmentMode::Mixed
    );

    // Once every service is live the derived mode follows
    assert_eq!(
        reloaded.coordinator.apply_services(vec![
            svc("razorpay", Environment::Live),
            svc("twilio", Environment::Live),
        ]),
        AggregateEnvironmentMode::Live
    );
}

#[tokio::test]
async fn test_full_switch_clears_partial_marker() {
    let h = harness();
    h.preferences
        .save(StoredPreference::partial(Environment::Live))
        .unwrap();

    let outcome = h.coordinator.request_switch(Environment::Test).await;

    assert!(outcome.is_switched());
    assert_eq!(
        h.preferences.load().unwrap(),
        Some(StoredPreference::full(Environment::Test))
    );

    let reloaded = harness_with(MockDirectory::new(), h.preferences.clone());
    assert_eq!(
        reloaded.coordinator.apply_services(mixed_services()),
        AggregateEnvironmentMode::Test
    );
}

#[tokio::test]
async fn test_cancel_applies_services_received_during_decision() {
    let h = harness();
    h.coordinator.apply_services(mixed_services());
    h.directory.set_readiness(partial_report());
    h.coordinator.request_switch(Environment::Live).await;
    h.events.clear();

    let all_live = vec![
        svc("razorpay", Environment::Live),
        svc("twilio", Environment::Live),
    ];
    assert_eq!(
        h.coordinator.apply_services(all_live),
        AggregateEnvironmentMode::Mixed
    );

    assert_eq!(h.coordinator.cancel_decision(), SwitchOutcome::Cancelled);

    assert_eq!(h.coordinator.mode(), AggregateEnvironmentMode::Live);
    assert_eq!(
        h.events.events(),
        vec![EnvironmentEvent::mode_changed(
            AggregateEnvironmentMode::Mixed,
            AggregateEnvironmentMode::Live
        )]
    );
    assert!(h.directory.switch_requests().is_empty());
}

#[tokio::test]
async fn test_failed_precheck_is_fail_closed() {
    let h = harness();
    h.directory.set_readiness(ready_report());
    h.directory.set_fail_readiness(true);

    let outcome = h.coordinator.request_switch(Environment::Live).await;

    match outcome {
        SwitchOutcome::DecisionRequired(surface) => {
            assert!(!surface.can_confirm_partial());
            assert_eq!(surface.report, ReadinessReport::fail_closed());
        }
        other => panic!("Expected DecisionRequired, got {:?}", other),
    }
    assert!(h.directory.switch_requests().is_empty());

    // Cancel-only: a partial confirm has nothing to switch
    assert_eq!(h.coordinator.confirm_partial().await, SwitchOutcome::Rejected);
    assert!(h.directory.switch_requests().is_empty());
    assert_eq!(h.coordinator.cancel_decision(), SwitchOutcome::Cancelled);
}

// =========================================================================
// Failures
// =========================================================================

#[tokio::test]
async fn test_switch_failure_restores_previous_mode() {
    let h = harness();
    h.coordinator.apply_services(mixed_services());
    h.events.clear();
    h.directory.set_readiness(ready_report());
    h.directory.set_fail_switch(true);

    let before = h.coordinator.mode();
    let outcome = h.coordinator.request_switch(Environment::Live).await;

    assert_eq!(h.coordinator.mode(), before);
    match outcome {
        SwitchOutcome::Failed(err) => {
            assert_eq!(err.code, SwitchErrorCode::SwitchRequestFailure);
        }
        other => panic!("Expected Failed, got {:?}", other),
    }
    assert_eq!(
        h.coordinator.last_error().map(|e| e.code),
        Some(SwitchErrorCode::SwitchRequestFailure)
    );
    assert_eq!(h.coordinator.phase(), SwitchPhase::Idle);
    assert_eq!(h.preferences.write_count(), 0);
    assert!(matches!(
        h.events.events().as_slice(),
        [EnvironmentEvent::SwitchFailed {
            restored_mode: AggregateEnvironmentMode::Mixed,
            ..
        }]
    ));
}

#[tokio::test]
async fn test_non_success_status_is_a_failure() {
    let h = harness();
    h.coordinator.apply_services(vec![svc("twilio", Environment::Live)]);
    h.directory.set_switch_response(SwitchResponse {
        status: "error".to_string(),
        environment: None,
        switched_services: vec![],
        skipped_services: vec![],
        message: Some("Twilio test credentials are missing".to_string()),
    });

    let outcome = h.coordinator.request_switch(Environment::Test).await;

    match outcome {
        SwitchOutcome::Failed(err) => {
            assert_eq!(err.message, "Twilio test credentials are missing");
        }
        other => panic!("Expected Failed, got {:?}", other),
    }
    assert_eq!(h.coordinator.mode(), AggregateEnvironmentMode::Live);
}

#[tokio::test]
async fn test_token_failure_makes_no_switch_call() {
    let h = harness();
    h.tokens.set_fail(true);

    let outcome = h.coordinator.request_switch(Environment::Test).await;

    match outcome {
        SwitchOutcome::Failed(err) => {
            assert_eq!(err.code, SwitchErrorCode::AuthenticationFailure);
        }
        other => panic!("Expected Failed, got {:?}", other),
    }
    assert!(h.directory.switch_requests().is_empty());
    assert_eq!(h.coordinator.phase(), SwitchPhase::Idle);
}

#[tokio::test]
async fn test_token_failure_before_precheck_aborts() {
    let h = harness();
    h.tokens.set_fail(true);

    let outcome = h.coordinator.request_switch(Environment::Live).await;

    assert!(matches!(outcome, SwitchOutcome::Failed(_)));
    assert_eq!(h.directory.readiness_calls(), 0);
    assert!(h.directory.switch_requests().is_empty());
    assert_eq!(h.coordinator.phase(), SwitchPhase::Idle);
}

#[tokio::test]
async fn test_token_expiring_after_precheck_makes_no_switch_call() {
    let h = harness();
    h.coordinator.apply_services(mixed_services());
    h.directory.set_readiness(ready_report());
    h.tokens.set_fail_after(1);

    let outcome = h.coordinator.request_switch(Environment::Live).await;

    assert_eq!(h.directory.readiness_calls(), 1);
    assert!(h.directory.switch_requests().is_empty());
    assert!(matches!(outcome, SwitchOutcome::Failed(_)));
    assert_eq!(h.coordinator.mode(), AggregateEnvironmentMode::Mixed);
    assert_eq!(h.coordinator.phase(), SwitchPhase::Idle);
}

#[tokio::test]
async fn test_empty_token_is_an_authentication_failure() {
    let h = harness();
    h.tokens.set_empty(true);

    let outcome = h.coordinator.request_switch(Environment::Test).await;

    assert_eq!(
        h.coordinator.last_error().map(|e| e.code),
        Some(SwitchErrorCode::AuthenticationFailure)
    );
    assert!(matches!(outcome, SwitchOutcome::Failed(_)));
    assert!(h.directory.switch_requests().is_empty());
}

#[tokio::test]
async fn test_error_is_cleared_by_next_attempt() {
    let h = harness();
    h.directory.set_fail_switch(true);
    h.coordinator.request_switch(Environment::Test).await;
    assert!(h.coordinator.last_error().is_some());

    h.directory.set_fail_switch(false);
    let outcome = h.coordinator.request_switch(Environment::Test).await;

    assert!(outcome.is_switched());
    assert!(h.coordinator.last_error().is_none());
}

#[tokio::test]
async fn test_preference_write_failure_does_not_fail_switch() {
    let directory = MockDirectory::new();
    let coordinator = SwitchCoordinator::new(
        Arc::new(directory.clone()),
        Arc::new(MockTokenProvider::new()),
        Arc::new(FailingPreferenceStore),
        Arc::new(MockEventSink::new()),
    );

    let outcome = coordinator.request_switch(Environment::Test).await;

    assert!(outcome.is_switched());
    assert_eq!(coordinator.mode(), AggregateEnvironmentMode::Test);
}

// =========================================================================
// End-to-end
// =========================================================================

#[tokio::test]
async fn test_mixed_to_live_scenario() {
    let h = harness();
    h.directory.set_services(mixed_services());
    h.directory.set_readiness(ready_report());

    assert_eq!(
        h.coordinator.refresh_services().await.unwrap(),
        AggregateEnvironmentMode::Mixed
    );

    // After the switch the directory reports both services live.
    h.directory.set_services(vec![
        svc("razorpay", Environment::Live),
        svc("twilio", Environment::Test).with_active_environment(Environment::Live),
    ]);
    let outcome = h.coordinator.request_switch(Environment::Live).await;

    assert!(outcome.is_switched());
    assert_eq!(h.coordinator.mode(), AggregateEnvironmentMode::Live);
    assert_eq!(h.preferences.read().unwrap(), Some(Environment::Live));

    // Precheck and mutation each got their own token, plus the post-switch refresh
    assert_eq!(
        h.directory.tokens_seen(),
        vec!["token-1", "token-2", "token-3", "token-3"]
    );
    assert_eq!(h.directory.list_calls(), 2);
    assert_eq!(
        h.coordinator.services()[1].effective_environment(),
        Environment::Live
    );

    let switched: Vec<EnvironmentEvent> = h
        .events
        .events()
        .into_iter()
        .filter(|e| matches!(e, EnvironmentEvent::Switched { .. }))
        .collect();
    assert_eq!(switched.len(), 1);
}
