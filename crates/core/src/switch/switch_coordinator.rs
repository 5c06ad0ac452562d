//! Switch Coordinator
//!
//! Orchestrates a test/live switch across every connected service: the
//! readiness precheck, the decision flow for partial switches, the remote
//! switch call and reconciliation of the local view with the directory.
//!
//! The aggregate mode only moves after the directory confirms a switch; a
//! failed attempt restores exactly the mode held when the attempt began.

use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, error, info, warn};

use super::{
    transition, EnvironmentSnapshot, InvalidTransition, SwitchError, SwitchInput, SwitchOutcome,
    SwitchPhase, SwitchSummary,
};
use crate::decision::DecisionSurface;
use crate::directory::{CredentialDirectory, SwitchRequest, SwitchResponse, TokenProvider};
use crate::environment::{
    derive_mode, AggregateEnvironmentMode, Environment, EnvironmentCounts, Service,
};
use crate::errors::{Error, Result};
use crate::events::{EnvironmentEvent, EnvironmentEventSink};
use crate::preferences::{PreferenceStore, StoredPreference};
use crate::providers::ProviderRegistry;
use crate::readiness::ReadinessChecker;

#[derive(Debug, Default)]
struct CoordinatorState {
    phase: SwitchPhase,
    mode: AggregateEnvironmentMode,
    services: Vec<Service>,
    /// A service list has been applied at least once
    services_received: bool,
    /// Preference read at initialization, updated on every confirmed switch
    stored_preference: Option<Environment>,
    initialized: bool,
    /// Last confirmed switch left services behind; derived mode wins over preference.
    /// Persisted with the preference so it survives a reload.
    partial_in_effect: bool,
    pending_decision: Option<DecisionSurface>,
    last_error: Option<SwitchError>,
}

/// Coordinates environment switches for one dashboard session.
///
/// Operations are serialized: a switch request made while another is in
/// flight is rejected, never queued. Internal state is guarded by a mutex that
/// is never held across an `.await`.
pub struct SwitchCoordinator {
    directory: Arc<dyn CredentialDirectory>,
    tokens: Arc<dyn TokenProvider>,
    preferences: Arc<dyn PreferenceStore>,
    events: Arc<dyn EnvironmentEventSink>,
    readiness: ReadinessChecker,
    registry: ProviderRegistry,
    state: Mutex<CoordinatorState>,
}

impl SwitchCoordinator {
    /// Create a coordinator with the built-in provider registry.
    pub fn new(
        directory: Arc<dyn CredentialDirectory>,
        tokens: Arc<dyn TokenProvider>,
        preferences: Arc<dyn PreferenceStore>,
        events: Arc<dyn EnvironmentEventSink>,
    ) -> Self {
        Self {
            readiness: ReadinessChecker::new(directory.clone()),
            directory,
            tokens,
            preferences,
            events,
            registry: ProviderRegistry::with_builtins(),
            state: Mutex::new(CoordinatorState::default()),
        }
    }

    /// Replace the provider registry used to describe services.
    pub fn with_registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = registry;
        self
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PUBLIC API: STATE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Seed the aggregate mode from the stored preference.
    ///
    /// Reads the preference store once; later calls return the current mode
    /// without touching storage.
    pub fn initialize(&self) -> AggregateEnvironmentMode {
        let mut state = self.lock_state();
        self.initialize_locked(&mut state);
        state.mode
    }

    pub fn mode(&self) -> AggregateEnvironmentMode {
        self.lock_state().mode
    }

    pub fn phase(&self) -> SwitchPhase {
        self.lock_state().phase.clone()
    }

    pub fn services(&self) -> Vec<Service> {
        self.lock_state().services.clone()
    }

    pub fn pending_decision(&self) -> Option<DecisionSurface> {
        self.lock_state().pending_decision.clone()
    }

    pub fn last_error(&self) -> Option<SwitchError> {
        self.lock_state().last_error.clone()
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn snapshot(&self) -> EnvironmentSnapshot {
        let state = self.lock_state();
        EnvironmentSnapshot {
            mode: state.mode,
            phase: state.phase.clone(),
            counts: EnvironmentCounts::from_services(&state.services),
            services: state.services.clone(),
            pending_decision: state.pending_decision.clone(),
            last_error: state.last_error.clone(),
        }
    }

    /// Accept a freshly fetched service list and re-derive the aggregate mode.
    ///
    /// A stored preference overrides the derived mode, unless the last
    /// confirmed switch was partial and left services behind. While a switch
    /// is in progress the list is recorded but the mode is left alone.
    pub fn apply_services(&self, services: Vec<Service>) -> AggregateEnvironmentMode {
        let mut state = self.lock_state();
        self.initialize_locked(&mut state);
        state.services = services;
        state.services_received = true;

        if !state.phase.is_idle() {
            debug!(
                "[SwitchCoordinator] Services updated while {}; mode left at {}",
                state.phase.name(),
                state.mode
            );
            return state.mode;
        }

        self.settle_mode(state)
    }

    /// Fetch the service list from the directory and apply it.
    pub async fn refresh_services(&self) -> Result<AggregateEnvironmentMode> {
        let token = self.acquire_token().await?;
        let services = self.directory.list_services(&token).await?;
        debug!("[SwitchCoordinator] Fetched {} services", services.len());
        Ok(self.apply_services(services))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // PUBLIC API: SWITCHING
    // ═══════════════════════════════════════════════════════════════════════════

    /// Request every service be switched to `target`.
    ///
    /// `live` runs the readiness precheck first and may stop at a decision
    /// surface; `test` switches straight away.
    pub async fn request_switch(&self, target: Environment) -> SwitchOutcome {
        let next = {
            let mut state = self.lock_state();
            self.initialize_locked(&mut state);
            let input = SwitchInput::Request {
                target,
                current_mode: state.mode,
            };
            match transition(&state.phase, &input) {
                Ok(next) => {
                    state.phase = next.clone();
                    state.last_error = None;
                    state.pending_decision = None;
                    next
                }
                Err(e) => {
                    debug!("[SwitchCoordinator] Switch to {} rejected: {}", target, e);
                    return SwitchOutcome::Rejected;
                }
            }
        };

        info!("[SwitchCoordinator] Switch to {} requested", target);

        match next {
            SwitchPhase::Checking { previous_mode, .. } => self.run_precheck(previous_mode).await,
            SwitchPhase::Switching {
                request,
                previous_mode,
            } => self.execute_switch(request, previous_mode).await,
            other => self.unexpected_phase(&other),
        }
    }

    /// Back out of the decision surface. Nothing is switched or persisted.
    pub fn cancel_decision(&self) -> SwitchOutcome {
        match self.advance(SwitchInput::Cancel) {
            Ok(_) => {
                let mut state = self.lock_state();
                state.pending_decision = None;
                // Pick up any service list that arrived while the decision was open
                let mode = self.settle_mode(state);
                info!(
                    "[SwitchCoordinator] Partial switch declined (mode: {})",
                    mode
                );
                SwitchOutcome::Cancelled
            }
            Err(e) => {
                debug!("[SwitchCoordinator] Cancel ignored: {}", e);
                SwitchOutcome::Rejected
            }
        }
    }

    /// Switch only the services the precheck reported as ready.
    pub async fn confirm_partial(&self) -> SwitchOutcome {
        match self.advance(SwitchInput::ConfirmPartial) {
            Ok(SwitchPhase::Switching {
                request,
                previous_mode,
            }) => {
                self.lock_state().pending_decision = None;
                info!(
                    "[SwitchCoordinator] Partial switch confirmed for {:?}",
                    request.services
                );
                self.execute_switch(request, previous_mode).await
            }
            Ok(other) => self.unexpected_phase(&other),
            Err(e) => {
                debug!("[SwitchCoordinator] Partial confirm ignored: {}", e);
                SwitchOutcome::Rejected
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL: PHASES
    // ═══════════════════════════════════════════════════════════════════════════

    async fn run_precheck(&self, previous_mode: AggregateEnvironmentMode) -> SwitchOutcome {
        let token = match self.acquire_token().await {
            Ok(token) => token,
            Err(e) => {
                return self.abort(
                    Environment::Live,
                    previous_mode,
                    SwitchError::authentication(e.to_string()),
                )
            }
        };

        let report = self.readiness.check_can_go_live(&token).await;

        match self.advance(SwitchInput::ReadinessReported(report)) {
            Ok(SwitchPhase::Switching {
                request,
                previous_mode,
            }) => self.execute_switch(request, previous_mode).await,
            Ok(SwitchPhase::AwaitingDecision { report, .. }) => {
                let surface = DecisionSurface::new(report, &self.registry);
                info!(
                    "[SwitchCoordinator] Not every service is ready for live: ready={:?}, missing={:?}",
                    surface.report.services_with_live, surface.report.services_missing_live
                );
                self.lock_state().pending_decision = Some(surface.clone());
                SwitchOutcome::DecisionRequired(surface)
            }
            Ok(other) => self.unexpected_phase(&other),
            Err(e) => {
                error!("[SwitchCoordinator] {}", e);
                SwitchOutcome::Rejected
            }
        }
    }

    async fn execute_switch(
        &self,
        request: SwitchRequest,
        previous_mode: AggregateEnvironmentMode,
    ) -> SwitchOutcome {
        // Fresh token right before the mutation, so an idle session fails here
        // instead of at the directory.
        let token = match self.acquire_token().await {
            Ok(token) => token,
            Err(e) => {
                return self.abort(
                    request.environment,
                    previous_mode,
                    SwitchError::authentication(e.to_string()),
                )
            }
        };

        debug!("[SwitchCoordinator] Sending switch request: {:?}", request);
        let result = self.directory.switch_environment(&token, &request).await;

        if let Err(e) = self.advance(SwitchInput::SwitchReturned) {
            error!("[SwitchCoordinator] {}", e);
        }

        let outcome = match result {
            Ok(response) if response.is_success() => {
                let summary = self.reconcile_success(&request, response);
                self.refresh_after_switch(&token).await;
                SwitchOutcome::Switched(summary)
            }
            Ok(response) => {
                let message = response
                    .message
                    .unwrap_or_else(|| format!("Switch returned status '{}'", response.status));
                self.reconcile_failure(&request, previous_mode, SwitchError::request_failed(message))
            }
            Err(e) => self.reconcile_failure(
                &request,
                previous_mode,
                SwitchError::request_failed(e.to_string()),
            ),
        };

        if let Err(e) = self.advance(SwitchInput::Settled) {
            error!("[SwitchCoordinator] {}", e);
        }
        outcome
    }

    fn reconcile_success(&self, request: &SwitchRequest, response: SwitchResponse) -> SwitchSummary {
        let environment = request.environment;
        let mode = if response.skipped_services.is_empty() {
            environment.into()
        } else {
            AggregateEnvironmentMode::Mixed
        };

        if let Some(confirmed) = response.environment {
            if confirmed != environment {
                warn!(
                    "[SwitchCoordinator] Directory reported environment {} for a switch to {}",
                    confirmed, environment
                );
            }
        }

        let summary = SwitchSummary {
            environment,
            mode,
            partial: request.is_partial(),
            switched_services: response.switched_services,
            skipped_services: response.skipped_services,
        };

        {
            let mut state = self.lock_state();
            state.mode = mode;
            state.partial_in_effect = !summary.skipped_services.is_empty();
            state.stored_preference = Some(environment);
            state.last_error = None;
        }

        let preference = if summary.skipped_services.is_empty() {
            StoredPreference::full(environment)
        } else {
            StoredPreference::partial(environment)
        };
        if let Err(e) = self.preferences.save(preference) {
            warn!("[SwitchCoordinator] Failed to persist preference: {}", e);
        }

        info!(
            "[SwitchCoordinator] Switch to {} confirmed (mode: {}, skipped: {:?})",
            environment, mode, summary.skipped_services
        );

        self.events.emit(EnvironmentEvent::switched(
            environment,
            mode,
            summary.partial,
            summary.switched_services.clone(),
            summary.skipped_services.clone(),
        ));

        summary
    }

    fn reconcile_failure(
        &self,
        request: &SwitchRequest,
        previous_mode: AggregateEnvironmentMode,
        err: SwitchError,
    ) -> SwitchOutcome {
        warn!(
            "[SwitchCoordinator] Switch to {} failed, restoring {}: {}",
            request.environment, previous_mode, err
        );
        self.surface_failure(request.environment, previous_mode, err)
    }

    /// Token acquisition failed; nothing was mutated remotely.
    fn abort(
        &self,
        target: Environment,
        previous_mode: AggregateEnvironmentMode,
        err: SwitchError,
    ) -> SwitchOutcome {
        warn!(
            "[SwitchCoordinator] Switch to {} aborted before any remote change: {}",
            target, err
        );
        if let Err(e) = self.advance(SwitchInput::Aborted) {
            error!("[SwitchCoordinator] {}", e);
        }
        self.surface_failure(target, previous_mode, err)
    }

    fn surface_failure(
        &self,
        target: Environment,
        previous_mode: AggregateEnvironmentMode,
        err: SwitchError,
    ) -> SwitchOutcome {
        {
            let mut state = self.lock_state();
            state.mode = previous_mode;
            state.pending_decision = None;
            state.last_error = Some(err.clone());
        }
        self.events.emit(EnvironmentEvent::switch_failed(
            target,
            previous_mode,
            err.code.as_str(),
            err.message.clone(),
        ));
        SwitchOutcome::Failed(err)
    }

    /// Pull the post-switch service list. The mode already reflects the
    /// directory's response, so only the list is replaced.
    async fn refresh_after_switch(&self, token: &str) {
        match self.directory.list_services(token).await {
            Ok(services) => {
                debug!(
                    "[SwitchCoordinator] Refreshed {} services after switch",
                    services.len()
                );
                let mut state = self.lock_state();
                state.services = services;
                state.services_received = true;
            }
            Err(e) => warn!(
                "[SwitchCoordinator] Service refresh after switch failed: {}",
                e
            ),
        }
    }

    fn unexpected_phase(&self, phase: &SwitchPhase) -> SwitchOutcome {
        error!("[SwitchCoordinator] Unexpected phase {}", phase.name());
        SwitchOutcome::Rejected
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL: HELPERS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Re-derive the mode from the recorded service list and apply preference
    /// precedence. Only called while `Idle`; consumes the guard so events are
    /// emitted without holding the lock.
    fn settle_mode(
        &self,
        mut state: MutexGuard<'_, CoordinatorState>,
    ) -> AggregateEnvironmentMode {
        if !state.services_received {
            return state.mode;
        }

        let derived = derive_mode(&state.services);
        let next = match (state.stored_preference, state.partial_in_effect) {
            (Some(preference), false) => preference.into(),
            _ => derived,
        };

        let previous = state.mode;
        state.mode = next;
        drop(state);

        if previous != next {
            info!(
                "[SwitchCoordinator] Mode changed {} -> {} (derived {})",
                previous, next, derived
            );
            self.events.emit(EnvironmentEvent::mode_changed(previous, next));
        }
        next
    }

    fn advance(
        &self,
        input: SwitchInput,
    ) -> std::result::Result<SwitchPhase, InvalidTransition> {
        let mut state = self.lock_state();
        let next = transition(&state.phase, &input)?;
        debug!(
            "[SwitchCoordinator] {} --{}--> {}",
            state.phase.name(),
            input.name(),
            next.name()
        );
        state.phase = next.clone();
        Ok(next)
    }

    async fn acquire_token(&self) -> Result<String> {
        let token = self.tokens.access_token().await?;
        if token.trim().is_empty() {
            return Err(Error::authentication("Session token was empty"));
        }
        Ok(token)
    }

    fn initialize_locked(&self, state: &mut CoordinatorState) {
        if state.initialized {
            return;
        }
        state.initialized = true;

        match self.preferences.load() {
            Ok(Some(stored)) => {
                debug!(
                    "[SwitchCoordinator] Seeding mode from stored preference: {} (partial: {})",
                    stored.environment, stored.partial
                );
                state.stored_preference = Some(stored.environment);
                state.partial_in_effect = stored.partial;
                // Services were left behind last time; don't claim a single environment
                state.mode = if stored.partial {
                    AggregateEnvironmentMode::Mixed
                } else {
                    stored.environment.into()
                };
            }
            Ok(None) => debug!("[SwitchCoordinator] No stored preference"),
            Err(e) => warn!("[SwitchCoordinator] Failed to read preference: {}", e),
        }
    }

    /// Lock the state mutex, recovering from poison if necessary.
    fn lock_state(&self) -> MutexGuard<'_, CoordinatorState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!("[SwitchCoordinator] State mutex was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}
