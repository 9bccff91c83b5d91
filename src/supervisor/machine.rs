//! Connection supervisor state machine.
//!
//! The supervisor never performs I/O itself. Each event handler updates the
//! state, fires one observer callback per state change, and returns the
//! [`Action`] the caller must perform next. The async driver in `driver.rs`
//! is the usual caller; tests drive it by hand.
//!
//! Every connect attempt, backoff wait and established connection is tagged
//! with an [`AttemptId`]. `stop()` and each new attempt bump the generation,
//! so results that arrive for an older id are discarded.

use std::time::Duration;
use uuid::Uuid;

use crate::config::schema::{ClientConfig, ResumePolicy};
use crate::config::validation::validate_config;
use crate::endpoint::{Endpoint, EndpointList, EndpointSelector};
use crate::resilience::BackoffPolicy;
use crate::supervisor::observer::ConnectionObserver;
use crate::supervisor::state::ConnectionState;
use crate::supervisor::{SupervisorError, SupervisorResult};
use crate::transport::{ConnectError, DisconnectReason};

/// Identifies one connect attempt and everything that follows from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttemptId(u64);

impl AttemptId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

/// What the caller must do after feeding an event to the supervisor.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Dial `endpoint`, then report through `on_connect_result`.
    Connect { attempt: AttemptId, endpoint: Endpoint },
    /// Sleep for `delay`, then call `on_backoff_elapsed`.
    Backoff { attempt: AttemptId, delay: Duration },
    /// Connected; report the eventual drop through `on_remote_disconnect`.
    AwaitDisconnect { attempt: AttemptId },
    /// Attempt limit reached. The supervisor is `Failed`.
    Exhausted,
    /// The event was stale or not valid in the current state.
    Ignore,
}

/// Owns one logical broker connection and its reconnect policy.
#[derive(Debug)]
pub struct Supervisor<O> {
    container_id: String,
    selector: EndpointSelector,
    backoff: BackoffPolicy,
    jitter: bool,
    resume: ResumePolicy,
    connect_timeout: Duration,
    observer: O,

    state: ConnectionState,
    failures: u32,
    generation: u64,
    retry_current: bool,
}

impl<O: ConnectionObserver> Supervisor<O> {
    /// Create an idle supervisor over `endpoints`.
    pub fn new(endpoints: EndpointList, backoff: BackoffPolicy, observer: O) -> Self {
        Self {
            container_id: Uuid::new_v4().to_string(),
            selector: EndpointSelector::new(endpoints),
            backoff,
            jitter: false,
            resume: ResumePolicy::default(),
            connect_timeout: Duration::from_secs(5),
            observer,
            state: ConnectionState::Idle,
            failures: 0,
            generation: 0,
            retry_current: false,
        }
    }

    /// Build a supervisor from configuration. Fails with
    /// [`SupervisorError::Config`] listing every invalid setting.
    pub fn from_config(config: &ClientConfig, observer: O) -> SupervisorResult<Self> {
        validate_config(config).map_err(SupervisorError::Config)?;

        let endpoints =
            EndpointList::from_addresses(&config.endpoints.primary, &config.endpoints.failover)?;

        let mut supervisor = Self::new(endpoints, BackoffPolicy::from(&config.reconnect), observer)
            .with_jitter(config.reconnect.jitter)
            .with_resume_policy(config.reconnect.resume)
            .with_connect_timeout(Duration::from_secs(config.timeouts.connect_secs));

        if let Some(id) = &config.container_id {
            supervisor = supervisor.with_container_id(id.clone());
        }
        Ok(supervisor)
    }

    pub fn with_container_id(mut self, id: impl Into<String>) -> Self {
        self.container_id = id.into();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_resume_policy(mut self, resume: ResumePolicy) -> Self {
        self.resume = resume;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    // --- Events ---

    /// Begin connecting from the primary. Accepted only from `Idle` or `Failed`;
    /// all counters are reset.
    pub fn start(&mut self) -> SupervisorResult<Action> {
        if !self.state.can_start() {
            return Err(SupervisorError::AlreadyRunning(self.state));
        }

        self.failures = 0;
        self.retry_current = false;
        self.selector.reset();
        Ok(self.begin_attempt())
    }

    /// Report the outcome of the attempt identified by `attempt`.
    pub fn on_connect_result(
        &mut self,
        attempt: AttemptId,
        result: Result<(), ConnectError>,
    ) -> Action {
        if !self.is_current(attempt) || self.state != ConnectionState::Connecting {
            tracing::debug!(attempt = attempt.0, state = %self.state, "Discarding stale connect result");
            return Action::Ignore;
        }

        let endpoint = self.selector.current().clone();
        match result {
            Ok(()) => {
                self.failures = 0;
                self.selector.reset();
                self.transition(ConnectionState::Connected);
                self.observer.on_connected(&endpoint);
                Action::AwaitDisconnect { attempt }
            }
            Err(error) => {
                self.failures = self.failures.saturating_add(1);
                self.transition(ConnectionState::Reconnecting);
                self.observer.on_connect_failed(&endpoint, &error);

                if self.backoff.is_exhausted(self.failures) {
                    self.transition(ConnectionState::Failed);
                    self.observer.on_exhausted();
                    return Action::Exhausted;
                }
                self.schedule_backoff(attempt)
            }
        }
    }

    /// The backoff wait issued for `attempt` is over; dial the next endpoint.
    pub fn on_backoff_elapsed(&mut self, attempt: AttemptId) -> Action {
        if !self.is_current(attempt) || self.state != ConnectionState::Reconnecting {
            tracing::debug!(attempt = attempt.0, state = %self.state, "Discarding stale backoff timer");
            return Action::Ignore;
        }

        if self.retry_current {
            self.retry_current = false;
        } else {
            self.selector.advance();
        }
        self.begin_attempt()
    }

    /// The connection established by `attempt` dropped.
    pub fn on_remote_disconnect(&mut self, attempt: AttemptId, reason: DisconnectReason) -> Action {
        if !self.is_current(attempt) || self.state != ConnectionState::Connected {
            tracing::debug!(attempt = attempt.0, state = %self.state, "Discarding stale disconnect");
            return Action::Ignore;
        }

        self.transition(ConnectionState::Reconnecting);
        self.observer.on_disconnected(&reason);

        // The cursor was reset on connect; `Primary` retries it before moving on.
        self.retry_current = self.resume == ResumePolicy::Primary;
        self.schedule_backoff(attempt)
    }

    /// Move to `Idle` and invalidate any in-flight attempt. Returns false when
    /// already `Idle` or terminally `Failed`.
    pub fn stop(&mut self) -> bool {
        if matches!(self.state, ConnectionState::Idle | ConnectionState::Failed) {
            return false;
        }

        self.generation += 1;
        self.retry_current = false;
        self.transition(ConnectionState::Idle);
        self.observer.on_stopped();
        true
    }

    // --- Accessors ---

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Consecutive failures since the last successful connection.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    pub fn current_endpoint(&self) -> &Endpoint {
        self.selector.current()
    }

    pub fn endpoints(&self) -> &EndpointList {
        self.selector.list()
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn backoff(&self) -> &BackoffPolicy {
        &self.backoff
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    pub fn into_observer(self) -> O {
        self.observer
    }

    // --- Internals ---

    fn is_current(&self, attempt: AttemptId) -> bool {
        attempt.0 == self.generation
    }

    fn begin_attempt(&mut self) -> Action {
        self.generation += 1;
        self.transition(ConnectionState::Connecting);

        let endpoint = self.selector.current().clone();
        self.observer.on_connecting(&endpoint);

        Action::Connect {
            attempt: AttemptId(self.generation),
            endpoint,
        }
    }

    fn schedule_backoff(&self, attempt: AttemptId) -> Action {
        let delay = if self.jitter {
            self.backoff.jittered_delay(self.failures)
        } else {
            self.backoff.delay(self.failures)
        };

        tracing::debug!(
            container = %self.container_id,
            failures = self.failures,
            delay_ms = delay.as_millis() as u64,
            "Scheduling reconnect"
        );
        Action::Backoff { attempt, delay }
    }

    fn transition(&mut self, to: ConnectionState) {
        tracing::debug!(
            container = %self.container_id,
            from = %self.state,
            to = %to,
            "Connection state change"
        );
        self.state = to;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Recorder(Vec<String>);

    impl ConnectionObserver for Recorder {
        fn on_connecting(&mut self, endpoint: &Endpoint) {
            self.0.push(format!("connecting {}", endpoint.host()));
        }
        fn on_connected(&mut self, endpoint: &Endpoint) {
            self.0.push(format!("connected {}", endpoint.host()));
        }
        fn on_connect_failed(&mut self, endpoint: &Endpoint, _error: &ConnectError) {
            self.0.push(format!("failed {}", endpoint.host()));
        }
        fn on_disconnected(&mut self, _reason: &DisconnectReason) {
            self.0.push("disconnected".into());
        }
        fn on_exhausted(&mut self) {
            self.0.push("exhausted".into());
        }
        fn on_stopped(&mut self) {
            self.0.push("stopped".into());
        }
    }

    fn supervisor(addrs: &[&str], max_attempts: Option<u32>) -> Supervisor<Recorder> {
        let list = EndpointList::from_addresses(addrs[0], &addrs[1..]).unwrap();
        let backoff = BackoffPolicy {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
            multiplier: 2.0,
            max_attempts,
        };
        Supervisor::new(list, backoff, Recorder::default())
    }

    fn refused() -> Result<(), ConnectError> {
        Err(ConnectError::Refused("test".into()))
    }

    fn expect_connect(action: Action) -> (AttemptId, Endpoint) {
        match action {
            Action::Connect { attempt, endpoint } => (attempt, endpoint),
            other => panic!("expected Connect, got {:?}", other),
        }
    }

    fn expect_backoff(action: Action) -> (AttemptId, Duration) {
        match action {
            Action::Backoff { attempt, delay } => (attempt, delay),
            other => panic!("expected Backoff, got {:?}", other),
        }
    }

    #[test]
    fn test_immediate_success() {
        let mut sup = supervisor(&["primary", "b1"], None);
        assert_eq!(sup.state(), ConnectionState::Idle);

        let (attempt, endpoint) = expect_connect(sup.start().unwrap());
        assert_eq!(endpoint.host(), "primary");
        assert_eq!(sup.state(), ConnectionState::Connecting);

        let next = sup.on_connect_result(attempt, Ok(()));
        assert_eq!(next, Action::AwaitDisconnect { attempt });
        assert_eq!(sup.state(), ConnectionState::Connected);
        assert_eq!(sup.observer().0, ["connecting primary", "connected primary"]);
    }

    #[test]
    fn test_failover_cycle_and_backoff_growth() {
        let mut sup = supervisor(&["primary", "b1", "b2"], None);
        let mut action = sup.start().unwrap();
        let mut hosts = Vec::new();
        let mut delays = Vec::new();

        for _ in 0..7 {
            let (attempt, endpoint) = expect_connect(action);
            hosts.push(endpoint.host().to_string());
            let (attempt, delay) = expect_backoff(sup.on_connect_result(attempt, refused()));
            delays.push(delay.as_millis() as u64);
            assert_eq!(sup.state(), ConnectionState::Reconnecting);
            action = sup.on_backoff_elapsed(attempt);
        }

        assert_eq!(hosts, ["primary", "b1", "b2", "primary", "b1", "b2", "primary"]);
        assert_eq!(delays, [200, 400, 800, 1000, 1000, 1000, 1000]);
        assert_eq!(sup.failures(), 7);
    }

    #[test]
    fn test_exhaustion_after_max_attempts() {
        let mut sup = supervisor(&["primary"], Some(3));
        let mut action = sup.start().unwrap();

        for round in 1..=3 {
            let (attempt, endpoint) = expect_connect(action);
            assert_eq!(endpoint.host(), "primary");
            action = sup.on_connect_result(attempt, refused());
            if round < 3 {
                let (attempt, _) = expect_backoff(action);
                action = sup.on_backoff_elapsed(attempt);
            }
        }

        assert_eq!(action, Action::Exhausted);
        assert_eq!(sup.state(), ConnectionState::Failed);

        let events = &sup.observer().0;
        assert_eq!(events.iter().filter(|e| e.starts_with("failed")).count(), 3);
        assert_eq!(events.last().map(String::as_str), Some("exhausted"));
        assert_eq!(events.iter().filter(|e| *e == "exhausted").count(), 1);

        // Failed is terminal for stop() but start() restarts it with clean counters.
        assert!(!sup.stop());
        let (_, endpoint) = expect_connect(sup.start().unwrap());
        assert_eq!(endpoint.host(), "primary");
        assert_eq!(sup.failures(), 0);
    }

    #[test]
    fn test_disconnect_continues_with_next_endpoint() {
        let mut sup = supervisor(&["primary", "b1", "b2"], None);
        let (attempt, _) = expect_connect(sup.start().unwrap());
        sup.on_connect_result(attempt, Ok(()));

        let (attempt, delay) =
            expect_backoff(sup.on_remote_disconnect(attempt, DisconnectReason::Closed));
        assert_eq!(delay, Duration::from_millis(100));
        assert_eq!(sup.state(), ConnectionState::Reconnecting);

        let (attempt, endpoint) = expect_connect(sup.on_backoff_elapsed(attempt));
        assert_eq!(endpoint.host(), "b1");
        sup.on_connect_result(attempt, Ok(()));

        assert_eq!(
            sup.observer().0,
            [
                "connecting primary",
                "connected primary",
                "disconnected",
                "connecting b1",
                "connected b1",
            ]
        );
        // Successful connect put the cursor back on the primary.
        assert_eq!(sup.current_endpoint().host(), "primary");
    }

    #[test]
    fn test_resume_from_primary_policy() {
        let mut sup = supervisor(&["primary", "b1"], None).with_resume_policy(ResumePolicy::Primary);
        let (attempt, _) = expect_connect(sup.start().unwrap());
        sup.on_connect_result(attempt, Ok(()));

        let (attempt, _) = expect_backoff(sup.on_remote_disconnect(attempt, DisconnectReason::Closed));
        let (attempt, endpoint) = expect_connect(sup.on_backoff_elapsed(attempt));
        assert_eq!(endpoint.host(), "primary");

        let (attempt, _) = expect_backoff(sup.on_connect_result(attempt, refused()));
        let (_, endpoint) = expect_connect(sup.on_backoff_elapsed(attempt));
        assert_eq!(endpoint.host(), "b1");
    }

    #[test]
    fn test_stop_suppresses_late_result() {
        let mut sup = supervisor(&["primary", "b1"], None);
        let (attempt, _) = expect_connect(sup.start().unwrap());

        assert!(sup.stop());
        assert_eq!(sup.state(), ConnectionState::Idle);

        assert_eq!(sup.on_connect_result(attempt, Ok(())), Action::Ignore);
        assert_eq!(sup.on_connect_result(attempt, refused()), Action::Ignore);
        assert_eq!(sup.state(), ConnectionState::Idle);
        assert_eq!(sup.observer().0, ["connecting primary", "stopped"]);
        assert!(!sup.stop());
    }

    #[test]
    fn test_stale_backoff_after_restart_is_ignored() {
        let mut sup = supervisor(&["primary", "b1"], None);
        let (attempt, _) = expect_connect(sup.start().unwrap());
        let (old, _) = expect_backoff(sup.on_connect_result(attempt, refused()));

        sup.stop();
        let (attempt, _) = expect_connect(sup.start().unwrap());
        let _ = expect_backoff(sup.on_connect_result(attempt, refused()));

        assert_eq!(sup.on_backoff_elapsed(old), Action::Ignore);
        assert_eq!(sup.state(), ConnectionState::Reconnecting);
    }

    #[test]
    fn test_start_while_running_is_rejected() {
        let mut sup = supervisor(&["primary"], None);
        sup.start().unwrap();
        assert!(matches!(
            sup.start(),
            Err(SupervisorError::AlreadyRunning(ConnectionState::Connecting))
        ));
    }

    #[test]
    fn test_from_config_rejects_bad_endpoints() {
        let mut config = ClientConfig::default();
        config.endpoints.primary = "gopher://nowhere".into();
        match Supervisor::from_config(&config, ()) {
            Err(SupervisorError::Config(errors)) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "endpoints.primary");
            }
            other => panic!("expected Config error, got {:?}", other.map(|s| s.state())),
        }
    }

    #[test]
    fn test_from_config_rejects_invalid_reconnect_settings() {
        let mut config = ClientConfig::default();
        config.reconnect.multiplier = -2.0;
        config.timeouts.connect_secs = 0;

        let err = match Supervisor::from_config(&config, ()) {
            Err(e) => e,
            Ok(sup) => panic!("accepted invalid config (timeout {:?})", sup.connect_timeout()),
        };
        let SupervisorError::Config(errors) = &err else {
            panic!("expected Config error, got {:?}", err);
        };
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, ["reconnect.multiplier", "timeouts.connect_secs"]);
        assert!(err.to_string().contains("reconnect.multiplier"));
    }

    #[test]
    fn test_negative_multiplier_backoff_does_not_panic() {
        let list = EndpointList::from_addresses("primary", &["b1"]).unwrap();
        let backoff = BackoffPolicy {
            multiplier: -2.0,
            ..BackoffPolicy::default()
        };
        let mut sup = Supervisor::new(list, backoff, Recorder::default());

        let (attempt, _) = expect_connect(sup.start().unwrap());
        let (_, delay) = expect_backoff(sup.on_connect_result(attempt, refused()));
        assert_eq!(delay, backoff.max_delay);
    }
}
