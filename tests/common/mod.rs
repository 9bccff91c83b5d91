//! Shared utilities for supervisor integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::future::pending;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use broker_failover::endpoint::Endpoint;
use broker_failover::supervisor::ConnectionObserver;
use broker_failover::transport::{ConnectError, Connection, DisconnectReason, Transport};
use broker_failover::Shutdown;
use tokio::net::TcpListener;
use tokio::time::Instant;

/// What a scripted endpoint does on one connect attempt.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Fail immediately with "connection refused".
    Refuse,
    /// Never resolve; only the connect timeout or a stop ends the attempt.
    Hang,
    /// Connect, then drop the connection after the given delay (never if `None`).
    Accept { drop_after: Option<Duration> },
}

/// In-memory transport that plays back a per-host script.
///
/// Hosts with an exhausted (or missing) script refuse every connect.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    scripts: Arc<Mutex<HashMap<String, VecDeque<Outcome>>>>,
    attempts: Arc<Mutex<Vec<(String, Instant)>>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, host: &str, outcomes: Vec<Outcome>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(host.to_string(), outcomes.into());
        self
    }

    /// Hosts dialled so far, in order.
    pub fn attempted_hosts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().iter().map(|(h, _)| h.clone()).collect()
    }

    /// Instants at which each connect started.
    pub fn attempt_times(&self) -> Vec<Instant> {
        self.attempts.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }
}

pub struct ScriptedConnection {
    drop_after: Option<Duration>,
}

impl Connection for ScriptedConnection {
    async fn closed(&mut self) -> DisconnectReason {
        match self.drop_after {
            Some(delay) => {
                tokio::time::sleep(delay).await;
                DisconnectReason::Closed
            }
            None => pending().await,
        }
    }
}

impl Transport for ScriptedTransport {
    type Connection = ScriptedConnection;

    async fn connect(&self, endpoint: &Endpoint) -> Result<ScriptedConnection, ConnectError> {
        let host = endpoint.host().to_string();
        self.attempts.lock().unwrap().push((host.clone(), Instant::now()));

        let outcome = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&host)
            .and_then(VecDeque::pop_front)
            .unwrap_or(Outcome::Refuse);

        match outcome {
            Outcome::Refuse => Err(ConnectError::Refused(format!("{} refused", host))),
            Outcome::Hang => pending().await,
            Outcome::Accept { drop_after } => Ok(ScriptedConnection { drop_after }),
        }
    }
}

/// Observer notification, reduced to comparable values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Connecting(String),
    Connected(String),
    Failed(String, &'static str),
    Disconnected,
    Exhausted,
    Stopped,
}

/// Records every notification; optionally triggers shutdown after N connects.
#[derive(Default)]
pub struct RecordingObserver {
    pub events: Vec<Event>,
    stop_after_connects: Option<(usize, Arc<Shutdown>)>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop_after_connects(connects: usize, shutdown: Arc<Shutdown>) -> Self {
        Self {
            events: Vec::new(),
            stop_after_connects: Some((connects, shutdown)),
        }
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl ConnectionObserver for RecordingObserver {
    fn on_connecting(&mut self, endpoint: &Endpoint) {
        self.events.push(Event::Connecting(endpoint.host().to_string()));
    }

    fn on_connected(&mut self, endpoint: &Endpoint) {
        self.events.push(Event::Connected(endpoint.host().to_string()));
        if let Some((limit, shutdown)) = &self.stop_after_connects {
            if self.count(|e| matches!(e, Event::Connected(_))) >= *limit {
                shutdown.trigger();
            }
        }
    }

    fn on_connect_failed(&mut self, endpoint: &Endpoint, error: &ConnectError) {
        self.events
            .push(Event::Failed(endpoint.host().to_string(), error.kind()));
    }

    fn on_disconnected(&mut self, _reason: &DisconnectReason) {
        self.events.push(Event::Disconnected);
    }

    fn on_exhausted(&mut self) {
        self.events.push(Event::Exhausted);
    }

    fn on_stopped(&mut self) {
        self.events.push(Event::Stopped);
    }
}

/// Start a mock broker that accepts connections and closes each one after `hold`.
pub async fn start_mock_broker(hold: Duration) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    tokio::spawn(async move {
                        tokio::time::sleep(hold).await;
                        drop(socket);
                    });
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// An address nobody listens on.
pub async fn dead_address() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}
