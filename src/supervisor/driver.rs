//! Async driver for the supervisor state machine.
//!
//! # Responsibilities
//! - Perform the I/O each [`Action`] asks for (connect, sleep, wait for drop)
//! - Bound every connect by the supervisor's connect timeout
//! - Stop the supervisor when the shutdown signal fires
//!
//! The driver owns the supervisor exclusively for the duration of `run`,
//! so events reach the state machine one at a time.

use tokio::sync::broadcast;
use tokio::time::sleep;

use crate::lifecycle::shutdown::wait_for_shutdown;
use crate::resilience::timeouts::with_connect_timeout;
use crate::supervisor::machine::{Action, Supervisor};
use crate::supervisor::observer::ConnectionObserver;
use crate::supervisor::{SupervisorError, SupervisorResult};
use crate::transport::{Connection, Transport};

/// Drive `supervisor` over `transport` until it is stopped or gives up.
///
/// Returns `Ok(())` after a shutdown signal and
/// `Err(SupervisorError::AttemptsExhausted)` when the attempt limit is hit.
/// Per-attempt connect errors never surface here; they go to the observer.
pub async fn run<T, O>(
    supervisor: &mut Supervisor<O>,
    transport: &T,
    mut shutdown: broadcast::Receiver<()>,
) -> SupervisorResult<()>
where
    T: Transport,
    O: ConnectionObserver,
{
    let mut action = supervisor.start()?;

    tracing::info!(
        container = %supervisor.container_id(),
        endpoints = supervisor.endpoints().len(),
        "Connection supervisor started"
    );

    loop {
        action = match action {
            Action::Connect { attempt, endpoint } => {
                let limit = supervisor.connect_timeout();
                let outcome = tokio::select! {
                    res = with_connect_timeout(limit, transport.connect(&endpoint)) => res,
                    _ = wait_for_shutdown(&mut shutdown) => {
                        halt(supervisor);
                        return Ok(());
                    }
                };

                match outcome {
                    Err(e) => supervisor.on_connect_result(attempt, Err(e)),
                    Ok(mut connection) => match supervisor.on_connect_result(attempt, Ok(())) {
                        Action::AwaitDisconnect { attempt } => {
                            let reason = tokio::select! {
                                reason = connection.closed() => reason,
                                _ = wait_for_shutdown(&mut shutdown) => {
                                    halt(supervisor);
                                    return Ok(());
                                }
                            };
                            drop(connection);
                            supervisor.on_remote_disconnect(attempt, reason)
                        }
                        other => other,
                    },
                }
            }
            Action::Backoff { attempt, delay } => {
                tokio::select! {
                    _ = sleep(delay) => supervisor.on_backoff_elapsed(attempt),
                    _ = wait_for_shutdown(&mut shutdown) => {
                        halt(supervisor);
                        return Ok(());
                    }
                }
            }
            Action::Exhausted => {
                return Err(SupervisorError::AttemptsExhausted {
                    attempts: supervisor.failures(),
                });
            }
            Action::AwaitDisconnect { .. } | Action::Ignore => {
                tracing::warn!(
                    container = %supervisor.container_id(),
                    state = %supervisor.state(),
                    "Driver lost track of the connection, stopping"
                );
                halt(supervisor);
                return Ok(());
            }
        };
    }
}

fn halt<O: ConnectionObserver>(supervisor: &mut Supervisor<O>) {
    if supervisor.stop() {
        tracing::info!(container = %supervisor.container_id(), "Shutdown requested, supervisor stopped");
    }
}
