//! Connect timeout enforcement.
//!
//! Every connect attempt runs under a deadline. Expiry is reported as
//! [`ConnectError::Timeout`] so the supervisor treats it exactly like any
//! other connect failure.

use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

use crate::transport::ConnectError;

/// Run a connect future under `limit`.
pub async fn with_connect_timeout<F, T>(limit: Duration, fut: F) -> Result<T, ConnectError>
where
    F: Future<Output = Result<T, ConnectError>>,
{
    match timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(ConnectError::Timeout(limit)),
    }
}
