//! # Lazy Connection Handles
//!
//! Process-wide connections (Redis, MongoDB) are established on first use and
//! then reused by every request. A [`LazyConnection`] is owned by whoever
//! builds the service graph and handed to the stores that need it.
//!
//! Concurrent callers that arrive while the first connection attempt is in
//! flight wait on that same attempt instead of opening their own. The wait is
//! bounded: a caller that gives up reports the connection as unavailable and
//! the next caller starts a fresh attempt if nothing has succeeded yet.
//!
//! With a retry delay set, a failed attempt is remembered for that long and
//! callers in the meantime fail immediately instead of each paying the connect
//! timeout against a backend that is down.

use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

/// Why a lazily established connection is not available
#[derive(Debug, Clone, Error)]
pub enum ConnectError {
    #[error("{name} connection failed: {message}")]
    Failed { name: &'static str, message: String },

    #[error("{name} connection not ready after {waited:?}")]
    TimedOut { name: &'static str, waited: Duration },

    #[error("{name} connection failed recently, next attempt in {retry_in:?}")]
    CoolingDown { name: &'static str, retry_in: Duration },
}

/// A connection that is opened once, on demand, and shared afterwards
pub struct LazyConnection<T> {
    name: &'static str,
    cell: OnceCell<T>,
    wait: Duration,
    retry_after: Duration,
    created: Instant,
    /// Milliseconds after `created` of the last failed attempt, plus one;
    /// zero when the last attempt did not fail
    failed_at: AtomicU64,
}

impl<T> LazyConnection<T> {
    /// Create a handle that has not connected yet
    ///
    /// `wait` bounds how long any single caller waits for the in-flight
    /// connection attempt.
    pub fn new(name: &'static str, wait: Duration) -> Self {
        Self {
            name,
            cell: OnceCell::new(),
            wait,
            retry_after: Duration::ZERO,
            created: Instant::now(),
            failed_at: AtomicU64::new(0),
        }
    }

    /// Create a handle around an already established connection
    pub fn ready(name: &'static str, connection: T) -> Self {
        Self {
            cell: OnceCell::new_with(Some(connection)),
            ..Self::new(name, Duration::ZERO)
        }
    }

    /// Refuse new attempts for `delay` after a failed one; zero disables
    pub fn with_retry_after(mut self, delay: Duration) -> Self {
        self.retry_after = delay;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether a connection has been established
    pub fn is_ready(&self) -> bool {
        self.cell.initialized()
    }

    /// Return the shared connection, connecting first if needed
    pub async fn get_or_connect<F, Fut, E>(&self, connect: F) -> Result<&T, ConnectError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        if let Some(connection) = self.cell.get() {
            return Ok(connection);
        }
        if let Some(retry_in) = self.cooling_down() {
            debug!(connection = self.name, ?retry_in, "Skipping connect during retry delay");
            return Err(ConnectError::CoolingDown {
                name: self.name,
                retry_in,
            });
        }

        let name = self.name;
        let attempt = self.cell.get_or_try_init(|| async move {
            debug!(connection = name, "Opening connection");
            connect().await.map_err(|e| e.to_string())
        });

        match tokio::time::timeout(self.wait, attempt).await {
            Ok(Ok(connection)) => {
                self.failed_at.store(0, Ordering::Relaxed);
                info!(connection = name, "Connection ready");
                Ok(connection)
            }
            Ok(Err(message)) => {
                self.record_failure();
                warn!(connection = name, error = %message, "Connection attempt failed");
                Err(ConnectError::Failed { name, message })
            }
            Err(_) => {
                self.record_failure();
                warn!(connection = name, waited = ?self.wait, "Timed out waiting for connection");
                Err(ConnectError::TimedOut {
                    name,
                    waited: self.wait,
                })
            }
        }
    }

    fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.created.elapsed().as_millis()).unwrap_or(u64::MAX - 1)
    }

    fn record_failure(&self) {
        if !self.retry_after.is_zero() {
            self.failed_at.store(self.elapsed_ms() + 1, Ordering::Relaxed);
        }
    }

    /// Time left before another attempt is allowed
    fn cooling_down(&self) -> Option<Duration> {
        let failed_at = self.failed_at.load(Ordering::Relaxed);
        if failed_at == 0 || self.retry_after.is_zero() {
            return None;
        }
        let since = Duration::from_millis(self.elapsed_ms().saturating_sub(failed_at - 1));
        self.retry_after.checked_sub(since).filter(|left| !left.is_zero())
    }
}

impl<T> std::fmt::Debug for LazyConnection<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyConnection")
            .field("name", &self.name)
            .field("ready", &self.is_ready())
            .field("wait", &self.wait)
            .field("retry_after", &self.retry_after)
            .finish()
    }
}
