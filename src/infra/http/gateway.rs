//! Session-aware request gateway.
//!
//! Every API call goes through [`SessionGateway::send`]. A 401 triggers one
//! credential refresh for the whole burst of failing calls; each of them is
//! replayed exactly once after the refresh resolves.

use std::{
    mem,
    sync::{Arc, Mutex, RwLock},
};

use futures::future::join_all;
use metrics::counter;
use thiserror::Error;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

use super::{
    REFRESH_PATH,
    request::{ApiRequest, RawResponse},
    transport::Transport,
};
use crate::{
    infra::telemetry::{METRIC_SESSION_EXPIRED, METRIC_SESSION_REFRESH},
    util::lock::{mutex_lock, rw_read, rw_write},
};

const SOURCE: &str = "infra::http::gateway";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// No response was received (connection, timeout, malformed request).
    #[error("network error: {message}")]
    Network { message: String },
    /// The server still rejected the request after a successful refresh.
    #[error("session expired")]
    SessionExpired,
    #[error("session refresh failed: {message}")]
    Refresh { message: String },
}

impl GatewayError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn refresh(message: impl Into<String>) -> Self {
        Self::Refresh {
            message: message.into(),
        }
    }

    /// True when the caller is no longer authenticated.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::SessionExpired | Self::Refresh { .. })
    }
}

type ExpiredCallback = Arc<dyn Fn() + Send + Sync>;

/// Replaceable observer invoked when the session cannot be recovered.
///
/// Holds exactly one callback; installing a new one replaces the previous.
#[derive(Clone)]
pub struct SessionExpiredHook {
    slot: Arc<RwLock<ExpiredCallback>>,
}

impl SessionExpiredHook {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(RwLock::new(default_callback())),
        }
    }

    pub fn set(&self, callback: impl Fn() + Send + Sync + 'static) {
        *rw_write(&self.slot, SOURCE, "hook_set") = Arc::new(callback);
    }

    /// Restore the logging-only default.
    pub fn reset(&self) {
        *rw_write(&self.slot, SOURCE, "hook_reset") = default_callback();
    }

    pub fn fire(&self) {
        let callback = Arc::clone(&*rw_read(&self.slot, SOURCE, "hook_fire"));
        counter!(METRIC_SESSION_EXPIRED).increment(1);
        callback();
    }
}

impl Default for SessionExpiredHook {
    fn default() -> Self {
        Self::new()
    }
}

fn default_callback() -> ExpiredCallback {
    Arc::new(|| warn!(target: "contentdesk::session", "session expired; sign in again"))
}

/// Request waiting for the in-flight refresh.
struct Pending {
    request: ApiRequest,
    reply: oneshot::Sender<Result<RawResponse, GatewayError>>,
}

#[derive(Default)]
enum RefreshState {
    #[default]
    Idle,
    Refreshing {
        queue: Vec<Pending>,
    },
}

struct GatewayInner {
    transport: Arc<dyn Transport>,
    state: Mutex<RefreshState>,
    on_expired: SessionExpiredHook,
}

/// Wraps a [`Transport`] with the single-flight refresh protocol.
#[derive(Clone)]
pub struct SessionGateway {
    inner: Arc<GatewayInner>,
}

impl SessionGateway {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_hook(transport, SessionExpiredHook::new())
    }

    pub fn with_hook(transport: Arc<dyn Transport>, on_expired: SessionExpiredHook) -> Self {
        Self {
            inner: Arc::new(GatewayInner {
                transport,
                state: Mutex::new(RefreshState::Idle),
                on_expired,
            }),
        }
    }

    pub fn expired_hook(&self) -> &SessionExpiredHook {
        &self.inner.on_expired
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(
            *mutex_lock(&self.inner.state, SOURCE, "is_refreshing"),
            RefreshState::Refreshing { .. }
        )
    }

    /// Execute `request`; non-401 responses and network errors are returned untouched.
    pub async fn send(&self, request: ApiRequest) -> Result<RawResponse, GatewayError> {
        let response = self.inner.transport.execute(&request).await?;
        if !response.is_unauthorized() {
            return Ok(response);
        }
        debug!(request = %request.describe(), "unauthorized; waiting for session refresh");
        self.recover(request).await
    }

    /// Queue the rejected request behind the refresh, starting one if none is running.
    async fn recover(&self, request: ApiRequest) -> Result<RawResponse, GatewayError> {
        let (reply, receiver) = oneshot::channel();
        let start_refresh = {
            let mut state = mutex_lock(&self.inner.state, SOURCE, "enqueue");
            match &mut *state {
                RefreshState::Refreshing { queue } => {
                    queue.push(Pending { request, reply });
                    false
                }
                RefreshState::Idle => {
                    *state = RefreshState::Refreshing {
                        queue: vec![Pending { request, reply }],
                    };
                    true
                }
            }
        };

        if start_refresh {
            // Detached so a dropped caller cannot strand the queue.
            let lease = RefreshLease {
                inner: Arc::clone(&self.inner),
                released: false,
            };
            tokio::spawn(lease.run());
        }

        receiver
            .await
            .unwrap_or_else(|_| Err(GatewayError::refresh("refresh was abandoned")))
    }
}

/// Owns the `Refreshing` state until the queue is taken.
///
/// Dropped early (task cancelled or panicked), it returns the gateway to
/// `Idle` and the queued callers see their reply channel close.
struct RefreshLease {
    inner: Arc<GatewayInner>,
    released: bool,
}

impl RefreshLease {
    async fn run(mut self) {
        let outcome = self.refresh().await;
        let queue = self.take_queue();
        self.released = true;

        match outcome {
            Ok(()) => {
                info!(queued = queue.len(), "session refreshed; replaying requests");
                // join_all polls in order, so replays start FIFO.
                join_all(queue.into_iter().map(|pending| self.replay(pending))).await;
            }
            Err(err) => {
                warn!(error = %err, queued = queue.len(), "session refresh failed");
                for pending in queue {
                    let _ = pending.reply.send(Err(err.clone()));
                }
                self.inner.on_expired.fire();
            }
        }
    }

    async fn refresh(&self) -> Result<(), GatewayError> {
        let request = ApiRequest::post(REFRESH_PATH);
        let result = match self.inner.transport.execute(&request).await {
            Ok(response) if response.is_success() => Ok(()),
            Ok(response) => Err(GatewayError::refresh(format!(
                "refresh rejected with status {}",
                response.status
            ))),
            Err(err) => Err(GatewayError::refresh(err.to_string())),
        };
        let label = if result.is_ok() { "success" } else { "failure" };
        counter!(METRIC_SESSION_REFRESH, "result" => label).increment(1);
        result
    }

    async fn replay(&self, pending: Pending) {
        let Pending { request, reply } = pending;
        let result = match self.inner.transport.execute(&request).await {
            Ok(response) if response.is_unauthorized() => {
                warn!(request = %request.describe(), "request rejected again after refresh");
                self.inner.on_expired.fire();
                Err(GatewayError::SessionExpired)
            }
            other => other,
        };
        let _ = reply.send(result);
    }

    fn take_queue(&self) -> Vec<Pending> {
        let mut state = mutex_lock(&self.inner.state, SOURCE, "take_queue");
        match mem::take(&mut *state) {
            RefreshState::Refreshing { queue } => queue,
            RefreshState::Idle => Vec::new(),
        }
    }
}

impl Drop for RefreshLease {
    fn drop(&mut self) {
        // After release a newer burst may own the state.
        if !self.released {
            let mut state = mutex_lock(&self.inner.state, SOURCE, "lease_drop");
            *state = RefreshState::Idle;
        }
    }
}

#[cfg(test)]
mod tests;
