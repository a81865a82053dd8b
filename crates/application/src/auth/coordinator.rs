//! Single-flight credential renewal.
//!
//! The first caller that needs a new access token becomes the initiator and
//! performs the exchange. Callers arriving while it is in flight join a FIFO
//! queue and are settled together with the initiator's outcome.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use bookverse_domain::{ApiRequest, RenewalRequest, RenewedTokens, token_preview};
use parking_lot::Mutex;
use tokio::sync::oneshot;

use super::{SessionLifecycle, TokenStore};
use crate::error::RenewalError;
use crate::ports::{HttpTransport, TransportError};

/// Path of the renewal exchange.
pub const RENEWAL_PATH: &str = "/auth/refresh";

/// Default bound on a single renewal exchange.
pub const DEFAULT_RENEWAL_TIMEOUT: Duration = Duration::from_secs(15);

type RenewalOutcome = Result<String, RenewalError>;
type Waiter = oneshot::Sender<RenewalOutcome>;

/// Whether a renewal is underway, and who is waiting on it.
#[derive(Debug, Default)]
enum RenewalState {
    #[default]
    Idle,
    Refreshing {
        waiters: VecDeque<Waiter>,
    },
}

/// Serializes credential renewal across all concurrent requests.
pub struct RefreshCoordinator {
    transport: Arc<dyn HttpTransport>,
    tokens: TokenStore,
    lifecycle: Arc<SessionLifecycle>,
    timeout: Duration,
    state: Mutex<RenewalState>,
    exchanges: AtomicU64,
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("timeout", &self.timeout)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl RefreshCoordinator {
    /// Creates an idle coordinator.
    #[must_use]
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        tokens: TokenStore,
        lifecycle: Arc<SessionLifecycle>,
    ) -> Self {
        Self {
            transport,
            tokens,
            lifecycle,
            timeout: DEFAULT_RENEWAL_TIMEOUT,
            state: Mutex::new(RenewalState::Idle),
            exchanges: AtomicU64::new(0),
        }
    }

    /// Sets the bound on a single renewal exchange.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns true while a renewal is in flight.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        matches!(*self.state.lock(), RenewalState::Refreshing { .. })
    }

    /// Number of callers queued behind the in-flight renewal.
    #[must_use]
    pub fn pending(&self) -> usize {
        match &*self.state.lock() {
            RenewalState::Idle => 0,
            RenewalState::Refreshing { waiters } => waiters.len(),
        }
    }

    /// Number of renewal exchanges attempted since creation.
    #[must_use]
    pub fn exchanges(&self) -> u64 {
        self.exchanges.load(Ordering::Relaxed)
    }

    /// Obtains a fresh access token.
    ///
    /// Joins the in-flight renewal if there is one, otherwise starts it.
    ///
    /// # Errors
    ///
    /// Returns the renewal's error. On failure the session has already been
    /// cleared and the lifecycle notified.
    pub async fn renew(&self) -> Result<String, RenewalError> {
        if let Some(receiver) = self.join_or_lead() {
            tracing::debug!("Renewal in flight; waiting");
            return receiver.await.unwrap_or(Err(RenewalError::Abandoned));
        }

        let mut guard = InitiatorGuard {
            coordinator: self,
            armed: true,
        };
        let outcome = self.exchange().await;
        guard.armed = false;
        self.settle(outcome)
    }

    /// Queues the caller behind the in-flight renewal, or marks it as the
    /// initiator and returns `None`.
    fn join_or_lead(&self) -> Option<oneshot::Receiver<RenewalOutcome>> {
        let mut state = self.state.lock();
        if let RenewalState::Refreshing { waiters } = &mut *state {
            let (sender, receiver) = oneshot::channel();
            waiters.push_back(sender);
            return Some(receiver);
        }
        *state = RenewalState::Refreshing {
            waiters: VecDeque::new(),
        };
        None
    }

    /// Returns to idle, handing back whoever was waiting.
    fn take_waiters(&self) -> VecDeque<Waiter> {
        match std::mem::take(&mut *self.state.lock()) {
            RenewalState::Idle => VecDeque::new(),
            RenewalState::Refreshing { waiters } => waiters,
        }
    }

    fn settle(&self, outcome: RenewalOutcome) -> RenewalOutcome {
        if outcome.is_err() {
            self.tokens.clear_session();
        }

        let waiters = self.take_waiters();
        let count = waiters.len();
        for waiter in waiters {
            // A waiter that went away has nothing to receive.
            let _ = waiter.send(outcome.clone());
        }

        match &outcome {
            Ok(_) => {
                tracing::info!(replayed = count, "Session renewed");
                self.lifecycle.renewed();
            }
            Err(e) => {
                tracing::warn!(error = %e, rejected = count, "Session renewal failed");
                self.lifecycle.expire(e);
            }
        }
        outcome
    }

    /// Performs the exchange and stores the new tokens.
    async fn exchange(&self) -> RenewalOutcome {
        let Some(refresh_token) = self.tokens.refresh_token() else {
            return Err(RenewalError::NoRefreshToken);
        };

        let request = ApiRequest::post(RENEWAL_PATH)
            .with_json(&RenewalRequest {
                refresh_token: refresh_token.clone(),
            })
            .map_err(|e| RenewalError::Transport(TransportError::InvalidBody(e.to_string())))?;

        self.exchanges.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(refresh = %token_preview(&refresh_token), "Renewing session");

        let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
        let response = tokio::time::timeout(self.timeout, self.transport.send(&request))
            .await
            .map_err(|_| RenewalError::TimedOut { timeout_ms })?
            .map_err(RenewalError::Transport)?;

        if !response.is_success() {
            return Err(RenewalError::Rejected {
                status: response.status,
                message: response.error_message(),
            });
        }

        let renewed = response
            .envelope::<RenewedTokens>()
            .ok()
            .and_then(|envelope| envelope.data)
            .filter(|tokens| tokens.access_token.is_some())
            .or_else(|| response.json_body::<RenewedTokens>().ok())
            .unwrap_or_default();

        let access_token = renewed
            .access_token
            .filter(|token| !token.is_empty())
            .ok_or(RenewalError::MissingAccessToken)?;
        let refresh_token = renewed
            .refresh_token
            .filter(|token| !token.is_empty())
            .unwrap_or(refresh_token);

        self.tokens.set_session(&access_token, &refresh_token);
        Ok(access_token)
    }
}

/// Rejects queued callers if the initiator is dropped mid-exchange.
struct InitiatorGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    armed: bool,
}

impl Drop for InitiatorGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let waiters = self.coordinator.take_waiters();
        tracing::warn!(rejected = waiters.len(), "Renewal initiator dropped");
        for waiter in waiters {
            let _ = waiter.send(Err(RenewalError::Abandoned));
        }
    }
}
