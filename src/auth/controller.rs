//! Device-code polling state machine.
//!
//! One spawned task per sign-in drives the flow and is the only writer of
//! [`FlowState`]. Network calls race a per-session [`CancellationToken`];
//! publication and the credential write re-check that token under the
//! controller's session lock, so nothing observable happens after
//! [`PollingController::dispose`] returns.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;
use uuid::Uuid;

use super::authorizer::TokenEndpoint;
use super::device_code::DeviceCodeGrant;
use super::error::AuthError;
use super::store::{CredentialStore, StoredCredential};
use super::token::TokenOutcome;

/// Lower bound on the delay between token polls, in seconds.
pub const MIN_POLL_INTERVAL_SECS: u64 = 5;

/// Provider-supplied `expires_in` and `interval` are clamped to one year.
const MAX_GRANT_SECS: u64 = 365 * 24 * 60 * 60;

fn grant_duration(secs: u64) -> Duration {
    Duration::from_secs(secs.min(MAX_GRANT_SECS))
}

/// What the user needs to see while the flow waits for them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DevicePrompt {
    pub user_code: String,
    pub verification_url: String,
    pub remaining_secs: u64,
}

/// Observable state of a device-code sign-in.
#[derive(Debug, Clone, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum FlowState {
    Idle,
    Requesting,
    AwaitingUserAction(DevicePrompt),
    Polling { prompt: DevicePrompt, attempt: u32 },
    Succeeded,
    Expired,
    Failed { message: String },
}

impl FlowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Expired | Self::Failed { .. })
    }

    pub fn prompt(&self) -> Option<&DevicePrompt> {
        match self {
            Self::AwaitingUserAction(prompt) | Self::Polling { prompt, .. } => Some(prompt),
            _ => None,
        }
    }
}

/// Drives the device-code flow: request, countdown, poll, persist.
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use tubelink::auth::{DeviceCodeAuthorizer, FileCredentialStore, FlowState, PollingController};
/// use tubelink::config::OAuthConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = OAuthConfig::load()?;
/// let authorizer = DeviceCodeAuthorizer::new(tubelink::http::build_client()?, &config);
/// let controller = PollingController::new(
///     Arc::new(authorizer),
///     Arc::new(FileCredentialStore::new_default()),
/// );
/// let mut states = controller.watch_state();
/// controller.sign_in();
/// while states.changed().await.is_ok() {
///     let state = states.borrow_and_update().clone();
///     if let Some(prompt) = state.prompt() {
///         println!("{} -> {}", prompt.verification_url, prompt.user_code);
///     }
///     if state.is_terminal() {
///         break;
///     }
/// }
/// # Ok(())
/// # }
/// ```
pub struct PollingController {
    endpoint: Arc<dyn TokenEndpoint>,
    store: Arc<dyn CredentialStore>,
    shared: Arc<Shared>,
}

impl PollingController {
    pub fn new(endpoint: Arc<dyn TokenEndpoint>, store: Arc<dyn CredentialStore>) -> Self {
        let (state_tx, _) = watch::channel(FlowState::Idle);
        Self {
            endpoint,
            store,
            shared: Arc::new(Shared {
                state_tx,
                session: Mutex::new(None),
            }),
        }
    }

    /// Current flow state.
    pub fn state(&self) -> FlowState {
        self.shared.state_tx.borrow().clone()
    }

    /// Subscribe to state changes via a [`watch::Receiver`].
    pub fn watch_state(&self) -> watch::Receiver<FlowState> {
        self.shared.state_tx.subscribe()
    }

    /// Whether a sign-in session is in progress.
    pub fn is_active(&self) -> bool {
        self.shared.lock_session().is_some()
    }

    pub fn is_logged_in(&self) -> bool {
        self.store.is_logged_in()
    }

    /// Start a device-code sign-in.
    ///
    /// Returns `None` without side effects when a session is already active.
    /// Must be called from within a tokio runtime.
    pub fn sign_in(&self) -> Option<JoinHandle<()>> {
        let cancel = {
            let mut session = self.shared.lock_session();
            if session.is_some() {
                tracing::warn!("sign-in already in progress, ignoring request");
                return None;
            }
            let cancel = CancellationToken::new();
            *session = Some(cancel.clone());
            self.shared.state_tx.send_replace(FlowState::Requesting);
            cancel
        };

        let flow_id = Uuid::new_v4();
        let session = Session {
            endpoint: self.endpoint.clone(),
            store: self.store.clone(),
            shared: self.shared.clone(),
            cancel,
        };
        let span = tracing::info_span!("device_flow", %flow_id);
        Some(tokio::spawn(session.run().instrument(span)))
    }

    /// Cancel any session and return to [`FlowState::Idle`].
    pub fn dispose(&self) {
        let mut session = self.shared.lock_session();
        if let Some(cancel) = session.take() {
            cancel.cancel();
            tracing::debug!("device flow cancelled");
        }
        self.shared.state_tx.send_replace(FlowState::Idle);
    }

    /// Cancel any session and forget the stored credential.
    pub fn sign_out(&self) -> Result<(), AuthError> {
        self.dispose();
        self.store.clear()?;
        tracing::info!("signed out");
        Ok(())
    }
}

impl Drop for PollingController {
    fn drop(&mut self) {
        if let Some(cancel) = self.shared.lock_session().take() {
            cancel.cancel();
        }
    }
}

struct Shared {
    state_tx: watch::Sender<FlowState>,
    session: Mutex<Option<CancellationToken>>,
}

impl Shared {
    fn lock_session(&self) -> MutexGuard<'_, Option<CancellationToken>> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Publish `state` unless the session was cancelled. Terminal states
    /// release the session slot.
    fn publish(&self, cancel: &CancellationToken, state: FlowState) -> bool {
        let mut session = self.lock_session();
        if cancel.is_cancelled() {
            return false;
        }
        if state.is_terminal() {
            *session = None;
        }
        self.state_tx.send_replace(state);
        true
    }

    /// Persist the credential and publish [`FlowState::Succeeded`] atomically
    /// with respect to cancellation.
    fn complete(
        &self,
        cancel: &CancellationToken,
        store: &dyn CredentialStore,
        credential: &StoredCredential,
    ) -> Result<bool, AuthError> {
        let mut session = self.lock_session();
        if cancel.is_cancelled() {
            return Ok(false);
        }
        store.save(credential)?;
        *session = None;
        self.state_tx.send_replace(FlowState::Succeeded);
        Ok(true)
    }
}

struct Session {
    endpoint: Arc<dyn TokenEndpoint>,
    store: Arc<dyn CredentialStore>,
    shared: Arc<Shared>,
    cancel: CancellationToken,
}

/// Countdown bookkeeping shared by the wait and in-flight phases.
struct Countdown {
    ticker: Interval,
    expires_at: Instant,
    prompt: DevicePrompt,
    attempt: u32,
}

enum Step {
    Continue,
    Stop,
}

impl Session {
    async fn run(self) {
        let grant = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return,
            result = self.endpoint.request_device_code() => result,
        };
        let grant = match grant {
            Ok(grant) => grant,
            Err(err) => {
                tracing::warn!(error = %err, "device code request failed");
                self.publish(FlowState::Failed {
                    message: err.to_string(),
                });
                return;
            }
        };
        self.poll_until_done(grant).await;
    }

    async fn poll_until_done(&self, grant: DeviceCodeGrant) {
        let issued_at = Instant::now();
        let one_second = Duration::from_secs(1);
        let lifetime = grant_duration(grant.expires_in);
        let mut countdown = Countdown {
            ticker: tokio::time::interval_at(issued_at + one_second, one_second),
            expires_at: issued_at + lifetime,
            prompt: DevicePrompt {
                user_code: grant.user_code.clone(),
                verification_url: grant.verification_url.clone(),
                remaining_secs: lifetime.as_secs(),
            },
            attempt: 0,
        };
        countdown
            .ticker
            .set_missed_tick_behavior(MissedTickBehavior::Delay);

        if !self.publish(FlowState::AwaitingUserAction(countdown.prompt.clone())) {
            return;
        }

        let base_delay = grant_duration(grant.interval.max(MIN_POLL_INTERVAL_SECS));
        let mut delay = base_delay;
        tracing::info!(
            user_code = %grant.user_code,
            expires_in = grant.expires_in,
            delay_secs = base_delay.as_secs(),
            "waiting for user authorization"
        );

        loop {
            let wake_at = Instant::now() + delay;
            loop {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => return,
                    _ = tokio::time::sleep_until(wake_at) => break,
                    _ = countdown.ticker.tick() => {
                        if let Step::Stop = self.tick(&mut countdown) {
                            return;
                        }
                    }
                }
            }

            if Instant::now() >= countdown.expires_at {
                tracing::info!("device code expired, stopping polling");
                self.publish(FlowState::Expired);
                return;
            }

            countdown.attempt += 1;
            if !self.publish(FlowState::Polling {
                prompt: countdown.prompt.clone(),
                attempt: countdown.attempt,
            }) {
                return;
            }

            tracing::debug!(attempt = countdown.attempt, "polling for token");
            let poll = self
                .endpoint
                .poll_for_token(&grant.device_code, grant.interval);
            tokio::pin!(poll);
            let result = loop {
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => return,
                    result = &mut poll => break result,
                    _ = countdown.ticker.tick() => {
                        if let Step::Stop = self.tick(&mut countdown) {
                            return;
                        }
                    }
                }
            };

            delay = match result {
                Ok(token) => match token.outcome() {
                    TokenOutcome::Authorized {
                        access_token,
                        refresh_token,
                    } => {
                        self.finish(StoredCredential::new(access_token, refresh_token));
                        return;
                    }
                    TokenOutcome::AuthorizationPending => {
                        tracing::debug!("authorization pending, continuing to poll");
                        base_delay
                    }
                    TokenOutcome::SlowDown => {
                        let slowed = base_delay.saturating_mul(2);
                        tracing::debug!(delay_secs = slowed.as_secs(), "slow down requested");
                        slowed
                    }
                    TokenOutcome::ExpiredToken => {
                        tracing::info!("provider reported expired device code");
                        self.publish(FlowState::Expired);
                        return;
                    }
                    other => {
                        let message = other.failure_message().unwrap_or_default();
                        tracing::warn!(error = %message, "authorization failed");
                        self.publish(FlowState::Failed { message });
                        return;
                    }
                },
                Err(err) if err.is_transient() => {
                    tracing::warn!(error = %err, "token poll failed, retrying");
                    base_delay
                }
                Err(err) => {
                    tracing::warn!(error = %err, "token poll failed");
                    self.publish(FlowState::Failed {
                        message: err.to_string(),
                    });
                    return;
                }
            };
        }
    }

    fn tick(&self, countdown: &mut Countdown) -> Step {
        let left = countdown
            .expires_at
            .saturating_duration_since(Instant::now());
        let remaining_secs = left.as_secs() + u64::from(left.subsec_nanos() > 0);
        if remaining_secs == 0 {
            tracing::info!("device code expired");
            self.publish(FlowState::Expired);
            return Step::Stop;
        }
        countdown.prompt.remaining_secs = remaining_secs;
        let state = if countdown.attempt == 0 {
            FlowState::AwaitingUserAction(countdown.prompt.clone())
        } else {
            FlowState::Polling {
                prompt: countdown.prompt.clone(),
                attempt: countdown.attempt,
            }
        };
        if self.publish(state) {
            Step::Continue
        } else {
            Step::Stop
        }
    }

    fn finish(&self, credential: StoredCredential) {
        match self
            .shared
            .complete(&self.cancel, self.store.as_ref(), &credential)
        {
            Ok(true) => tracing::info!("access token received"),
            Ok(false) => {}
            Err(err) => {
                tracing::error!(error = %err, "failed to persist credential");
                self.publish(FlowState::Failed {
                    message: format!("Failed to save credentials: {err}"),
                });
            }
        }
    }

    fn publish(&self, state: FlowState) -> bool {
        self.shared.publish(&self.cancel, state)
    }
}
