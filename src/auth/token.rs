//! Access-token lifecycle
//!
//! [`TokenManager`] asks the identity provider for a token once the client is
//! ready, hands it to listeners and to anyone awaiting [`TokenManager::get_token`],
//! and schedules a forced renewal shortly before the token expires.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use futures::future::BoxFuture;
use futures::FutureExt;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::client::{AuthClient, AuthConfig};
use super::error::AuthError;
use super::jwt;

/// Outcome of a token request. Both fields empty means "not logged in".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenState {
    pub token: Option<String>,
    pub error: Option<AuthError>,
}

impl TokenState {
    fn token(token: String) -> Self {
        Self {
            token: Some(token),
            error: None,
        }
    }

    fn error(error: AuthError) -> Self {
        Self {
            token: None,
            error: Some(error),
        }
    }
}

pub type TokenListener = Arc<dyn Fn(&TokenState) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// One-shot slot that `get_token` waits on. Replaced on every reset.
type Deferred = Arc<watch::Sender<Option<TokenState>>>;

fn deferred() -> Deferred {
    Arc::new(watch::channel(None).0)
}

struct Inner {
    deferred: Deferred,
    is_token_requested: bool,
    refresh: Option<JoinHandle<()>>,
    latest: Option<TokenState>,
    disposed: bool,
}

pub struct TokenManager {
    client: Arc<dyn AuthClient>,
    config: AuthConfig,
    inner: Mutex<Inner>,
    listeners: Mutex<Vec<(ListenerId, TokenListener)>>,
    next_listener: AtomicU64,
    this: Weak<TokenManager>,
}

impl TokenManager {
    pub fn new(client: Arc<dyn AuthClient>, config: AuthConfig) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            client,
            config,
            inner: Mutex::new(Inner {
                deferred: deferred(),
                is_token_requested: false,
                refresh: None,
                latest: None,
                disposed: false,
            }),
            listeners: Mutex::new(Vec::new()),
            next_listener: AtomicU64::new(0),
            this: this.clone(),
        })
    }

    /// Request the first token. Call once the client has been constructed.
    pub async fn init(&self) {
        if let Some(this) = self.this.upgrade() {
            this.update(false).await;
        }
    }

    pub fn add_listener(&self, listener: TokenListener) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().push((id, listener));
        id
    }

    pub fn remove_listener(&self, id: ListenerId) {
        self.listeners.lock().retain(|(listener_id, _)| *listener_id != id);
    }

    /// Last state delivered to listeners, if any
    pub fn latest(&self) -> Option<TokenState> {
        self.inner.lock().latest.clone()
    }

    /// Wait for the outcome of the current token request.
    ///
    /// A reset while waiting moves the wait onto the next request.
    pub async fn get_token(&self) -> TokenState {
        loop {
            let mut rx = {
                let inner = self.inner.lock();
                if inner.disposed {
                    return TokenState::error(AuthError::Disposed);
                }
                inner.deferred.subscribe()
            };

            let outcome = rx
                .wait_for(Option::is_some)
                .await
                .map(|state| (*state).clone());
            match outcome {
                Ok(state) => return state.unwrap_or_default(),
                // The slot was replaced by a reset
                Err(_) => continue,
            }
        }
    }

    /// Forget the current token so the next update requests a fresh one.
    /// Must be called before an interactive login.
    pub fn reset(&self) {
        let mut inner = self.inner.lock();
        Self::reset_locked(&mut inner);
    }

    fn reset_locked(inner: &mut Inner) {
        inner.deferred = deferred();
        inner.is_token_requested = false;
        if let Some(refresh) = inner.refresh.take() {
            refresh.abort();
        }
    }

    /// Stop renewals and release waiters
    pub fn dispose(&self) {
        let deferred = {
            let mut inner = self.inner.lock();
            inner.disposed = true;
            if let Some(refresh) = inner.refresh.take() {
                refresh.abort();
            }
            inner.deferred.clone()
        };
        self.listeners.lock().clear();
        deferred.send_if_modified(|slot| {
            if slot.is_none() {
                *slot = Some(TokenState::error(AuthError::Disposed));
                true
            } else {
                false
            }
        });
        tracing::debug!("Token manager disposed");
    }

    fn update(self: Arc<Self>, refresh: bool) -> BoxFuture<'static, ()> {
        async move {
            if self.client.is_loading() || self.inner.lock().disposed {
                return;
            }

            if !self.client.is_authenticated() {
                let deferred = self.inner.lock().deferred.clone();
                self.set_state(TokenState::default(), &deferred);
                return;
            }

            let deferred = {
                let mut inner = self.inner.lock();
                if inner.is_token_requested {
                    if !refresh {
                        return;
                    }
                    Self::reset_locked(&mut inner);
                }
                inner.is_token_requested = true;
                inner.deferred.clone()
            };

            match self.fetch_token(refresh).await {
                Ok(token) => {
                    self.set_state(TokenState::token(token.clone()), &deferred);
                    let current = Arc::ptr_eq(&deferred, &self.inner.lock().deferred);
                    if current {
                        self.schedule_refresh(&token);
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to fetch access token");
                    self.set_state(TokenState::error(e), &deferred);
                }
            }
        }
        .boxed()
    }

    async fn fetch_token(&self, refresh: bool) -> Result<String, AuthError> {
        let audience = &self.config.audience;
        match self.client.access_token_silently(audience, refresh).await {
            Ok(token) => Ok(token),
            Err(e) if e.needs_interaction() => {
                tracing::error!(error = %e, "Silent token fetch failed, falling back to popup");
                self.client.access_token_with_popup(audience, refresh).await
            }
            Err(e) => Err(e),
        }
    }

    fn set_state(&self, state: TokenState, deferred: &Deferred) {
        self.inner.lock().latest = Some(state.clone());

        let listeners: Vec<TokenListener> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&state);
        }

        deferred.send_replace(Some(state));
    }

    fn schedule_refresh(&self, token: &str) {
        let exp = match jwt::decode_exp(token) {
            Ok(exp) => exp,
            Err(e) => {
                tracing::warn!(error = %e, "Token has no usable expiry, not scheduling renewal");
                return;
            }
        };

        let delay = jwt::refresh_delay(
            exp,
            chrono::Utc::now().timestamp_millis(),
            self.config.refresh_seconds_before_expiry,
        );
        tracing::debug!(delay_ms = delay.as_millis() as u64, "Scheduling token renewal");

        let this = self.this.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Some(manager) = this.upgrade() {
                // Separate task: the renewal resets and aborts this timer
                tokio::spawn(manager.update(true));
            }
        });

        if let Some(previous) = self.inner.lock().refresh.replace(handle) {
            previous.abort();
        }
    }
}

impl Drop for TokenManager {
    fn drop(&mut self) {
        if let Some(refresh) = self.inner.get_mut().refresh.take() {
            refresh.abort();
        }
    }
}
