//! Session context: the single source of truth for who is logged in.
//!
//! ARCHITECTURE
//! ============
//! `SessionContext` is built once at boot and shared behind `Arc`. Its phase
//! (`Initializing` → `Anonymous` | `Authenticated`) lives in a `watch`
//! channel so guards and views observe every transition. The credential
//! store mirrors the authenticated session so a restart picks it back up.
//!
//! REFRESH COALESCING
//! ==================
//! Refreshes are serialized by an async gate. A caller that saw token `T`
//! fail and, once inside the gate, finds the session already holding a
//! different token, returns that token without another `/auth/refresh`
//! call. N requests failing together therefore share one refresh.
//!
//! FAILURE POLICY
//! ==============
//! Logout never fails: the backend notification is best-effort, local state
//! is always cleared. A refresh failure of any kind logs the visitor out.
//! Every login and logout starts a new epoch; a refresh that resolves in a
//! later epoch than it started in is discarded.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{Mutex, watch};

use crate::backend::{Backend, RegisteredUser, Registration};
use crate::credentials::CredentialStore;
use crate::error::{RefreshFailure, SessionError};
use crate::navigation::Navigator;
use crate::types::{AuthPhase, Role, Route, Session};

/// Result of a successful login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginOutcome {
    pub role: Role,
    /// Where this role lands after login.
    pub home: Route,
}

pub struct SessionContext {
    store: CredentialStore,
    backend: Backend,
    navigator: Arc<dyn Navigator>,
    phase: watch::Sender<AuthPhase>,
    refresh_gate: Mutex<()>,
    epoch: AtomicU64,
}

impl SessionContext {
    /// Create a context in the `Initializing` phase. Call [`Self::initialize`]
    /// before evaluating any route.
    #[must_use]
    pub fn new(store: CredentialStore, backend: Backend, navigator: Arc<dyn Navigator>) -> Self {
        let (phase, _) = watch::channel(AuthPhase::Initializing);
        Self { store, backend, navigator, phase, refresh_gate: Mutex::new(()), epoch: AtomicU64::new(0) }
    }

    /// Read the credential store and leave the `Initializing` phase.
    pub fn initialize(&self) {
        let next = match self.store.read() {
            Some(session) => {
                tracing::info!(user_id = %session.user_id, role = %session.role, "session restored");
                AuthPhase::Authenticated(session)
            }
            None => AuthPhase::Anonymous,
        };
        self.phase.send_replace(next);
    }

    // =========================================================================
    // OBSERVATION
    // =========================================================================

    #[must_use]
    pub fn phase(&self) -> AuthPhase {
        self.phase.borrow().clone()
    }

    /// Receiver that observes every phase transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthPhase> {
        self.phase.subscribe()
    }

    #[must_use]
    pub fn current_session(&self) -> Option<Session> {
        self.phase.borrow().session().cloned()
    }

    /// Access token of the live session, read at call time.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.phase.borrow().session().map(|s| s.access_token.clone())
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.phase.borrow().is_loading()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.phase.borrow().session().is_some()
    }

    #[must_use]
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    #[must_use]
    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    #[must_use]
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    // =========================================================================
    // LOGIN / REGISTER / LOGOUT
    // =========================================================================

    /// Exchange credentials for a session.
    ///
    /// # Errors
    ///
    /// [`SessionError::CredentialsRejected`] with the backend's reason, or a
    /// transport/storage error. The phase is unchanged on failure.
    pub async fn login(&self, email: &str, password: &str, role: Role) -> Result<LoginOutcome, SessionError> {
        let tokens = match self.backend.login(email, password).await {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::warn!(error = %e, "login failed");
                return Err(e);
            }
        };

        let session = Session {
            user_id: tokens.user_id,
            email: tokens.email,
            role,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
        };
        self.store.write(&session)?;
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let access_token = session.access_token.clone();
        tracing::info!(user_id = %session.user_id, %role, "logged in");
        self.phase.send_replace(AuthPhase::Authenticated(session));

        match self.backend.fetch_profile(&access_token).await {
            Ok(profile) => {
                if let Err(e) = self.store.cache_profile(&profile) {
                    tracing::warn!(error = %e, "profile cache write failed");
                }
            }
            Err(e) => tracing::warn!(error = %e, "profile fetch after login failed"),
        }

        Ok(LoginOutcome { role, home: role.home() })
    }

    /// Create an account, then send the visitor to the login view.
    ///
    /// # Errors
    ///
    /// [`SessionError::PasswordMismatch`] before any network call, or
    /// [`SessionError::RegistrationRejected`] with the backend's reason.
    pub async fn register(&self, registration: &Registration) -> Result<RegisteredUser, SessionError> {
        if registration.password != registration.confirm_password {
            return Err(SessionError::PasswordMismatch);
        }
        let user = self.backend.register(registration).await?;
        tracing::info!(user_id = %user.user_id, "registered");
        self.navigator.navigate(Route::Login);
        Ok(user)
    }

    /// End the session locally, notifying the backend on a best-effort basis.
    pub async fn logout(&self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        let tokens = self.access_token().zip(self.store.refresh_token());
        if let Some((access_token, refresh_token)) = tokens {
            if let Err(e) = self.backend.logout(&access_token, &refresh_token).await {
                tracing::warn!(error = %e, "backend logout failed; clearing local session anyway");
            }
        }

        if let Err(e) = self.store.clear() {
            tracing::error!(error = %e, "credential store clear failed");
        }
        self.phase.send_replace(AuthPhase::Anonymous);
        tracing::info!("logged out");
        self.navigator.navigate(Route::Login);
    }

    // =========================================================================
    // REFRESH
    // =========================================================================

    /// Mint a new access token from the stored refresh token.
    ///
    /// # Errors
    ///
    /// [`SessionError::RefreshFailed`]; the session has been logged out.
    pub async fn refresh_access_token(&self) -> Result<String, SessionError> {
        let _gate = self.refresh_gate.lock().await;
        self.run_refresh().await
    }

    /// Refresh on behalf of a request that failed with `stale`. If another
    /// caller already replaced that token, the current one is returned.
    pub(crate) async fn refresh_after(&self, stale: Option<&str>) -> Result<String, SessionError> {
        let _gate = self.refresh_gate.lock().await;
        match (self.access_token(), stale) {
            (Some(current), _) if stale != Some(current.as_str()) => {
                tracing::debug!("refresh already completed by another request");
                Ok(current)
            }
            // Another request's refresh failed and already logged out.
            (None, Some(_)) => Err(RefreshFailure::MissingRefreshToken.into()),
            _ => self.run_refresh().await,
        }
    }

    async fn run_refresh(&self) -> Result<String, SessionError> {
        match self.exchange_refresh_token().await {
            Ok(token) => Ok(token),
            Err(failure @ RefreshFailure::SessionEnded) => {
                tracing::debug!("session ended during refresh; new token discarded");
                Err(failure.into())
            }
            Err(failure) => {
                tracing::warn!(error = %failure, "token refresh failed; logging out");
                self.logout().await;
                Err(failure.into())
            }
        }
    }

    async fn exchange_refresh_token(&self) -> Result<String, RefreshFailure> {
        let refresh_token = self.store.refresh_token().ok_or(RefreshFailure::MissingRefreshToken)?;
        let started = self.epoch.load(Ordering::SeqCst);
        let refreshed = self.backend.refresh(&refresh_token).await?;

        if self.epoch.load(Ordering::SeqCst) != started || !self.is_authenticated() {
            return Err(RefreshFailure::SessionEnded);
        }

        self.store
            .update_tokens(&refreshed.access_token, refreshed.refresh_token.as_deref())
            .map_err(|e| RefreshFailure::Transport(format!("token persist failed: {e}")))?;
        self.phase.send_modify(|phase| {
            if let AuthPhase::Authenticated(session) = phase {
                session.access_token.clone_from(&refreshed.access_token);
                if let Some(rotated) = &refreshed.refresh_token {
                    session.refresh_token.clone_from(rotated);
                }
            }
        });
        tracing::debug!(rotated = refreshed.refresh_token.is_some(), "access token refreshed");
        Ok(refreshed.access_token)
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
