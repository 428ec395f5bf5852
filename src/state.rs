//! Application state wiring.
//!
//! DESIGN
//! ======
//! `AppState` is built once at startup and handed to whatever drives the
//! client (the CLI here). It owns the session context and the two services
//! layered on it: the authenticated request client and the deferred action
//! relay. `boot` initializes the context before returning, so no guard ever
//! runs against an unread store.

use std::sync::Arc;

use serde::Serialize;

use crate::api;
use crate::backend::Backend;
use crate::client::AuthClient;
use crate::config::ClientConfig;
use crate::credentials::CredentialStore;
use crate::error::SessionError;
use crate::navigation::Navigator;
use crate::relay::{DeferredActionRelay, DrainOutcome};
use crate::session::{LoginOutcome, SessionContext};
use crate::storage::{FileStorage, Storage};
use crate::transport::{HttpTransport, Transport};
use crate::types::{PendingAction, Role};

/// Result of [`AppState::login`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginReport {
    pub outcome: LoginOutcome,
    /// Replay of an action deferred before login, if one ran.
    pub replay: Option<DrainOutcome>,
}

/// Result of [`AppState::apply`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ApplyOutcome {
    /// The visitor was anonymous; the application waits for login.
    Deferred { opportunity_id: String },
    Submitted { opportunity_id: String, response: serde_json::Value },
}

#[derive(Clone)]
pub struct AppState {
    pub context: Arc<SessionContext>,
    pub client: AuthClient,
    pub relay: DeferredActionRelay,
}

impl AppState {
    /// Build the production stack from `config`: file storage and an HTTP
    /// transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn boot(config: &ClientConfig, navigator: Arc<dyn Navigator>) -> Result<Self, SessionError> {
        let storage = Arc::new(FileStorage::open(&config.storage_path));
        let transport = Arc::new(HttpTransport::new(&config.api_url, config.timeouts)?);
        tracing::debug!(api_url = %config.api_url, storage = %config.storage_path.display(), "booting client");
        Ok(Self::with_parts(storage, transport, navigator))
    }

    /// Wire the stack from explicit parts and initialize the session.
    #[must_use]
    pub fn with_parts(storage: Arc<dyn Storage>, transport: Arc<dyn Transport>, navigator: Arc<dyn Navigator>) -> Self {
        let context = Arc::new(SessionContext::new(
            CredentialStore::new(storage),
            Backend::new(transport),
            navigator,
        ));
        context.initialize();
        let client = AuthClient::new(context.clone());
        let relay = DeferredActionRelay::new(client.clone());
        Self { context, client, relay }
    }

    /// Log in, replay any deferred action for seekers, then go home.
    ///
    /// # Errors
    ///
    /// Propagates [`SessionContext::login`] failures. A failed replay is
    /// reported in [`LoginReport::replay`], not as an error.
    pub async fn login(&self, email: &str, password: &str, role: Role) -> Result<LoginReport, SessionError> {
        let outcome = self.context.login(email, password, role).await?;
        let replay = match self.context.current_session() {
            Some(session) => self.relay.drain_if_pending(&session).await,
            None => None,
        };
        self.context.navigator().navigate(outcome.home);
        Ok(LoginReport { outcome, replay })
    }

    /// Apply to an opportunity now, or defer it until login when anonymous.
    ///
    /// # Errors
    ///
    /// Storage failures while deferring, or any error from the apply call.
    pub async fn apply(&self, opportunity_id: &str) -> Result<ApplyOutcome, SessionError> {
        if !self.context.is_authenticated() {
            self.relay.defer(&PendingAction::apply(opportunity_id))?;
            return Ok(ApplyOutcome::Deferred { opportunity_id: opportunity_id.to_owned() });
        }
        let response = api::apply_to_opportunity(&self.client, opportunity_id).await?;
        self.context.store().increment_applications_sent()?;
        Ok(ApplyOutcome::Submitted { opportunity_id: opportunity_id.to_owned(), response })
    }
}

#[cfg(test)]
#[path = "state_test.rs"]
mod tests;
