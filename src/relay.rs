//! Deferred action relay.
//!
//! DESIGN
//! ======
//! An anonymous visitor who clicks "Apply" is sent to login with the
//! opportunity parked in the credential store. After a seeker logs in the
//! parked action is replayed exactly once through the authenticated client
//! and removed whether or not the replay worked. Only one action is kept;
//! deferring again replaces it.

use serde::Serialize;

use crate::api;
use crate::client::AuthClient;
use crate::error::{SessionError, StorageError};
use crate::types::{PendingAction, Role, Route, Session};

/// What happened to a replayed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DrainOutcome {
    Applied { opportunity_id: String, applications_sent: u64 },
    Failed { opportunity_id: String, reason: String },
}

#[derive(Clone)]
pub struct DeferredActionRelay {
    client: AuthClient,
}

impl DeferredActionRelay {
    #[must_use]
    pub fn new(client: AuthClient) -> Self {
        Self { client }
    }

    /// Park `action` and send the visitor to login.
    ///
    /// # Errors
    ///
    /// Returns an error if the action could not be stored; no navigation
    /// happens in that case.
    pub fn defer(&self, action: &PendingAction) -> Result<(), StorageError> {
        let context = self.client.context();
        context.store().set_pending_action(action)?;
        tracing::info!(?action, "action deferred until login");
        context.navigator().navigate(Route::Login);
        Ok(())
    }

    /// Replay the parked action for a freshly logged-in seeker.
    ///
    /// Returns `None` for providers and when nothing is parked.
    pub async fn drain_if_pending(&self, session: &Session) -> Option<DrainOutcome> {
        if session.role != Role::Seeker {
            return None;
        }
        let store = self.client.context().store();
        let action = store.pending_action()?;

        let outcome = match self.replay(&action).await {
            Ok(outcome) => outcome,
            Err((opportunity_id, e)) => {
                tracing::warn!(%opportunity_id, error = %e, "deferred application failed");
                DrainOutcome::Failed { opportunity_id, reason: e.to_string() }
            }
        };

        if let Err(e) = store.remove_pending_action() {
            tracing::warn!(error = %e, "pending action removal failed");
        }
        Some(outcome)
    }

    async fn replay(&self, action: &PendingAction) -> Result<DrainOutcome, (String, SessionError)> {
        match action {
            PendingAction::Apply { opportunity_id } => {
                api::apply_to_opportunity(&self.client, opportunity_id)
                    .await
                    .map_err(|e| (opportunity_id.clone(), e))?;
                let applications_sent = match self.client.context().store().increment_applications_sent() {
                    Ok(count) => count,
                    Err(e) => {
                        tracing::warn!(error = %e, "applications counter update failed");
                        self.client.context().store().applications_sent()
                    }
                };
                tracing::info!(%opportunity_id, applications_sent, "deferred application submitted");
                Ok(DrainOutcome::Applied { opportunity_id: opportunity_id.clone(), applications_sent })
            }
        }
    }
}

#[cfg(test)]
#[path = "relay_test.rs"]
mod tests;
