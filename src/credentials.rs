//! Credential store: typed view over [`Storage`] for session data.
//!
//! DESIGN
//! ======
//! Each session field lives under its own key (the key names are shared with
//! the web client, which reads them directly). `read` only yields a session
//! when every field is present, non-empty and the role parses, so a
//! half-written or hand-edited store reads as "no session".

use std::sync::Arc;

use crate::error::StorageError;
use crate::storage::Storage;
use crate::types::{PendingAction, Session};

pub const TOKEN_KEY: &str = "token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_ID_KEY: &str = "user_id";
pub const EMAIL_KEY: &str = "email";
pub const ROLE_KEY: &str = "role";
pub const USER_PROFILE_KEY: &str = "user_profile";
pub const PENDING_APPLICATION_KEY: &str = "pending_application_id";
pub const APPLICATIONS_SENT_KEY: &str = "applicationsSentDelta";

const SESSION_KEYS: [&str; 5] = [TOKEN_KEY, REFRESH_TOKEN_KEY, USER_ID_KEY, EMAIL_KEY, ROLE_KEY];

#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn Storage>,
}

impl CredentialStore {
    #[must_use]
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage }
    }

    // =========================================================================
    // SESSION
    // =========================================================================

    /// Persist every session field under its own key. A failed write clears
    /// the session keys so no partial session is left behind.
    ///
    /// # Errors
    ///
    /// Returns the first storage failure.
    pub fn write(&self, session: &Session) -> Result<(), StorageError> {
        let result = self.write_fields(session);
        if let Err(e) = &result {
            tracing::warn!(error = %e, "session write failed; clearing partial session");
            for key in SESSION_KEYS {
                if let Err(e) = self.storage.remove(key) {
                    tracing::warn!(error = %e, key, "credential removal failed");
                }
            }
        }
        result
    }

    fn write_fields(&self, session: &Session) -> Result<(), StorageError> {
        self.storage.set(TOKEN_KEY, &session.access_token)?;
        self.storage.set(REFRESH_TOKEN_KEY, &session.refresh_token)?;
        self.storage.set(USER_ID_KEY, &session.user_id)?;
        self.storage.set(EMAIL_KEY, &session.email)?;
        self.storage.set(ROLE_KEY, session.role.as_str())
    }

    /// Load the persisted session, or `None` if any field is missing or invalid.
    #[must_use]
    pub fn read(&self) -> Option<Session> {
        let access_token = self.non_empty(TOKEN_KEY)?;
        let refresh_token = self.non_empty(REFRESH_TOKEN_KEY)?;
        let user_id = self.non_empty(USER_ID_KEY)?;
        let email = self.non_empty(EMAIL_KEY)?;
        let role = self.non_empty(ROLE_KEY)?.parse().ok()?;
        Some(Session { user_id, email, role, access_token, refresh_token })
    }

    /// Remove the session, the cached profile, the pending action and the
    /// applications counter. Every key is attempted even if one fails.
    ///
    /// # Errors
    ///
    /// Returns the first storage failure after all removals were attempted.
    pub fn clear(&self) -> Result<(), StorageError> {
        let mut first_error = None;
        let keys = SESSION_KEYS
            .iter()
            .chain(&[USER_PROFILE_KEY, PENDING_APPLICATION_KEY, APPLICATIONS_SENT_KEY]);
        for key in keys {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!(error = %e, key, "credential removal failed");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.non_empty(TOKEN_KEY)
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<String> {
        self.non_empty(REFRESH_TOKEN_KEY)
    }

    /// Overwrite the access token, and the refresh token only when rotated.
    ///
    /// # Errors
    ///
    /// Returns the first storage failure.
    pub fn update_tokens(&self, access_token: &str, refresh_token: Option<&str>) -> Result<(), StorageError> {
        self.storage.set(TOKEN_KEY, access_token)?;
        if let Some(refresh_token) = refresh_token {
            self.storage.set(REFRESH_TOKEN_KEY, refresh_token)?;
        }
        Ok(())
    }

    // =========================================================================
    // CACHED PROFILE
    // =========================================================================

    /// # Errors
    ///
    /// Returns an error if the profile could not be stored.
    pub fn cache_profile(&self, profile: &serde_json::Value) -> Result<(), StorageError> {
        self.storage.set(USER_PROFILE_KEY, &profile.to_string())
    }

    /// Cached profile snapshot; unparseable contents read as absent.
    #[must_use]
    pub fn cached_profile(&self) -> Option<serde_json::Value> {
        let raw = self.storage.get(USER_PROFILE_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    // =========================================================================
    // PENDING ACTION
    // =========================================================================

    /// Store `action`, replacing any earlier one.
    ///
    /// # Errors
    ///
    /// Returns an error if the action could not be stored.
    pub fn set_pending_action(&self, action: &PendingAction) -> Result<(), StorageError> {
        match action {
            PendingAction::Apply { opportunity_id } => self.storage.set(PENDING_APPLICATION_KEY, opportunity_id),
        }
    }

    #[must_use]
    pub fn pending_action(&self) -> Option<PendingAction> {
        self.non_empty(PENDING_APPLICATION_KEY).map(PendingAction::apply)
    }

    /// # Errors
    ///
    /// Returns an error if the removal could not be persisted.
    pub fn remove_pending_action(&self) -> Result<(), StorageError> {
        self.storage.remove(PENDING_APPLICATION_KEY)
    }

    // =========================================================================
    // APPLICATIONS COUNTER
    // =========================================================================

    /// Applications submitted since the counter was last cleared.
    #[must_use]
    pub fn applications_sent(&self) -> u64 {
        self.storage
            .get(APPLICATIONS_SENT_KEY)
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or(0)
    }

    /// # Errors
    ///
    /// Returns an error if the new count could not be stored.
    pub fn increment_applications_sent(&self) -> Result<u64, StorageError> {
        let next = self.applications_sent().saturating_add(1);
        self.storage.set(APPLICATIONS_SENT_KEY, &next.to_string())?;
        Ok(next)
    }

    fn non_empty(&self, key: &str) -> Option<String> {
        self.storage.get(key).filter(|v| !v.is_empty())
    }
}

#[cfg(test)]
#[path = "credentials_test.rs"]
mod tests;
