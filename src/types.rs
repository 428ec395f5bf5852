//! Session domain types shared across the crate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// ROLE
// =============================================================================

/// Marketplace role, fixed at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Looking for jobs and missions.
    Seeker,
    /// Posting opportunities.
    Provider,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Seeker => "seeker",
            Self::Provider => "provider",
        }
    }

    /// Dashboard a user of this role lands on.
    #[must_use]
    pub fn home(self) -> Route {
        match self {
            Self::Seeker => Route::SeekerDashboard,
            Self::Provider => Route::ProviderDashboard,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}' (expected 'seeker' or 'provider')")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seeker" => Ok(Self::Seeker),
            "provider" => Ok(Self::Provider),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

// =============================================================================
// ROUTE
// =============================================================================

/// Navigation targets the session layer can send a visitor to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    SeekerDashboard,
    ProviderDashboard,
}

impl Route {
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::SeekerDashboard => "/seeker/dashboard",
            Self::ProviderDashboard => "/provider/dashboard",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

// Routes appear in output as their path.
impl Serialize for Route {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.path())
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// The authenticated identity for this client. Always fully populated.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub access_token: String,
    #[serde(skip_serializing)]
    pub refresh_token: String,
}

// Tokens stay out of logs and debug output.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .finish()
    }
}

/// Lifecycle of the session context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPhase {
    /// Storage has not been read yet.
    Initializing,
    Anonymous,
    Authenticated(Session),
}

impl AuthPhase {
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::Authenticated(session) => Some(session),
            Self::Initializing | Self::Anonymous => None,
        }
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Initializing)
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Initializing => "initializing",
            Self::Anonymous => "anonymous",
            Self::Authenticated(_) => "authenticated",
        }
    }
}

// =============================================================================
// PENDING ACTION
// =============================================================================

/// An action an anonymous visitor attempted, replayed after login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    Apply { opportunity_id: String },
}

impl PendingAction {
    #[must_use]
    pub fn apply(opportunity_id: impl Into<String>) -> Self {
        Self::Apply { opportunity_id: opportunity_id.into() }
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
