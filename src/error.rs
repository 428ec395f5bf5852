//! Error types for the session subsystem.
//!
//! DESIGN
//! ======
//! Storage and transport each own a small error enum; `SessionError` is the
//! single type surfaced to callers. Only credential rejection and terminal
//! refresh failure are meant to reach a user; everything else is either
//! logged and swallowed (best-effort work) or a programming/config error.

/// Errors produced by a [`crate::storage::Storage`] backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io failed for {path}: {message}")]
    Io { path: String, message: String },

    #[error("storage serialize failed: {0}")]
    Serialize(String),
}

/// Errors produced by a [`crate::transport::Transport`].
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("request failed: {0}")]
    Request(String),

    /// The response arrived but its body could not be read.
    #[error("response body read failed: {0}")]
    Body(String),

    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

/// Why a token refresh could not complete. Every variant is terminal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefreshFailure {
    #[error("no refresh token available")]
    MissingRefreshToken,

    #[error("refresh rejected with status {status}")]
    Rejected { status: u16 },

    #[error("refresh request failed: {0}")]
    Transport(String),

    #[error("refresh response malformed: {0}")]
    Malformed(String),

    /// Logout or a new login happened while the refresh was in flight.
    #[error("session ended while refreshing")]
    SessionEnded,
}

/// Errors surfaced by session, client and relay operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The backend refused the login credentials.
    #[error("{message}")]
    CredentialsRejected { status: u16, message: String },

    /// The backend refused a registration.
    #[error("{message}")]
    RegistrationRejected { status: u16, message: String },

    #[error("Passwords do not match")]
    PasswordMismatch,

    /// The session could not be refreshed and has been logged out.
    #[error("session expired: {0}")]
    RefreshFailed(#[from] RefreshFailure),

    /// A request was still unauthorized after its single refresh-and-retry.
    #[error("unauthorized")]
    Unauthorized { body: String },

    /// The backend returned a non-success status other than 401.
    #[error("API response error: status {status}")]
    Api { status: u16, body: String },

    #[error("response parse failed: {0}")]
    Parse(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SessionError {
    /// Stable machine-readable code for this error.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::CredentialsRejected { .. } => "E_CREDENTIALS_REJECTED",
            Self::RegistrationRejected { .. } => "E_REGISTRATION_REJECTED",
            Self::PasswordMismatch => "E_PASSWORD_MISMATCH",
            Self::RefreshFailed(_) => "E_REFRESH_FAILED",
            Self::Unauthorized { .. } => "E_UNAUTHORIZED",
            Self::Api { .. } => "E_API_RESPONSE",
            Self::Parse(_) => "E_PARSE",
            Self::Config(_) => "E_CONFIG",
            Self::Transport(_) => "E_TRANSPORT",
            Self::Storage(_) => "E_STORAGE",
        }
    }

    /// Whether this error should be shown to the person using the client.
    #[must_use]
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            Self::CredentialsRejected { .. }
                | Self::RegistrationRejected { .. }
                | Self::PasswordMismatch
                | Self::RefreshFailed(_)
        )
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
