//! Auth endpoints of the Gophora backend.
//!
//! Thin wrappers over [`Transport`] for `/auth/*`. Parsing lives in pure
//! functions so status/body handling can be tested without a server.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{RefreshFailure, SessionError};
use crate::transport::{ApiRequest, ApiResponse, Transport};

const LOGIN_FALLBACK_MESSAGE: &str = "Login failed";
const REGISTER_FALLBACK_MESSAGE: &str = "Registration failed. Please try again.";
const DEFAULT_EXPERIENCE: &str = "Entry Level";

// =============================================================================
// WIRE TYPES
// =============================================================================

/// Successful `POST /auth/login` body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: String,
    pub email: String,
}

/// Successful `POST /auth/refresh` body. `refresh_token` is set when rotated.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

/// Sign-up form as entered by the visitor.
#[derive(Debug, Clone, Default)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub full_name: Option<String>,
    pub skills: Vec<String>,
}

#[derive(Serialize)]
struct RegisterRequest<'a> {
    email: &'a str,
    password: &'a str,
    full_name: Option<&'a str>,
    skills: &'a [String],
    interests: &'a [String],
    experience: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisteredUser {
    pub user_id: String,
    pub email: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

// =============================================================================
// BACKEND
// =============================================================================

#[derive(Clone)]
pub struct Backend {
    transport: Arc<dyn Transport>,
}

impl Backend {
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    #[must_use]
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// `POST /auth/login` with form-encoded `username`/`password`.
    ///
    /// # Errors
    ///
    /// [`SessionError::CredentialsRejected`] for non-2xx responses,
    /// [`SessionError::Transport`] if no response arrived.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, SessionError> {
        let request = ApiRequest::post("/auth/login").form(&[("username", email), ("password", password)]);
        let response = self.transport.send(&request, None).await?;
        parse_login_response(&response)
    }

    /// `POST /auth/refresh` with JSON `{ refresh_token }`.
    ///
    /// # Errors
    ///
    /// Every failure is a terminal [`RefreshFailure`].
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, RefreshFailure> {
        let request = ApiRequest::post("/auth/refresh").json(serde_json::json!({ "refresh_token": refresh_token }));
        let response = self
            .transport
            .send(&request, None)
            .await
            .map_err(|e| RefreshFailure::Transport(e.to_string()))?;
        parse_refresh_response(&response)
    }

    /// `POST /auth/logout`, bearer-authenticated, JSON `{ refresh_token }`.
    ///
    /// # Errors
    ///
    /// Returns an error for transport failures or non-2xx statuses; callers
    /// treat this as best-effort.
    pub async fn logout(&self, access_token: &str, refresh_token: &str) -> Result<(), SessionError> {
        let request = ApiRequest::post("/auth/logout").json(serde_json::json!({ "refresh_token": refresh_token }));
        let response = self.transport.send(&request, Some(access_token)).await?;
        if response.is_success() {
            Ok(())
        } else {
            Err(SessionError::Api { status: response.status, body: response.body })
        }
    }

    /// `GET /user/profile` with an explicit token, bypassing refresh handling.
    ///
    /// # Errors
    ///
    /// Returns an error for transport failures, non-2xx statuses or non-JSON bodies.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<serde_json::Value, SessionError> {
        let response = self
            .transport
            .send(&ApiRequest::get("/user/profile"), Some(access_token))
            .await?;
        response.json()
    }

    /// `POST /auth/register`.
    ///
    /// # Errors
    ///
    /// [`SessionError::RegistrationRejected`] for non-2xx responses.
    pub async fn register(&self, registration: &Registration) -> Result<RegisteredUser, SessionError> {
        let body = RegisterRequest {
            email: &registration.email,
            password: &registration.password,
            full_name: registration.full_name.as_deref(),
            skills: &registration.skills,
            interests: &[],
            experience: DEFAULT_EXPERIENCE,
        };
        let body = serde_json::to_value(&body).map_err(|e| SessionError::Parse(e.to_string()))?;
        let response = self
            .transport
            .send(&ApiRequest::post("/auth/register").json(body), None)
            .await?;
        parse_register_response(&response)
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_login_response(response: &ApiResponse) -> Result<LoginResponse, SessionError> {
    if !response.is_success() {
        return Err(SessionError::CredentialsRejected {
            status: response.status,
            message: error_detail(&response.body).unwrap_or_else(|| LOGIN_FALLBACK_MESSAGE.to_owned()),
        });
    }
    serde_json::from_str(&response.body).map_err(|e| SessionError::Parse(e.to_string()))
}

fn parse_refresh_response(response: &ApiResponse) -> Result<RefreshResponse, RefreshFailure> {
    if !response.is_success() {
        return Err(RefreshFailure::Rejected { status: response.status });
    }
    let parsed: RefreshResponse =
        serde_json::from_str(&response.body).map_err(|e| RefreshFailure::Malformed(e.to_string()))?;
    if parsed.access_token.is_empty() {
        return Err(RefreshFailure::Malformed("empty access_token".into()));
    }
    Ok(parsed)
}

fn parse_register_response(response: &ApiResponse) -> Result<RegisteredUser, SessionError> {
    if !response.is_success() {
        return Err(SessionError::RegistrationRejected {
            status: response.status,
            message: error_detail(&response.body).unwrap_or_else(|| REGISTER_FALLBACK_MESSAGE.to_owned()),
        });
    }
    serde_json::from_str(&response.body).map_err(|e| SessionError::Parse(e.to_string()))
}

/// Extract `detail` from an error body. Validation errors carry a structured
/// detail, which is returned as its JSON text.
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        serde_json::Value::String(_) => None,
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;
