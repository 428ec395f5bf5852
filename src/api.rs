//! Typed helpers for the authenticated REST endpoints the session layer uses.

use serde::{Deserialize, Serialize};

use crate::client::AuthClient;
use crate::error::SessionError;
use crate::transport::ApiRequest;

/// `GET /auth/me` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub experience: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_login: Option<String>,
}

/// `GET /user/profile`. The profile shape is owned by the backend.
///
/// # Errors
///
/// See [`AuthClient::send_json`].
pub async fn fetch_profile(client: &AuthClient) -> Result<serde_json::Value, SessionError> {
    client.send_json(ApiRequest::get("/user/profile")).await
}

/// # Errors
///
/// See [`AuthClient::send_json`].
pub async fn fetch_current_user(client: &AuthClient) -> Result<CurrentUser, SessionError> {
    client.send_json(ApiRequest::get("/auth/me")).await
}

/// `POST /api/applications/apply?opportunity_id=<id>`.
///
/// Any 2xx counts as submitted. The reply is returned as JSON when it parses
/// and as `Value::Null` otherwise.
///
/// # Errors
///
/// See [`AuthClient::send`]; non-2xx statuses are [`SessionError::Api`].
pub async fn apply_to_opportunity(client: &AuthClient, opportunity_id: &str) -> Result<serde_json::Value, SessionError> {
    let request = ApiRequest::post("/api/applications/apply").query("opportunity_id", opportunity_id);
    let response = client.send(request).await?;
    if !response.is_success() {
        return Err(SessionError::Api { status: response.status, body: response.body });
    }
    Ok(serde_json::from_str(&response.body).unwrap_or(serde_json::Value::Null))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
