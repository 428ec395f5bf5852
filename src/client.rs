//! Authenticated request client.
//!
//! Every backend call that needs the visitor's identity goes through
//! [`AuthClient::send`]. The bearer token is read from the session context at
//! dispatch time, so a request queued before a refresh still picks up the new
//! token.
//!
//! RETRY
//! =====
//! A request is dispatched at most twice: the initial attempt and, after a 401
//! and a successful refresh, one retry with the refreshed token. A 401 on the
//! retry is returned as [`SessionError::Unauthorized`].

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::SessionError;
use crate::session::SessionContext;
use crate::transport::{ApiRequest, ApiResponse};

#[derive(Debug, Clone, Copy)]
enum Attempt {
    Initial,
    Retry,
}

impl Attempt {
    fn as_str(self) -> &'static str {
        match self {
            Self::Initial => "initial",
            Self::Retry => "retry",
        }
    }
}

#[derive(Clone)]
pub struct AuthClient {
    context: Arc<SessionContext>,
}

impl AuthClient {
    #[must_use]
    pub fn new(context: Arc<SessionContext>) -> Self {
        Self { context }
    }

    #[must_use]
    pub fn context(&self) -> &Arc<SessionContext> {
        &self.context
    }

    /// Send `request` with the current access token, refreshing once on 401.
    ///
    /// # Errors
    ///
    /// [`SessionError::RefreshFailed`] if the refresh failed (the session is
    /// logged out), [`SessionError::Unauthorized`] if the retry was also
    /// rejected, or a transport error. Other statuses are returned as responses.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, SessionError> {
        let token = self.context.access_token();
        let response = self.dispatch(&request, token.as_deref(), Attempt::Initial).await?;
        if !response.is_unauthorized() {
            return Ok(response);
        }

        let refreshed = self.context.refresh_after(token.as_deref()).await?;
        let response = self.dispatch(&request, Some(&refreshed), Attempt::Retry).await?;
        if response.is_unauthorized() {
            tracing::warn!(request_id = %request.id, path = %request.path, "unauthorized after refresh");
            return Err(SessionError::Unauthorized { body: response.body });
        }
        Ok(response)
    }

    /// [`Self::send`], then decode a 2xx body as `T`.
    ///
    /// # Errors
    ///
    /// Everything [`Self::send`] returns, plus [`SessionError::Api`] for
    /// non-2xx statuses and [`SessionError::Parse`] for undecodable bodies.
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, SessionError> {
        self.send(request).await?.json()
    }

    async fn dispatch(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
        attempt: Attempt,
    ) -> Result<ApiResponse, SessionError> {
        let transport = self.context.backend().transport();
        match transport.send(request, token).await {
            Ok(response) => {
                tracing::debug!(
                    request_id = %request.id,
                    attempt = attempt.as_str(),
                    status = response.status,
                    "authenticated call"
                );
                Ok(response)
            }
            Err(e) => {
                tracing::warn!(request_id = %request.id, attempt = attempt.as_str(), error = %e, "request failed");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
