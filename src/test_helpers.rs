//! Shared test fixtures: a scripted transport and a pre-wired context.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::Method;
use serde_json::json;

use crate::backend::Backend;
use crate::credentials::CredentialStore;
use crate::error::TransportError;
use crate::navigation::HistoryNavigator;
use crate::session::SessionContext;
use crate::storage::MemoryStorage;
use crate::transport::{ApiRequest, ApiResponse, Transport};
use crate::types::{Role, Session};

type Handler = dyn Fn(&ApiRequest, Option<&str>) -> Result<ApiResponse, TransportError> + Send + Sync;

/// A request as the mock saw it.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub bearer: Option<String>,
    pub request: ApiRequest,
}

/// Transport answering from a closure and recording every call.
pub struct MockTransport {
    handler: Box<Handler>,
    latency: Option<Duration>,
    path_latency: Vec<(String, Duration)>,
    calls: Mutex<Vec<Recorded>>,
}

impl MockTransport {
    pub fn new(
        handler: impl Fn(&ApiRequest, Option<&str>) -> Result<ApiResponse, TransportError> + Send + Sync + 'static,
    ) -> Self {
        Self { handler: Box::new(handler), latency: None, path_latency: Vec::new(), calls: Mutex::new(Vec::new()) }
    }

    /// Delay every response so concurrent callers interleave.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Delay responses for one path only, overriding `with_latency`.
    pub fn with_path_latency(mut self, path: &str, latency: Duration) -> Self {
        self.path_latency.push((path.to_owned(), latency));
        self
    }

    pub fn calls(&self) -> Vec<Recorded> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<Recorded> {
        self.calls().into_iter().filter(|c| c.path == path).collect()
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: &ApiRequest, bearer: Option<&str>) -> Result<ApiResponse, TransportError> {
        self.calls.lock().unwrap().push(Recorded {
            method: request.method.clone(),
            path: request.path.clone(),
            query: request.query.clone(),
            bearer: bearer.map(str::to_owned),
            request: request.clone(),
        });
        let latency = self
            .path_latency
            .iter()
            .find(|(path, _)| *path == request.path)
            .map(|(_, latency)| *latency)
            .or(self.latency);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        (self.handler)(request, bearer)
    }
}

pub fn ok_json(value: serde_json::Value) -> Result<ApiResponse, TransportError> {
    Ok(ApiResponse::new(200, value.to_string()))
}

pub fn status(code: u16, value: serde_json::Value) -> Result<ApiResponse, TransportError> {
    Ok(ApiResponse::new(code, value.to_string()))
}

pub fn login_body(access: &str, refresh: &str) -> serde_json::Value {
    json!({
        "access_token": access,
        "refresh_token": refresh,
        "token_type": "bearer",
        "user_id": "u-1",
        "email": "ada@example.com",
    })
}

pub fn session(role: Role, access: &str, refresh: &str) -> Session {
    Session {
        user_id: "u-1".into(),
        email: "ada@example.com".into(),
        role,
        access_token: access.into(),
        refresh_token: refresh.into(),
    }
}

/// Everything a test needs to drive a context end to end.
pub struct Harness {
    pub storage: Arc<MemoryStorage>,
    pub store: CredentialStore,
    pub transport: Arc<MockTransport>,
    pub navigator: Arc<HistoryNavigator>,
    pub context: Arc<SessionContext>,
}

impl Harness {
    /// Build an initialized context, optionally with a persisted session.
    pub fn new(transport: MockTransport, persisted: Option<Session>) -> Self {
        let storage = Arc::new(MemoryStorage::new());
        let store = CredentialStore::new(storage.clone());
        if let Some(session) = &persisted {
            store.write(session).unwrap();
        }
        let transport = Arc::new(transport);
        let navigator = Arc::new(HistoryNavigator::new());
        let context = Arc::new(SessionContext::new(
            store.clone(),
            Backend::new(transport.clone()),
            navigator.clone(),
        ));
        context.initialize();
        Self { storage, store, transport, navigator, context }
    }
}
