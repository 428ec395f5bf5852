//! Client-side authentication and session management for the Gophora
//! marketplace.
//!
//! ARCHITECTURE
//! ============
//! - [`storage`] / [`credentials`]: persisted key/value data and the typed
//!   session view over it.
//! - [`session`]: the session state machine (login, logout, refresh).
//! - [`client`]: authenticated requests with refresh-on-401 and one retry.
//! - [`guard`]: route protection by authentication and role.
//! - [`relay`]: actions deferred across the login redirect.
//! - [`state`]: wires everything together at startup.

pub mod api;
pub mod backend;
pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod guard;
pub mod navigation;
pub mod relay;
pub mod session;
pub mod state;
pub mod storage;
pub mod transport;
pub mod types;

#[cfg(test)]
mod test_helpers;

pub use client::AuthClient;
pub use config::ClientConfig;
pub use error::SessionError;
pub use guard::{GuardDecision, RouteGuard};
pub use session::SessionContext;
pub use state::AppState;
pub use types::{AuthPhase, PendingAction, Role, Route, Session};
