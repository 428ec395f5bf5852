//! Route guard for protected views.
//!
//! A visitor who is sent to login loses the destination they asked for; after
//! login they land on their role's dashboard.

use serde::Serialize;

use crate::session::SessionContext;
use crate::types::{AuthPhase, Role, Route};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "to", rename_all = "snake_case")]
pub enum GuardDecision {
    /// Session state is not known yet; show a loading indicator.
    Loading,
    Redirect(Route),
    Render,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteGuard {
    pub required_role: Option<Role>,
}

impl RouteGuard {
    /// Guard that admits any authenticated visitor.
    #[must_use]
    pub fn authenticated() -> Self {
        Self { required_role: None }
    }

    #[must_use]
    pub fn for_role(role: Role) -> Self {
        Self { required_role: Some(role) }
    }

    #[must_use]
    pub fn evaluate(&self, phase: &AuthPhase) -> GuardDecision {
        match phase {
            AuthPhase::Initializing => GuardDecision::Loading,
            AuthPhase::Anonymous => GuardDecision::Redirect(Route::Login),
            AuthPhase::Authenticated(session) => match self.required_role {
                Some(required) if required != session.role => GuardDecision::Redirect(session.role.home()),
                _ => GuardDecision::Render,
            },
        }
    }

    /// Evaluate against the context's current phase and carry out any redirect.
    pub fn enforce(&self, context: &SessionContext) -> GuardDecision {
        let decision = self.evaluate(&context.phase());
        if let GuardDecision::Redirect(route) = decision {
            tracing::debug!(to = route.path(), required = ?self.required_role, "guard redirect");
            context.navigator().navigate(route);
        }
        decision
    }
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
