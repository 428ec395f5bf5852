//! Navigation seam used for login redirects and post-login landing.

use std::sync::{Mutex, PoisonError};

use crate::types::Route;

/// Moves the visitor to another view.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Keeps the visited routes in order. Used by the CLI and tests.
#[derive(Debug, Default)]
pub struct HistoryNavigator {
    history: Mutex<Vec<Route>>,
}

impl HistoryNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> Option<Route> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .copied()
    }

    #[must_use]
    pub fn history(&self) -> Vec<Route> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Navigator for HistoryNavigator {
    fn navigate(&self, route: Route) {
        tracing::debug!(path = route.path(), "navigate");
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route);
    }
}

#[cfg(test)]
#[path = "navigation_test.rs"]
mod tests;
