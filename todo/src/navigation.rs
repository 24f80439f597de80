//! Navigation boundary between the sign-in route and the to-do page.

use std::sync::{Arc, Mutex, PoisonError};

/// Routes the application can show
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    /// Sign-in form
    SignIn,
    /// The to-do page
    Todos,
}

impl Route {
    /// URL path of the route
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::SignIn => "/",
            Self::Todos => "/todo",
        }
    }
}

/// Requests a route change
pub trait Navigator: Send + Sync {
    /// Push `route` onto the navigation history
    fn push(&self, route: Route);
}

/// Navigation history kept in memory
///
/// Clones share the same history.
#[derive(Clone, Debug, Default)]
pub struct History {
    entries: Arc<Mutex<Vec<Route>>>,
}

impl History {
    /// History positioned at `route`
    #[must_use]
    pub fn starting_at(route: Route) -> Self {
        let history = Self::default();
        history.push(route);
        history
    }

    /// The route on top of the history
    #[must_use]
    pub fn current(&self) -> Option<Route> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .copied()
    }

    /// Every route pushed so far, oldest first
    #[must_use]
    pub fn entries(&self) -> Vec<Route> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Navigator for History {
    fn push(&self, route: Route) {
        tracing::debug!(path = route.path(), "Navigating");
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(route);
    }
}
