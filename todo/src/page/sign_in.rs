//! Controller for the sign-in route.

use super::PageError;
use crate::navigation::{Navigator, Route};
use crate::service::{ServiceError, TodoService};
use std::sync::Arc;

/// Sign-in form
pub struct SignInPage {
    service: Arc<dyn TodoService>,
    navigator: Arc<dyn Navigator>,
    /// Username field
    pub username: String,
    /// Password field
    pub password: String,
    error: Option<String>,
}

impl SignInPage {
    /// Create an empty form
    #[must_use]
    pub fn new(service: Arc<dyn TodoService>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            service,
            navigator,
            username: String::new(),
            password: String::new(),
            error: None,
        }
    }

    /// Message for the last failed attempt
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Submit the form
    ///
    /// Blank fields are rejected without calling the service. On success the
    /// page navigates to the to-do route and returns the session token.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Service`] with `Validation` for blank fields, or the
    /// service failure. The message is also kept for [`error`](Self::error).
    #[tracing::instrument(skip(self), fields(username = %self.username))]
    pub async fn submit(&mut self) -> Result<String, PageError> {
        let username = self.username.trim();
        if username.is_empty() || self.password.is_empty() {
            let error = ServiceError::Validation("username and password are required".into());
            self.error = Some(error.to_string());
            return Err(error.into());
        }

        match self.service.sign_in(username, &self.password).await {
            Ok(token) => {
                self.error = None;
                tracing::info!("Signed in");
                self.navigator.push(Route::Todos);
                Ok(token)
            },
            Err(error) => {
                tracing::warn!(%error, "Sign-in failed");
                self.error = Some(match &error {
                    ServiceError::Unauthorized => "incorrect username or password".to_string(),
                    other => other.to_string(),
                });
                Err(error.into())
            },
        }
    }
}
