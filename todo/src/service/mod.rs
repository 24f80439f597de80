//! Remote service contract.
//!
//! The page reaches its backing store only through [`TodoService`]. Two
//! implementations ship with the crate: [`HttpTodoService`] talks JSON over
//! HTTP, [`InMemoryTodoService`] keeps everything in process for tests and the
//! offline CLI mode.

use crate::types::{Todo, TodoId};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

pub mod http;
pub mod memory;

pub use http::HttpTodoService;
pub use memory::{InMemoryTodoService, Operation};

/// Boxed future returned by every [`TodoService`] operation.
pub type ServiceFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ServiceError>> + Send + 'a>>;

/// Errors reported by the remote service
///
/// Only [`ServiceError::Unauthorized`] changes control flow (the page sends
/// the user back to sign-in); every other variant is shown as an error message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// Session token missing, invalid or expired (HTTP 401)
    #[error("Unauthorized - please sign in again")]
    Unauthorized,

    /// The request never produced a response
    #[error("Request failed: {0}")]
    Transport(String),

    /// No answer arrived within the request timeout
    ///
    /// The request may still have been applied by the service.
    #[error("Request timed out")]
    Timeout,

    /// Service answered with a non-success status
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error body returned by the service
        message: String,
    },

    /// Response body did not match the expected shape
    #[error("Response parsing failed: {0}")]
    Decode(String),

    /// Input rejected before or by the service
    #[error("Invalid input: {0}")]
    Validation(String),
}

impl ServiceError {
    /// Whether the caller should send the user back to sign-in
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Remote task service.
///
/// # Dyn Compatibility
///
/// Operations return [`ServiceFuture`] instead of using `async fn` so the
/// service can live behind `Arc<dyn TodoService>` and be captured by effects.
pub trait TodoService: Send + Sync {
    /// Exchange credentials for a session token.
    ///
    /// # Errors
    ///
    /// - `Unauthorized`: credentials rejected
    /// - `Transport`/`Api`/`Decode`: the call itself failed
    fn sign_in(&self, username: &str, password: &str) -> ServiceFuture<'_, String>;

    /// Fetch the current list, in display order.
    ///
    /// # Errors
    ///
    /// `Unauthorized` when the session is invalid, otherwise transport or API
    /// failures.
    fn get_todos(&self) -> ServiceFuture<'_, Vec<Todo>>;

    /// Persist a new todo and return it with its server-assigned id.
    ///
    /// # Errors
    ///
    /// `Unauthorized` when the session is invalid, otherwise transport or API
    /// failures.
    fn create_todo(&self, content: &str) -> ServiceFuture<'_, Todo>;

    /// Remove one todo.
    ///
    /// # Errors
    ///
    /// `Unauthorized` when the session is invalid, `Api` with status 404 for an
    /// unknown id, otherwise transport failures.
    fn delete_todo(&self, id: &TodoId) -> ServiceFuture<'_, ()>;

    /// Remove every todo.
    ///
    /// # Errors
    ///
    /// `Unauthorized` when the session is invalid, otherwise transport or API
    /// failures.
    fn delete_all(&self) -> ServiceFuture<'_, ()>;

    /// Persist a batch of status/content changes.
    ///
    /// # Errors
    ///
    /// `Unauthorized` when the session is invalid, otherwise transport or API
    /// failures.
    fn update_todos(&self, todos: Vec<Todo>) -> ServiceFuture<'_, ()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_unauthorized_redirects() {
        assert!(ServiceError::Unauthorized.is_unauthorized());
        assert!(!ServiceError::Transport("reset".into()).is_unauthorized());
        assert!(!ServiceError::Timeout.is_unauthorized());
        assert!(
            !ServiceError::Api {
                status: 403,
                message: String::new()
            }
            .is_unauthorized()
        );
    }

    #[test]
    fn api_error_message() {
        let error = ServiceError::Api {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(error.to_string(), "API error (status 500): boom");
    }
}
