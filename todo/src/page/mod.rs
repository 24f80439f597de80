//! Page controllers.
//!
//! Controllers translate UI events into store actions and derive what the UI
//! shows. They hold the transient UI state (filter, text fields) themselves;
//! the todo list lives only in the store.

use crate::reducer::{TodoEnvironment, TodoReducer};
use crate::service::ServiceError;
use crate::types::{TodoAction, TodoState};
use thiserror::Error;
use tidy_runtime::{Store, StoreError};

pub mod sign_in;
pub mod todo;

pub use sign_in::SignInPage;
pub use todo::{Key, PageView, TodoPage};

/// Store hosting the todo reducer
pub type TodoStore = Store<TodoState, TodoAction, TodoEnvironment, TodoReducer>;

/// Errors a page operation can return
///
/// Service failures during todo operations are recorded in page state rather
/// than returned; this type covers the store itself and the sign-in call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// The store rejected or timed out the operation
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The remote service failed
    #[error(transparent)]
    Service(#[from] ServiceError),
}
