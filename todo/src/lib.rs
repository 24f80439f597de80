//! Reducer-driven to-do page synchronized with a remote task service.
//!
//! The todo list lives in a [`Store`](tidy_runtime::Store) driven by
//! [`TodoReducer`]. Remote calls go through the [`TodoService`] trait and come
//! back as actions, so every success and failure ends up in [`TodoState`].
//! [`TodoPage`] turns UI events into actions and derives what the page shows.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use tidy::navigation::{History, Route};
//! use tidy::page::TodoPage;
//! use tidy::service::InMemoryTodoService;
//!
//! # async fn example() -> Result<(), tidy::page::PageError> {
//! let service = Arc::new(InMemoryTodoService::new());
//! let history = History::starting_at(Route::Todos);
//! let mut page = TodoPage::new(service, Arc::new(history));
//!
//! page.mount().await?;
//! page.set_input("Buy milk");
//! page.on_create_key(tidy::page::Key::Enter).await?;
//!
//! assert_eq!(page.active_count().await, 1);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod navigation;
pub mod page;
pub mod reducer;
pub mod service;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use navigation::{History, Navigator, Route};
pub use page::{PageError, PageView, SignInPage, TodoPage};
pub use reducer::{TodoEnvironment, TodoReducer};
pub use service::{HttpTodoService, InMemoryTodoService, ServiceError, TodoService};
pub use types::{CorrelationId, Todo, TodoAction, TodoId, TodoState, TodoStatus, ViewFilter};
