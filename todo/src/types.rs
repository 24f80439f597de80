//! Domain types for the to-do page.
//!
//! A todo list is an ordered sequence of records whose identifiers are handed
//! out by the remote service. The page shows a filtered projection of it.

use crate::service::ServiceError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Server-assigned identifier for a todo
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoId(String);

impl TodoId {
    /// Wraps an identifier received from the service
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TodoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TodoId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Ties a create request to its outcome
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Create a new random correlation ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Completion status of a todo
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TodoStatus {
    /// Still to be done
    Active,
    /// Done
    Completed,
}

impl TodoStatus {
    /// Maps a checkbox value to a status
    #[must_use]
    pub const fn from_checked(checked: bool) -> Self {
        if checked { Self::Completed } else { Self::Active }
    }
}

/// A single todo record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier, stable for the lifetime of the record
    pub id: TodoId,
    /// Text entered by the user
    pub content: String,
    /// Completion status
    pub status: TodoStatus,
}

impl Todo {
    /// Creates an active todo
    #[must_use]
    pub fn new(id: impl Into<TodoId>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            status: TodoStatus::Active,
        }
    }

    /// Returns the same todo with the given status
    #[must_use]
    pub fn with_status(mut self, status: TodoStatus) -> Self {
        self.status = status;
        self
    }

    /// Whether the todo has been completed
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == TodoStatus::Completed
    }
}

impl From<String> for TodoId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Display subset selected by the filter tabs
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewFilter {
    /// Every todo
    #[default]
    All,
    /// Only todos still to be done
    Active,
    /// Only completed todos
    Completed,
}

impl ViewFilter {
    /// Whether `todo` belongs in this view
    #[must_use]
    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            Self::All => true,
            Self::Active => todo.status == TodoStatus::Active,
            Self::Completed => todo.status == TodoStatus::Completed,
        }
    }
}

impl fmt::Display for ViewFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::All => "All",
            Self::Active => "Active",
            Self::Completed => "Completed",
        })
    }
}

impl FromStr for ViewFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "active" => Ok(Self::Active),
            "completed" | "done" => Ok(Self::Completed),
            other => Err(format!("unknown filter '{other}' (expected all, active or completed)")),
        }
    }
}

/// State owned by the todo store
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TodoState {
    /// Todos in display order
    pub todos: Vec<Todo>,
    /// Most recent failure reported by the remote service
    pub last_error: Option<ServiceError>,
    /// Set once any call failed with an authorization error
    pub requires_sign_in: bool,
    /// Bumped on every change to `todos`
    pub revision: u64,
    /// Set once a list has been loaded or set
    pub loaded: bool,
    /// Create requests the service has not answered yet
    pub pending_creates: Vec<CorrelationId>,
    /// Most recent create request the service answered with a todo
    pub last_created: Option<CorrelationId>,
}

impl TodoState {
    /// Creates a state holding `todos`
    #[must_use]
    pub fn with_todos(todos: Vec<Todo>) -> Self {
        Self {
            todos,
            ..Self::default()
        }
    }

    /// Number of todos not yet completed
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.todos.iter().filter(|t| !t.is_completed()).count()
    }

    /// Number of completed todos
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|t| t.is_completed()).count()
    }

    /// Todos shown under `filter`, in list order
    #[must_use]
    pub fn visible(&self, filter: ViewFilter) -> Vec<Todo> {
        self.todos
            .iter()
            .filter(|t| filter.matches(t))
            .cloned()
            .collect()
    }

    /// Returns a todo by ID
    #[must_use]
    pub fn get(&self, id: &TodoId) -> Option<&Todo> {
        self.todos.iter().find(|t| &t.id == id)
    }
}

/// Inputs to the todo reducer
///
/// User intents (`LoadTodos`, `CreateTodo`, the toggles and deletes) and the
/// results the remote service feeds back (`TodosFetched`, `AddTodo`, the
/// `*Failed` variants, `SyncCompleted`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TodoAction {
    /// Fetch the list from the service
    LoadTodos,

    /// Replace the list wholesale
    SetTodos {
        /// The fetched list
        todos: Vec<Todo>,
    },

    /// The service answered a `LoadTodos`
    ///
    /// Applied like `SetTodos` unless the list changed locally after the load
    /// was sent, in which case the answer is stale and dropped.
    TodosFetched {
        /// `revision` when the load was sent
        started_at: u64,
        /// The fetched list
        todos: Vec<Todo>,
    },

    /// Fetching the list failed
    LoadFailed {
        /// Classified failure
        error: ServiceError,
    },

    /// Persist a new todo through the service
    CreateTodo {
        /// Identifies the outcome of this request
        correlation_id: CorrelationId,
        /// Text of the new todo
        content: String,
    },

    /// Append a todo the service created to the current list
    AddTodo {
        /// Request that created it; `None` when dispatched directly
        correlation_id: Option<CorrelationId>,
        /// Record returned by the service
        todo: Todo,
    },

    /// Creating a todo failed
    CreateFailed {
        /// Request that failed
        correlation_id: CorrelationId,
        /// Classified failure
        error: ServiceError,
    },

    /// Mark every todo completed (`checked`) or active
    ToggleAllTodos {
        /// Checkbox value
        checked: bool,
    },

    /// Remove every todo
    DeleteAllTodos,

    /// Set the status of one todo
    UpdateTodoStatus {
        /// Todo to update
        id: TodoId,
        /// New status
        status: TodoStatus,
    },

    /// Replace the text of one todo
    UpdateTodoContent {
        /// Todo to update
        id: TodoId,
        /// New text
        content: String,
    },

    /// Remove one todo
    DeleteTodo {
        /// Todo to remove
        id: TodoId,
    },

    /// The service accepted a change
    SyncCompleted,

    /// The service rejected a change; local state is kept
    SyncFailed {
        /// Classified failure
        error: ServiceError,
    },

    /// The page stopped waiting for the service
    ///
    /// Only records the failure; the late answer is still applied when it
    /// arrives.
    TimedOut,

    /// Clear the recorded failure
    DismissError,
}

impl TodoAction {
    /// Terminal result of `LoadTodos`
    #[must_use]
    pub const fn is_load_outcome(&self) -> bool {
        matches!(self, Self::TodosFetched { .. } | Self::LoadFailed { .. })
    }

    /// The create request this action answers, if it is a create outcome
    #[must_use]
    pub const fn create_outcome_for(&self) -> Option<CorrelationId> {
        match self {
            Self::AddTodo {
                correlation_id: Some(id),
                ..
            }
            | Self::CreateFailed {
                correlation_id: id, ..
            } => Some(*id),
            _ => None,
        }
    }

    /// The failure carried by this action, if any
    #[must_use]
    pub const fn failure(&self) -> Option<&ServiceError> {
        match self {
            Self::LoadFailed { error }
            | Self::CreateFailed { error, .. }
            | Self::SyncFailed { error } => Some(error),
            _ => None,
        }
    }
}
