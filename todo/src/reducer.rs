//! Reducer logic for the to-do page.
//!
//! Transitions on the list are applied immediately; anything that must reach
//! the remote service is returned as an [`Effect`] whose result comes back as
//! another action (`TodosFetched`, `AddTodo`, `SyncCompleted`, or a `*Failed`
//! variant). An answer may arrive after the page stopped waiting for it; load
//! answers are checked against `revision`, create answers carry their
//! [`CorrelationId`].

use crate::service::{ServiceError, TodoService};
use crate::types::{CorrelationId, Todo, TodoAction, TodoId, TodoState, TodoStatus};
use std::sync::Arc;
use tidy_core::{Effects, SmallVec, effect::Effect, reducer::Reducer, smallvec};

/// Environment dependencies for the todo reducer
#[derive(Clone)]
pub struct TodoEnvironment {
    /// Remote task service
    pub service: Arc<dyn TodoService>,
}

impl TodoEnvironment {
    /// Creates a new `TodoEnvironment`
    #[must_use]
    pub fn new(service: Arc<dyn TodoService>) -> Self {
        Self { service }
    }
}

/// Reducer for the to-do page
#[derive(Clone, Debug, Default)]
pub struct TodoReducer;

impl TodoReducer {
    /// Creates a new `TodoReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn touch(state: &mut TodoState) {
        state.revision += 1;
    }

    fn record_failure(state: &mut TodoState, error: ServiceError) {
        tracing::warn!(%error, "Remote service call failed");
        if error.is_unauthorized() {
            state.requires_sign_in = true;
        }
        state.last_error = Some(error);
    }

    fn replace(state: &mut TodoState, todos: Vec<Todo>) {
        tracing::debug!(count = todos.len(), "Todos loaded");
        state.todos = todos;
        state.loaded = true;
        state.last_error = None;
        Self::touch(state);
    }

    fn settle_create(state: &mut TodoState, correlation_id: CorrelationId) {
        state.pending_creates.retain(|pending| *pending != correlation_id);
    }

    fn find_mut<'a>(state: &'a mut TodoState, id: &TodoId) -> Option<&'a mut Todo> {
        state.todos.iter_mut().find(|t| &t.id == id)
    }

    /// Effect that persists `todos` and reports the outcome
    fn sync(env: &TodoEnvironment, todos: Vec<Todo>) -> Effect<TodoAction> {
        let service = Arc::clone(&env.service);
        Effect::future(async move {
            Some(match service.update_todos(todos).await {
                Ok(()) => TodoAction::SyncCompleted,
                Err(error) => TodoAction::SyncFailed { error },
            })
        })
    }

    fn load(env: &TodoEnvironment, started_at: u64) -> Effect<TodoAction> {
        let service = Arc::clone(&env.service);
        Effect::future(async move {
            Some(match service.get_todos().await {
                Ok(todos) => TodoAction::TodosFetched { started_at, todos },
                Err(error) => TodoAction::LoadFailed { error },
            })
        })
    }

    fn create(env: &TodoEnvironment, correlation_id: CorrelationId, content: String) -> Effect<TodoAction> {
        let service = Arc::clone(&env.service);
        Effect::future(async move {
            Some(match service.create_todo(&content).await {
                Ok(todo) => TodoAction::AddTodo {
                    correlation_id: Some(correlation_id),
                    todo,
                },
                Err(error) => TodoAction::CreateFailed {
                    correlation_id,
                    error,
                },
            })
        })
    }
}

impl Reducer for TodoReducer {
    type State = TodoState;
    type Action = TodoAction;
    type Environment = TodoEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects<Self::Action> {
        match action {
            // ========== Loading ==========
            TodoAction::LoadTodos => smallvec![Self::load(env, state.revision)],

            TodoAction::SetTodos { todos } => {
                Self::replace(state, todos);
                SmallVec::new()
            },

            TodoAction::TodosFetched { started_at, todos } => {
                if started_at == state.revision {
                    Self::replace(state, todos);
                } else {
                    tracing::debug!(
                        started_at,
                        revision = state.revision,
                        "Dropping load answer older than local changes"
                    );
                }
                SmallVec::new()
            },

            TodoAction::LoadFailed { error } | TodoAction::SyncFailed { error } => {
                Self::record_failure(state, error);
                SmallVec::new()
            },

            TodoAction::TimedOut => {
                Self::record_failure(state, ServiceError::Timeout);
                SmallVec::new()
            },

            // ========== Creation ==========
            TodoAction::CreateTodo {
                correlation_id,
                content,
            } => {
                let content = content.trim();
                if content.is_empty() {
                    return SmallVec::new();
                }
                state.pending_creates.push(correlation_id);
                smallvec![Self::create(env, correlation_id, content.to_string())]
            },

            TodoAction::CreateFailed {
                correlation_id,
                error,
            } => {
                Self::settle_create(state, correlation_id);
                Self::record_failure(state, error);
                SmallVec::new()
            },

            TodoAction::AddTodo {
                correlation_id,
                todo,
            } => {
                if let Some(correlation_id) = correlation_id {
                    Self::settle_create(state, correlation_id);
                    state.last_created = Some(correlation_id);
                }
                tracing::debug!(id = %todo.id, "Todo added");
                state.todos.push(todo);
                state.last_error = None;
                Self::touch(state);
                SmallVec::new()
            },

            // ========== Bulk operations ==========
            TodoAction::ToggleAllTodos { checked } => {
                let status = TodoStatus::from_checked(checked);
                for todo in &mut state.todos {
                    todo.status = status;
                }
                Self::touch(state);

                if state.todos.is_empty() {
                    return SmallVec::new();
                }
                smallvec![Self::sync(env, state.todos.clone())]
            },

            TodoAction::DeleteAllTodos => {
                state.todos.clear();
                Self::touch(state);

                let service = Arc::clone(&env.service);
                smallvec![Effect::future(async move {
                    Some(match service.delete_all().await {
                        Ok(()) => TodoAction::SyncCompleted,
                        Err(error) => TodoAction::SyncFailed { error },
                    })
                })]
            },

            // ========== Row operations ==========
            TodoAction::UpdateTodoStatus { id, status } => {
                let Some(todo) = Self::find_mut(state, &id) else {
                    return SmallVec::new();
                };
                todo.status = status;
                let changed = todo.clone();
                Self::touch(state);
                smallvec![Self::sync(env, vec![changed])]
            },

            TodoAction::UpdateTodoContent { id, content } => {
                let content = content.trim();
                if content.is_empty() {
                    return SmallVec::new();
                }
                let Some(todo) = Self::find_mut(state, &id) else {
                    return SmallVec::new();
                };
                content.clone_into(&mut todo.content);
                let changed = todo.clone();
                Self::touch(state);
                smallvec![Self::sync(env, vec![changed])]
            },

            TodoAction::DeleteTodo { id } => {
                let before = state.todos.len();
                state.todos.retain(|t| t.id != id);
                if state.todos.len() == before {
                    return SmallVec::new();
                }
                Self::touch(state);

                let service = Arc::clone(&env.service);
                smallvec![Effect::future(async move {
                    Some(match service.delete_todo(&id).await {
                        Ok(()) => TodoAction::SyncCompleted,
                        Err(error) => TodoAction::SyncFailed { error },
                    })
                })]
            },

            // ========== Outcomes ==========
            TodoAction::SyncCompleted | TodoAction::DismissError => {
                state.last_error = None;
                SmallVec::new()
            },
        }
    }
}
