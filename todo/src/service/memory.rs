//! In-memory [`TodoService`] for tests and offline use.

use super::{ServiceError, ServiceFuture, TodoService};
use crate::types::{Todo, TodoId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use uuid::Uuid;

/// Service operations, used to script failures and inspect calls
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// `sign_in`
    SignIn,
    /// `get_todos`
    GetTodos,
    /// `create_todo`
    CreateTodo,
    /// `delete_todo`
    DeleteTodo,
    /// `delete_all`
    DeleteAll,
    /// `update_todos`
    UpdateTodos,
}

#[derive(Debug, Default)]
struct Inner {
    todos: Vec<Todo>,
    credentials: Option<(String, String)>,
    token: Option<String>,
    failures: HashMap<Operation, ServiceError>,
    delays: HashMap<Operation, Duration>,
    calls: Vec<Operation>,
}

impl Inner {
    /// Records the call and applies scripted failures and session checks.
    fn begin(&mut self, operation: Operation) -> Result<(), ServiceError> {
        self.calls.push(operation);

        if let Some(error) = self.failures.get(&operation) {
            return Err(error.clone());
        }

        if operation != Operation::SignIn && self.credentials.is_some() && self.token.is_none() {
            return Err(ServiceError::Unauthorized);
        }

        Ok(())
    }

    fn position(&self, id: &TodoId) -> Result<usize, ServiceError> {
        self.todos
            .iter()
            .position(|t| &t.id == id)
            .ok_or_else(|| ServiceError::Api {
                status: 404,
                message: format!("todo {id} not found"),
            })
    }
}

/// In-memory task service
///
/// Without credentials every call succeeds. With
/// [`with_credentials`](Self::with_credentials) every operation except
/// `sign_in` fails with `Unauthorized` until a matching sign-in happened.
///
/// # Example
///
/// ```
/// use tidy::service::{InMemoryTodoService, TodoService};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = InMemoryTodoService::new();
/// let todo = service.create_todo("buy milk").await?;
/// assert_eq!(service.get_todos().await?, vec![todo]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryTodoService {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryTodoService {
    /// Create an empty service that accepts every call
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the stored list
    #[must_use]
    pub fn with_todos(self, todos: Vec<Todo>) -> Self {
        self.lock().todos = todos;
        self
    }

    /// Require a sign-in with this username and password
    #[must_use]
    pub fn with_credentials(self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.lock().credentials = Some((username.into(), password.into()));
        self
    }

    /// Make every call to `operation` fail with `error`
    pub fn fail(&self, operation: Operation, error: ServiceError) {
        self.lock().failures.insert(operation, error);
    }

    /// Remove all scripted failures
    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    /// Hold every answer to `operation` back for `delay`
    ///
    /// The call takes effect immediately; only the answer is late.
    pub fn delay(&self, operation: Operation, delay: Duration) {
        self.lock().delays.insert(operation, delay);
    }

    /// Remove all scripted delays
    pub fn clear_delays(&self) {
        self.lock().delays.clear();
    }

    /// Drop the current session so later calls are unauthorized
    pub fn expire_session(&self) {
        self.lock().token = None;
    }

    /// Snapshot of the stored list
    #[must_use]
    pub fn todos(&self) -> Vec<Todo> {
        self.lock().todos.clone()
    }

    /// Every operation invoked so far, in call order
    #[must_use]
    pub fn calls(&self) -> Vec<Operation> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn run<T, F>(&self, operation: Operation, f: F) -> ServiceFuture<'_, T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Inner) -> Result<T, ServiceError>,
    {
        let (result, delay) = {
            let mut inner = self.lock();
            let result = inner.begin(operation).and_then(|()| f(&mut inner));
            (result, inner.delays.get(&operation).copied())
        };
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            result
        })
    }
}

impl TodoService for InMemoryTodoService {
    fn sign_in(&self, username: &str, password: &str) -> ServiceFuture<'_, String> {
        self.run(Operation::SignIn, |inner| {
            if let Some((expected_user, expected_password)) = &inner.credentials {
                if expected_user != username || expected_password != password {
                    return Err(ServiceError::Unauthorized);
                }
            }
            let token = Uuid::new_v4().to_string();
            inner.token = Some(token.clone());
            Ok(token)
        })
    }

    fn get_todos(&self) -> ServiceFuture<'_, Vec<Todo>> {
        self.run(Operation::GetTodos, |inner| Ok(inner.todos.clone()))
    }

    fn create_todo(&self, content: &str) -> ServiceFuture<'_, Todo> {
        self.run(Operation::CreateTodo, |inner| {
            let content = content.trim();
            if content.is_empty() {
                return Err(ServiceError::Validation("content must not be blank".into()));
            }
            let todo = Todo::new(Uuid::new_v4().to_string(), content);
            inner.todos.push(todo.clone());
            Ok(todo)
        })
    }

    fn delete_todo(&self, id: &TodoId) -> ServiceFuture<'_, ()> {
        self.run(Operation::DeleteTodo, |inner| {
            let index = inner.position(id)?;
            inner.todos.remove(index);
            Ok(())
        })
    }

    fn delete_all(&self) -> ServiceFuture<'_, ()> {
        self.run(Operation::DeleteAll, |inner| {
            inner.todos.clear();
            Ok(())
        })
    }

    fn update_todos(&self, todos: Vec<Todo>) -> ServiceFuture<'_, ()> {
        self.run(Operation::UpdateTodos, |inner| {
            for todo in todos {
                let index = inner.position(&todo.id)?;
                inner.todos[index] = todo;
            }
            Ok(())
        })
    }
}
