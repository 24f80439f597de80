//! Controller for the to-do page.

use super::{PageError, TodoStore};
use crate::navigation::{Navigator, Route};
use crate::reducer::{TodoEnvironment, TodoReducer};
use crate::service::TodoService;
use crate::types::{CorrelationId, Todo, TodoAction, TodoId, TodoState, TodoStatus, ViewFilter};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tidy_runtime::StoreError;

/// Default bound on how long the page waits for the service
///
/// Longer than the HTTP client's default request timeout so the client's own
/// classified failure normally arrives first.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(12);

/// Key pressed in the new-todo input
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// Submit
    Enter,
    /// Cancel
    Escape,
    /// Any printable character
    Char(char),
}

/// Everything the page shows, derived from store state and UI state
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageView {
    /// Todos under the current filter, in list order
    pub todos: Vec<Todo>,
    /// Size of the whole list
    pub total: usize,
    /// Number of todos not yet completed
    pub active_count: usize,
    /// Whether the toggle-all checkbox is shown (list non-empty)
    pub show_toggle_all: bool,
    /// Whether the toggle-all checkbox is checked (nothing left to do)
    pub toggle_all_checked: bool,
    /// Selected filter tab
    pub filter: ViewFilter,
    /// Current text of the new-todo input
    pub input: String,
    /// Message for the most recent service failure
    pub error: Option<String>,
}

impl PageView {
    fn derive(state: &TodoState, filter: ViewFilter, input: &str) -> Self {
        let active_count = state.active_count();
        Self {
            todos: state.visible(filter),
            total: state.todos.len(),
            active_count,
            show_toggle_all: !state.todos.is_empty(),
            toggle_all_checked: active_count == 0,
            filter,
            input: input.to_string(),
            error: state.last_error.as_ref().map(ToString::to_string),
        }
    }
}

impl fmt::Display for PageView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "> {}", self.input)?;
        for (index, todo) in self.todos.iter().enumerate() {
            let mark = if todo.is_completed() { 'x' } else { ' ' };
            writeln!(f, "{:>3}. [{mark}] {}", index + 1, todo.content)?;
        }
        if self.show_toggle_all {
            let mark = if self.toggle_all_checked { 'x' } else { ' ' };
            write!(f, "[{mark}] all  ")?;
        }
        write!(
            f,
            "{} of {} left  |  showing: {}",
            self.active_count, self.total, self.filter
        )?;
        if let Some(error) = &self.error {
            write!(f, "\n! {error}")?;
        }
        Ok(())
    }
}

/// Controller for the to-do page
///
/// Owns the view filter and the new-todo input; every change to the list goes
/// through the store.
///
/// When the service does not answer within the request timeout the page
/// records [`ServiceError::Timeout`](crate::service::ServiceError::Timeout)
/// and carries on. A create that timed out stays pending: further Enter
/// presses are ignored until its answer arrives, and a late success clears
/// the input on the next interaction.
pub struct TodoPage {
    store: TodoStore,
    navigator: Arc<dyn Navigator>,
    filter: ViewFilter,
    input: String,
    mounted: bool,
    redirected: bool,
    awaiting_create: Option<CorrelationId>,
    request_timeout: Duration,
}

impl TodoPage {
    /// Create an unmounted page backed by `service`
    #[must_use]
    pub fn new(service: Arc<dyn TodoService>, navigator: Arc<dyn Navigator>) -> Self {
        let store = TodoStore::new(
            TodoState::default(),
            TodoReducer::new(),
            TodoEnvironment::new(service),
        );

        Self {
            store,
            navigator,
            filter: ViewFilter::All,
            input: String::new(),
            mounted: false,
            redirected: false,
            awaiting_create: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Bound how long each operation waits for the service
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// The store behind the page
    #[must_use]
    pub const fn store(&self) -> &TodoStore {
        &self.store
    }

    /// Load the list. Does nothing once a load has answered.
    ///
    /// A failed load leaves the list empty and shows the error. A load that
    /// timed out shows the timeout and may be retried by mounting again.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Store`] if the store is shutting down.
    #[tracing::instrument(skip(self))]
    pub async fn mount(&mut self) -> Result<(), PageError> {
        if self.mounted || self.store.state(|s| s.loaded).await {
            self.mounted = true;
            return Ok(());
        }
        self.filter = ViewFilter::All;

        let outcome = self
            .store
            .send_and_wait_for(
                TodoAction::LoadTodos,
                TodoAction::is_load_outcome,
                self.request_timeout,
            )
            .await;

        match outcome {
            Ok(outcome) => {
                self.mounted = true;
                self.follow_outcome(&outcome);
                Ok(())
            },
            Err(error) => self.recover(error).await,
        }
    }

    /// Mirror the new-todo input's value
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Current text of the new-todo input, as of the last page operation
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Handle a key press in the new-todo input
    ///
    /// Enter with non-blank input creates the todo and, once the service
    /// returned it, appends it and clears the input. A failed creation keeps
    /// the input so the user can retry; an authorization failure navigates to
    /// sign-in. Only one create runs at a time.
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Store`] if the store is shutting down.
    #[tracing::instrument(skip(self))]
    pub async fn on_create_key(&mut self, key: Key) -> Result<(), PageError> {
        if key != Key::Enter {
            return Ok(());
        }

        self.settle_create().await;
        if let Some(pending) = self.awaiting_create {
            tracing::debug!(%pending, "Previous create still in flight");
            return Ok(());
        }

        let content = self.input.trim().to_string();
        if content.is_empty() {
            return Ok(());
        }

        let correlation_id = CorrelationId::new();
        self.awaiting_create = Some(correlation_id);

        let outcome = self
            .store
            .send_and_wait_for(
                TodoAction::CreateTodo {
                    correlation_id,
                    content,
                },
                move |action| action.create_outcome_for() == Some(correlation_id),
                self.request_timeout,
            )
            .await;

        match outcome {
            Ok(outcome) => {
                self.awaiting_create = None;
                if matches!(outcome, TodoAction::AddTodo { .. }) {
                    self.input.clear();
                }
                self.follow_outcome(&outcome);
                Ok(())
            },
            Err(error) => self.recover(error).await,
        }
    }

    /// Handle the toggle-all checkbox
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Store`] on timeout or shutdown.
    pub async fn on_toggle_all(&mut self, checked: bool) -> Result<(), PageError> {
        self.dispatch(TodoAction::ToggleAllTodos { checked }).await
    }

    /// Handle the clear-all button
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Store`] on timeout or shutdown.
    pub async fn on_clear_all(&mut self) -> Result<(), PageError> {
        self.dispatch(TodoAction::DeleteAllTodos).await
    }

    /// Handle a row's checkbox
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Store`] on timeout or shutdown.
    pub async fn on_toggle_todo(&mut self, id: TodoId, checked: bool) -> Result<(), PageError> {
        self.dispatch(TodoAction::UpdateTodoStatus {
            id,
            status: TodoStatus::from_checked(checked),
        })
        .await
    }

    /// Handle an edited row
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Store`] on timeout or shutdown.
    pub async fn on_edit_todo(&mut self, id: TodoId, content: String) -> Result<(), PageError> {
        self.dispatch(TodoAction::UpdateTodoContent { id, content }).await
    }

    /// Handle a row's delete button
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Store`] on timeout or shutdown.
    pub async fn on_delete_todo(&mut self, id: TodoId) -> Result<(), PageError> {
        self.dispatch(TodoAction::DeleteTodo { id }).await
    }

    /// Dismiss the error message
    ///
    /// # Errors
    ///
    /// Returns [`PageError::Store`] if the store is shutting down.
    pub async fn dismiss_error(&mut self) -> Result<(), PageError> {
        self.store.send(TodoAction::DismissError).await?;
        Ok(())
    }

    /// Select a filter tab. Local to the page; nothing is dispatched.
    pub fn show(&mut self, filter: ViewFilter) {
        self.filter = filter;
    }

    /// Selected filter tab
    #[must_use]
    pub const fn filter(&self) -> ViewFilter {
        self.filter
    }

    /// Number of todos not yet completed
    pub async fn active_count(&self) -> usize {
        self.store.state(TodoState::active_count).await
    }

    /// Todos under the current filter
    pub async fn visible_todos(&self) -> Vec<Todo> {
        let filter = self.filter;
        self.store.state(|s| s.visible(filter)).await
    }

    /// Derive everything the page shows
    ///
    /// Picks up the answer to a create that timed out earlier.
    pub async fn render(&mut self) -> PageView {
        self.settle_create().await;
        self.store
            .state(|s| PageView::derive(s, self.filter, &self.input))
            .await
    }

    async fn dispatch(&mut self, action: TodoAction) -> Result<(), PageError> {
        self.settle_create().await;
        let mut handle = self.store.send(action).await?;
        if let Err(error) = handle.wait_with_timeout(self.request_timeout).await {
            self.recover(error).await?;
        }

        if self.store.state(|s| s.requires_sign_in).await {
            self.redirect_to_sign_in();
        }
        Ok(())
    }

    /// Record a wait that ran out; anything else is returned
    async fn recover(&mut self, error: StoreError) -> Result<(), PageError> {
        if error != StoreError::Timeout {
            return Err(error.into());
        }
        tracing::warn!(timeout = ?self.request_timeout, "Service did not answer in time");
        self.store.send(TodoAction::TimedOut).await?;
        Ok(())
    }

    /// Apply the answer to a create the page stopped waiting for
    async fn settle_create(&mut self) {
        let Some(correlation_id) = self.awaiting_create else {
            return;
        };
        let (pending, created, requires_sign_in) = self
            .store
            .state(|s| {
                (
                    s.pending_creates.contains(&correlation_id),
                    s.last_created == Some(correlation_id),
                    s.requires_sign_in,
                )
            })
            .await;
        if pending {
            return;
        }

        self.awaiting_create = None;
        if created {
            self.input.clear();
        } else if requires_sign_in {
            self.redirect_to_sign_in();
        }
    }

    fn follow_outcome(&mut self, outcome: &TodoAction) {
        if outcome.failure().is_some_and(|e| e.is_unauthorized()) {
            self.redirect_to_sign_in();
        }
    }

    fn redirect_to_sign_in(&mut self) {
        if !self.redirected {
            self.redirected = true;
            tracing::info!("Session rejected, returning to sign-in");
            self.navigator.push(Route::SignIn);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::History;
    use crate::service::{InMemoryTodoService, Operation, ServiceError};

    fn page(service: &InMemoryTodoService) -> (TodoPage, History) {
        let history = History::starting_at(Route::Todos);
        let page = TodoPage::new(Arc::new(service.clone()), Arc::new(history.clone()))
            .with_request_timeout(Duration::from_secs(2));
        (page, history)
    }

    fn seeded() -> InMemoryTodoService {
        InMemoryTodoService::new().with_todos(vec![
            Todo::new("1", "a"),
            Todo::new("2", "b").with_status(TodoStatus::Completed),
        ])
    }

    #[tokio::test]
    async fn mount_loads_once() {
        let service = seeded();
        let (mut page, _) = page(&service);

        page.mount().await.unwrap();
        page.mount().await.unwrap();

        assert_eq!(page.visible_todos().await, service.todos());
        assert_eq!(service.calls(), vec![Operation::GetTodos]);
    }

    #[tokio::test]
    async fn failed_load_is_visible() {
        let service = seeded();
        service.fail(Operation::GetTodos, ServiceError::Transport("offline".into()));
        let (mut page, history) = page(&service);

        page.mount().await.unwrap();

        let view = page.render().await;
        assert!(view.todos.is_empty());
        assert_eq!(view.error.as_deref(), Some("Request failed: offline"));
        assert_eq!(history.current(), Some(Route::Todos));
    }

    #[tokio::test]
    async fn enter_creates_and_clears_input() {
        let service = InMemoryTodoService::new();
        let (mut page, _) = page(&service);
        page.mount().await.unwrap();

        page.set_input("  buy milk ");
        page.on_create_key(Key::Char('k')).await.unwrap();
        assert_eq!(service.calls(), vec![Operation::GetTodos]);

        page.on_create_key(Key::Enter).await.unwrap();

        let todos = page.visible_todos().await;
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].content, "buy milk");
        assert_eq!(page.input(), "");
    }

    #[tokio::test]
    async fn blank_input_makes_no_call() {
        let service = InMemoryTodoService::new();
        let (mut page, _) = page(&service);

        page.set_input("   ");
        page.on_create_key(Key::Enter).await.unwrap();

        assert!(service.calls().is_empty());
        assert_eq!(page.store().state(|s| s.revision).await, 0);
    }

    #[tokio::test]
    async fn unauthorized_create_redirects_to_sign_in() {
        let service = InMemoryTodoService::new();
        service.fail(Operation::CreateTodo, ServiceError::Unauthorized);
        let (mut page, history) = page(&service);

        page.set_input("x");
        page.on_create_key(Key::Enter).await.unwrap();

        assert_eq!(history.current(), Some(Route::SignIn));
        assert_eq!(page.input(), "x");
    }

    #[tokio::test]
    async fn other_create_failure_keeps_input_and_shows_error() {
        let service = InMemoryTodoService::new();
        service.fail(
            Operation::CreateTodo,
            ServiceError::Api {
                status: 500,
                message: "down".into(),
            },
        );
        let (mut page, history) = page(&service);

        page.set_input("x");
        page.on_create_key(Key::Enter).await.unwrap();

        let view = page.render().await;
        assert!(view.todos.is_empty());
        assert_eq!(view.input, "x");
        assert_eq!(view.error.as_deref(), Some("API error (status 500): down"));
        assert_eq!(history.current(), Some(Route::Todos));
    }

    #[tokio::test]
    async fn filter_is_local() {
        let service = seeded();
        let (mut page, _) = page(&service);
        page.mount().await.unwrap();

        page.show(ViewFilter::Active);
        let active = page.visible_todos().await;
        assert_eq!(active, vec![Todo::new("1", "a")]);

        page.show(ViewFilter::Completed);
        assert_eq!(page.visible_todos().await.len(), 1);
        assert_eq!(page.store().state(|s| s.revision).await, 1);
    }

    #[tokio::test]
    async fn toggle_all_checkbox_tracks_active_count() {
        let service = seeded();
        let (mut page, _) = page(&service);
        page.mount().await.unwrap();

        let view = page.render().await;
        assert!(view.show_toggle_all);
        assert!(!view.toggle_all_checked);
        assert_eq!(view.active_count, 1);

        page.on_toggle_all(true).await.unwrap();

        let view = page.render().await;
        assert!(view.toggle_all_checked);
        assert_eq!(page.active_count().await, 0);
        assert!(service.todos().iter().all(Todo::is_completed));
    }

    #[tokio::test]
    async fn clear_all_empties_page_and_service() {
        let service = seeded();
        let (mut page, _) = page(&service);
        page.mount().await.unwrap();

        page.on_clear_all().await.unwrap();

        let view = page.render().await;
        assert!(view.todos.is_empty());
        assert!(!view.show_toggle_all);
        assert!(view.toggle_all_checked);
        assert!(service.todos().is_empty());
    }

    #[tokio::test]
    async fn expired_session_during_sync_redirects_once() {
        let service = seeded();
        let (mut page, history) = page(&service);
        page.mount().await.unwrap();

        service.fail(Operation::DeleteTodo, ServiceError::Unauthorized);
        page.on_delete_todo(TodoId::new("1")).await.unwrap();
        page.on_delete_todo(TodoId::new("2")).await.unwrap();

        assert_eq!(history.entries(), vec![Route::Todos, Route::SignIn]);
    }

    fn slow_page(service: &InMemoryTodoService) -> (TodoPage, History) {
        let history = History::starting_at(Route::Todos);
        let page = TodoPage::new(Arc::new(service.clone()), Arc::new(history.clone()))
            .with_request_timeout(Duration::from_millis(100));
        (page, history)
    }

    #[tokio::test]
    async fn slow_create_shows_timeout_and_is_not_duplicated() {
        let service = InMemoryTodoService::new();
        service.delay(Operation::CreateTodo, Duration::from_millis(300));
        let (mut page, history) = slow_page(&service);

        page.set_input("x");
        page.on_create_key(Key::Enter).await.unwrap();

        let view = page.render().await;
        assert!(view.todos.is_empty());
        assert_eq!(view.input, "x");
        assert_eq!(view.error.as_deref(), Some("Request timed out"));

        // Still in flight, so pressing Enter again sends nothing
        page.on_create_key(Key::Enter).await.unwrap();
        assert_eq!(service.calls(), vec![Operation::CreateTodo]);

        tokio::time::sleep(Duration::from_millis(400)).await;

        let view = page.render().await;
        assert_eq!(view.todos.len(), 1);
        assert_eq!(view.input, "");
        assert_eq!(view.error, None);

        page.on_create_key(Key::Enter).await.unwrap();
        assert_eq!(service.todos().len(), 1);
        assert_eq!(history.current(), Some(Route::Todos));
    }

    #[tokio::test]
    async fn late_create_failure_keeps_input_for_retry() {
        let service = InMemoryTodoService::new();
        service.fail(
            Operation::CreateTodo,
            ServiceError::Api {
                status: 500,
                message: "down".into(),
            },
        );
        service.delay(Operation::CreateTodo, Duration::from_millis(300));
        let (mut page, _) = slow_page(&service);

        page.set_input("x");
        page.on_create_key(Key::Enter).await.unwrap();
        tokio::time::sleep(Duration::from_millis(400)).await;

        let view = page.render().await;
        assert!(view.todos.is_empty());
        assert_eq!(view.input, "x");
        assert_eq!(view.error.as_deref(), Some("API error (status 500): down"));

        service.clear_failures();
        service.clear_delays();
        page.on_create_key(Key::Enter).await.unwrap();

        assert_eq!(page.visible_todos().await.len(), 1);
        assert_eq!(page.input(), "");
    }

    #[tokio::test]
    async fn timed_out_mount_can_be_retried() {
        let service = seeded();
        service.delay(Operation::GetTodos, Duration::from_millis(300));
        let (mut page, _) = slow_page(&service);

        page.mount().await.unwrap();
        assert_eq!(
            page.render().await.error.as_deref(),
            Some("Request timed out")
        );

        service.clear_delays();
        page.mount().await.unwrap();
        assert_eq!(page.visible_todos().await, service.todos());
        assert_eq!(service.calls(), vec![Operation::GetTodos, Operation::GetTodos]);

        // The first answer is older than the second and is dropped
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(page.store().state(|s| s.revision).await, 1);

        page.mount().await.unwrap();
        assert_eq!(service.calls().len(), 2);
    }

    #[tokio::test]
    async fn slow_sync_is_recorded_and_page_keeps_working() {
        let service = seeded();
        let (mut page, _) = slow_page(&service);
        page.mount().await.unwrap();

        service.delay(Operation::DeleteTodo, Duration::from_millis(300));
        page.on_delete_todo(TodoId::new("1")).await.unwrap();

        let view = page.render().await;
        assert_eq!(view.todos.len(), 1);
        assert_eq!(view.error.as_deref(), Some("Request timed out"));

        page.on_toggle_all(true).await.unwrap();
        assert_eq!(page.active_count().await, 0);
    }

    #[test]
    fn view_renders_rows_and_footer() {
        let state = TodoState::with_todos(vec![
            Todo::new("1", "a"),
            Todo::new("2", "b").with_status(TodoStatus::Completed),
        ]);
        let view = PageView::derive(&state, ViewFilter::All, "new");

        assert_eq!(
            view.to_string(),
            "> new\n  1. [ ] a\n  2. [x] b\n[ ] all  1 of 2 left  |  showing: All"
        );
    }
}
