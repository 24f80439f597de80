//! JSON-over-HTTP implementation of [`TodoService`].
//!
//! Routes:
//!
//! | operation      | request                                  | response          |
//! |----------------|------------------------------------------|-------------------|
//! | `sign_in`      | `POST /auth/sign-in {username,password}` | `{data: token}`   |
//! | `get_todos`    | `GET /tasks`                             | `{data: [Todo]}`  |
//! | `create_todo`  | `POST /tasks {content}`                  | `{data: Todo}`    |
//! | `delete_todo`  | `DELETE /tasks/{id}`                     | empty             |
//! | `delete_all`   | `DELETE /tasks`                          | empty             |
//! | `update_todos` | `PUT /tasks {todos}`                     | empty             |
//!
//! Every call after `sign_in` carries `Authorization: Bearer <token>`.

use super::{ServiceError, ServiceFuture, TodoService};
use crate::types::{Todo, TodoId};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// Response envelope used by every route that returns a body
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Debug, Serialize)]
struct SignInRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct CreateTodoRequest<'a> {
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateTodosRequest {
    todos: Vec<Todo>,
}

/// HTTP client for the remote task service
#[derive(Clone, Debug)]
pub struct HttpTodoService {
    client: Client,
    base_url: String,
    token: Arc<RwLock<Option<String>>>,
}

impl HttpTodoService {
    /// Create a client for the service at `base_url`
    ///
    /// `timeout` bounds each request; there is no retry.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Transport` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ServiceError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// Use an existing session token
    #[must_use]
    pub fn with_token(self, token: impl Into<String>) -> Self {
        self.set_token(Some(token.into()));
        self
    }

    /// Current session token, if signed in
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_token(&self, token: Option<String>) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = token;
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Timeouts are reported as such; every other client error goes through `otherwise`.
    fn classify(error: &reqwest::Error, otherwise: fn(String) -> ServiceError) -> ServiceError {
        if error.is_timeout() {
            ServiceError::Timeout
        } else {
            otherwise(error.to_string())
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ServiceError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| Self::classify(&e, ServiceError::Transport))?;

        match response.status() {
            status if status.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED => Err(ServiceError::Unauthorized),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(ServiceError::Api {
                    status: status.as_u16(),
                    message: body,
                })
            },
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ServiceError> {
        let response = self.send(request).await?;
        response
            .json::<Envelope<T>>()
            .await
            .map(|envelope| envelope.data)
            .map_err(|e| Self::classify(&e, ServiceError::Decode))
    }
}

impl TodoService for HttpTodoService {
    fn sign_in(&self, username: &str, password: &str) -> ServiceFuture<'_, String> {
        let request = self
            .client
            .post(self.url("/auth/sign-in"))
            .json(&SignInRequest { username, password });

        Box::pin(async move {
            let token: String = self.fetch(request).await?;
            self.set_token(Some(token.clone()));
            tracing::debug!("Signed in");
            Ok(token)
        })
    }

    fn get_todos(&self) -> ServiceFuture<'_, Vec<Todo>> {
        let request = self.client.get(self.url("/tasks"));
        Box::pin(async move { self.fetch(request).await })
    }

    fn create_todo(&self, content: &str) -> ServiceFuture<'_, Todo> {
        let request = self
            .client
            .post(self.url("/tasks"))
            .json(&CreateTodoRequest { content });
        Box::pin(async move { self.fetch(request).await })
    }

    fn delete_todo(&self, id: &TodoId) -> ServiceFuture<'_, ()> {
        let request = self.client.delete(self.url(&format!("/tasks/{id}")));
        Box::pin(async move { self.send(request).await.map(drop) })
    }

    fn delete_all(&self) -> ServiceFuture<'_, ()> {
        let request = self.client.delete(self.url("/tasks"));
        Box::pin(async move { self.send(request).await.map(drop) })
    }

    fn update_todos(&self, todos: Vec<Todo>) -> ServiceFuture<'_, ()> {
        let request = self
            .client
            .put(self.url("/tasks"))
            .json(&UpdateTodosRequest { todos });
        Box::pin(async move { self.send(request).await.map(drop) })
    }
}
