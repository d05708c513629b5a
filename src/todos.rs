use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::error::AppError;
use crate::form::TodoForm;
use crate::models::Todo;
use crate::session::SessionManager;

const NOT_SAVED: &str = "Todo has not been saved yet";

/// Keeps the in-memory task collection consistent with the backend.
///
/// The collection only changes once the backend has answered; a failed call leaves it
/// exactly as it was and writes a message into the error slot.
pub struct TodoList {
    api: ApiClient,
    session: Arc<SessionManager>,
    todos: Vec<Todo>,
    loading: watch::Sender<bool>,
    error: Option<String>,
}

impl TodoList {
    pub fn new(api: ApiClient, session: Arc<SessionManager>) -> Self {
        TodoList {
            api,
            session,
            todos: Vec::new(),
            loading: watch::Sender::new(true),
            error: None,
        }
    }

    pub fn todos(&self) -> &[Todo] {
        &self.todos
    }

    pub fn get(&self, id: &str) -> Option<&Todo> {
        self.todos.iter().find(|t| t.id.as_deref() == Some(id))
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Replaces the whole collection with the backend's.
    pub async fn load(&mut self) -> Result<(), AppError> {
        self.loading.send_replace(true);
        let result = self.api.list_todos(self.session.token().as_deref()).await;
        self.loading.send_replace(false);

        match result {
            Ok(todos) => {
                info!(count = todos.len(), "Loaded todos");
                self.todos = todos;
                self.error = None;
                Ok(())
            }
            Err(err) => Err(self.record("load todos", err)),
        }
    }

    /// Sends a draft; the stored record is inserted at the front once the backend
    /// returns it with an id.
    pub async fn create(&mut self, draft: Todo) -> Result<Todo, AppError> {
        match self.send_create(draft).await {
            Ok(todo) => Ok(self.admit(todo)),
            Err(err) => Err(self.record("create todo", err)),
        }
    }

    /// Sends a full replacement for the task `id`.
    pub async fn update(&mut self, id: Option<&str>, record: Todo) -> Result<Todo, AppError> {
        let Some(id) = id else {
            return Err(self.record("update todo", AppError::Validation(NOT_SAVED)));
        };

        match self.send_update(id, record).await {
            Ok(todo) => Ok(self.replace(id, todo)),
            Err(err) => Err(self.record("update todo", err)),
        }
    }

    pub async fn toggle_complete(&mut self, todo: &Todo) -> Result<Todo, AppError> {
        let toggled = Todo {
            completed: !todo.completed,
            ..todo.clone()
        };
        self.update(todo.id.as_deref(), toggled).await
    }

    pub async fn delete(&mut self, id: Option<&str>) -> Result<(), AppError> {
        let Some(id) = id else {
            return Err(self.record("delete todo", AppError::Validation(NOT_SAVED)));
        };

        match self.api.delete_todo(self.session.token().as_deref(), id).await {
            Ok(()) => {
                self.todos.retain(|t| t.id.as_deref() != Some(id));
                info!(id, "Deleted todo");
                Ok(())
            }
            Err(err) => Err(self.record("delete todo", err)),
        }
    }

    /// Deletes after `confirm` agrees. Returns `Ok(false)` when the user declined, in
    /// which case no request is made.
    pub async fn confirm_delete<F>(
        &mut self,
        id: Option<&str>,
        confirm: F,
    ) -> Result<bool, AppError>
    where
        F: FnOnce() -> bool,
    {
        if id.is_none() {
            return Err(self.record("delete todo", AppError::Validation(NOT_SAVED)));
        }
        if !confirm() {
            return Ok(false);
        }
        self.delete(id).await.map(|()| true)
    }

    /// Creates or updates from the form depending on whether it edits a saved task.
    /// Failures go to the form's own error slot.
    pub async fn submit(&mut self, form: &mut TodoForm) -> Result<Todo, AppError> {
        let record = match form.to_record() {
            Ok(record) => record,
            Err(err) => {
                form.error = Some(err.to_string());
                return Err(err);
            }
        };

        let (action, result) = match form.editing_id().map(str::to_string) {
            Some(id) => (
                "update todo",
                self.send_update(&id, record)
                    .await
                    .map(|todo| self.replace(&id, todo)),
            ),
            None => (
                "create todo",
                self.send_create(record).await.map(|todo| self.admit(todo)),
            ),
        };

        match result {
            Ok(todo) => {
                form.reset();
                Ok(todo)
            }
            Err(err) => {
                warn!(error = %err, "Failed to {action}");
                form.error = Some(failure_message(action, &err));
                Err(err)
            }
        }
    }

    async fn send_create(&self, mut draft: Todo) -> Result<Todo, AppError> {
        if draft.title.trim().is_empty() {
            return Err(AppError::Validation("Title is required"));
        }
        draft.id = None;

        let created = self
            .api
            .create_todo(self.session.token().as_deref(), &draft)
            .await?;
        require_id(created)
    }

    async fn send_update(&self, id: &str, record: Todo) -> Result<Todo, AppError> {
        if record.title.trim().is_empty() {
            return Err(AppError::Validation("Title is required"));
        }

        let updated = self
            .api
            .update_todo(self.session.token().as_deref(), id, &record)
            .await?;
        require_id(updated)
    }

    fn admit(&mut self, todo: Todo) -> Todo {
        info!(id = ?todo.id, title = %todo.title, "Created todo");
        self.todos.insert(0, todo.clone());
        todo
    }

    /// Swaps in the backend's record for the entry that was sent as `id`.
    fn replace(&mut self, id: &str, todo: Todo) -> Todo {
        info!(id, completed = todo.completed, "Updated todo");
        if let Some(slot) = self.todos.iter_mut().find(|t| t.id.as_deref() == Some(id)) {
            *slot = todo.clone();
        }
        todo
    }

    fn record(&mut self, action: &str, err: AppError) -> AppError {
        warn!(error = %err, "Failed to {action}");
        self.error = Some(failure_message(action, &err));
        err
    }
}

/// A record the backend hands back must carry an id before it can be displayed.
fn require_id(todo: Todo) -> Result<Todo, AppError> {
    if todo.id.as_deref().is_some_and(|id| !id.is_empty()) {
        Ok(todo)
    } else {
        Err(AppError::Server("response record has no id".to_string()))
    }
}

fn failure_message(action: &str, err: &AppError) -> String {
    if err.is_network() {
        format!("Failed to {action}")
    } else {
        err.to_string()
    }
}
