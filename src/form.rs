use crate::error::AppError;
use crate::models::Todo;

/// State of the create/edit task form.
#[derive(Debug, Clone, Default)]
pub struct TodoForm {
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub error: Option<String>,
    editing: Option<Todo>,
}

impl TodoForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens the form pre-filled with an existing task.
    pub fn edit(todo: &Todo) -> Self {
        TodoForm {
            title: todo.title.clone(),
            description: todo.description.clone().unwrap_or_default(),
            completed: todo.completed,
            error: None,
            editing: Some(todo.clone()),
        }
    }

    /// Id of the task being edited. `None` means the form creates a new task.
    pub fn editing_id(&self) -> Option<&str> {
        self.editing.as_ref()?.id.as_deref()
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id().is_some()
    }

    pub fn heading(&self) -> &'static str {
        if self.is_editing() {
            "Edit Todo"
        } else {
            "Add New Todo"
        }
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_editing() {
            "Update Todo"
        } else {
            "Add Todo"
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.title.trim().is_empty()
    }

    /// Builds the record to send. When editing, backend-owned fields of the original
    /// task are carried over so the update is a full replacement.
    pub fn to_record(&self) -> Result<Todo, AppError> {
        if !self.is_valid() {
            return Err(AppError::Validation("Title is required"));
        }

        let mut record = self.editing.clone().unwrap_or_default();
        record.title = self.title.trim().to_string();
        record.description = Some(self.description.trim())
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        record.completed = self.completed;
        Ok(record)
    }

    pub fn reset(&mut self) {
        *self = TodoForm::new();
    }
}
