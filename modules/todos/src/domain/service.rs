use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::contract::model::{NewTodo, Todo};
use crate::domain::error::DomainError;
use crate::domain::repo::TodosRepository;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub max_title_length: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            max_title_length: 200,
        }
    }
}

/// Domain service for todos. Depends only on the repository port.
#[derive(Clone)]
pub struct Service {
    repo: Arc<dyn TodosRepository>,
    config: ServiceConfig,
}

impl Service {
    pub fn new(repo: Arc<dyn TodosRepository>, config: ServiceConfig) -> Self {
        Self { repo, config }
    }

    #[instrument(name = "todos.service.create_todo", skip(self, new_todo), fields(title = %new_todo.title))]
    pub async fn create_todo(&self, new_todo: NewTodo) -> Result<Todo, DomainError> {
        self.validate_title(&new_todo.title)?;

        let todo = self
            .repo
            .insert(new_todo)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        info!(id = todo.id, "Created todo");
        Ok(todo)
    }

    #[instrument(name = "todos.service.get_todo", skip(self))]
    pub async fn get_todo(&self, id: i32) -> Result<Todo, DomainError> {
        debug!("Getting todo by id");
        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| DomainError::database(e.to_string()))?
            .ok_or_else(|| DomainError::todo_not_found(id))
    }

    #[instrument(name = "todos.service.list_todos", skip(self))]
    pub async fn list_todos(&self) -> Result<Vec<Todo>, DomainError> {
        let todos = self
            .repo
            .list()
            .await
            .map_err(|e| DomainError::database(e.to_string()))?;
        debug!(count = todos.len(), "Listed todos");
        Ok(todos)
    }

    fn validate_title(&self, title: &str) -> Result<(), DomainError> {
        if title.trim().is_empty() {
            return Err(DomainError::validation(
                "title",
                "This field may not be blank.",
            ));
        }
        let max = self.config.max_title_length;
        if title.chars().count() > max {
            return Err(DomainError::validation(
                "title",
                format!("Ensure this field has no more than {max} characters."),
            ));
        }
        Ok(())
    }
}
