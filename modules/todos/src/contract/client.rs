use async_trait::async_trait;

use crate::contract::{
    error::TodosError,
    model::{NewTodo, Todo},
};

/// In-process API other modules use to read and write todos.
#[async_trait]
pub trait TodosApi: Send + Sync {
    async fn create_todo(&self, new_todo: NewTodo) -> Result<Todo, TodosError>;

    async fn get_todo(&self, id: i32) -> Result<Todo, TodosError>;

    async fn list_todos(&self) -> Result<Vec<Todo>, TodosError>;
}
