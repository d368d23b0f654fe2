use async_trait::async_trait;

use crate::contract::model::{NewTodo, Todo};

/// Persistence the todos service needs.
#[async_trait]
pub trait TodosRepository: Send + Sync {
    async fn find_by_id(&self, id: i32) -> anyhow::Result<Option<Todo>>;
    /// Insert and return the stored row with its assigned id.
    async fn insert(&self, new_todo: NewTodo) -> anyhow::Result<Todo>;
    /// All todos ordered by id.
    async fn list(&self) -> anyhow::Result<Vec<Todo>>;
}
