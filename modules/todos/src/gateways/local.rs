use std::sync::Arc;

use async_trait::async_trait;

use crate::contract::{
    client::TodosApi,
    error::TodosError,
    model::{NewTodo, Todo},
};
use crate::domain::service::Service;

/// [`TodosApi`] backed directly by the domain service.
pub struct TodosLocalClient {
    service: Arc<Service>,
}

impl TodosLocalClient {
    pub fn new(service: Arc<Service>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl TodosApi for TodosLocalClient {
    async fn create_todo(&self, new_todo: NewTodo) -> Result<Todo, TodosError> {
        self.service.create_todo(new_todo).await.map_err(Into::into)
    }

    async fn get_todo(&self, id: i32) -> Result<Todo, TodosError> {
        self.service.get_todo(id).await.map_err(Into::into)
    }

    async fn list_todos(&self) -> Result<Vec<Todo>, TodosError> {
        self.service.list_todos().await.map_err(Into::into)
    }
}
