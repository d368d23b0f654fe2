use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::contract::model::Todo;

/// REST DTO for a todo
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TodoDto {
    pub id: i32,
    pub title: String,
    pub body: String,
}

impl From<Todo> for TodoDto {
    fn from(t: Todo) -> Self {
        Self {
            id: t.id,
            title: t.title,
            body: t.body,
        }
    }
}
