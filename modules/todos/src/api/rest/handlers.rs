use std::sync::Arc;

use axum::{extract::Path, http::Uri, Extension, Json};
use modkit::api::problem::ProblemResponse;
use tracing::{error, info};

use crate::api::rest::dto::TodoDto;
use crate::api::rest::error::{map_domain_error, not_found_pk};
use crate::domain::service::Service;

pub async fn list_todos(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
) -> Result<Json<Vec<TodoDto>>, ProblemResponse> {
    info!("Listing todos");

    match svc.list_todos().await {
        Ok(todos) => Ok(Json(todos.into_iter().map(TodoDto::from).collect())),
        Err(e) => {
            error!("Failed to list todos: {}", e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}

pub async fn get_todo(
    Extension(svc): Extension<Arc<Service>>,
    Path(pk): Path<String>,
    uri: Uri,
) -> Result<Json<TodoDto>, ProblemResponse> {
    info!("Getting todo {}", pk);
    let Ok(id) = pk.parse::<i32>() else {
        return Err(not_found_pk(&pk, uri.path()));
    };

    match svc.get_todo(id).await {
        Ok(todo) => Ok(Json(TodoDto::from(todo))),
        Err(e) => {
            error!("Failed to get todo {}: {}", id, e);
            Err(map_domain_error(&e, uri.path()))
        }
    }
}
