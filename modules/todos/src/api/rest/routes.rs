use std::sync::Arc;

use axum::{Extension, Router};
use modkit::api::{Missing, OpenApiRegistry, OperationBuilder};

use crate::api::rest::{dto, handlers};
use crate::domain::service::Service;

pub fn register_routes(
    mut router: Router,
    openapi: &dyn OpenApiRegistry,
    service: Arc<Service>,
) -> anyhow::Result<Router> {
    router = OperationBuilder::<Missing, Missing, ()>::get("/api/todos/")
        .operation_id("todos.list_todos")
        .summary("List todos")
        .tag("todos")
        .handler(handlers::list_todos)
        .json_list_response::<dto::TodoDto>(openapi, 200, "All todos ordered by id")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::get("/api/todos/{pk}/")
        .operation_id("todos.get_todo")
        .summary("Get todo by id")
        .tag("todos")
        .path_param("pk", "Todo id")
        .handler(handlers::get_todo)
        .json_response_with_schema::<dto::TodoDto>(openapi, 200, "Todo found")
        .problem_response(openapi, 404, "Not Found")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    Ok(router.layer(Extension(service)))
}
