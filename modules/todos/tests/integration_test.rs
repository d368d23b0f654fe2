//! Each test runs on a fresh in-memory SQLite database with migrations
//! applied; the REST layer is driven through the real route registration.

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use modkit_db::DbHandle;
use sea_orm_migration::MigratorTrait;
use tower::ServiceExt;

use todos::{
    api::rest::dto::TodoDto,
    contract::{client::TodosApi, error::TodosError, model::NewTodo},
    domain::service::{Service, ServiceConfig},
    gateways::local::TodosLocalClient,
    infra::storage::{migrations::Migrator, sea_orm_repo::SeaOrmTodosRepository},
};

async fn create_test_service() -> Arc<Service> {
    let db = DbHandle::connect("sqlite::memory:", Default::default())
        .await
        .expect("Failed to connect to test database");
    Migrator::up(db.seaorm(), None)
        .await
        .expect("Failed to run migrations");
    let repo = SeaOrmTodosRepository::new(db.sea());
    Arc::new(Service::new(Arc::new(repo), ServiceConfig::default()))
}

struct MockOpenApiRegistry;

impl modkit::api::OpenApiRegistry for MockOpenApiRegistry {
    fn register_operation(&self, _spec: &modkit::api::OperationSpec) {}

    fn ensure_schema_raw(
        &self,
        root_name: &str,
        _schemas: Vec<(
            String,
            utoipa::openapi::RefOr<utoipa::openapi::schema::Schema>,
        )>,
    ) -> String {
        root_name.to_string()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

fn router_for(service: Arc<Service>) -> Router {
    todos::api::rest::routes::register_routes(Router::new(), &MockOpenApiRegistry, service)
        .expect("Failed to register routes")
}

fn first_todo() -> NewTodo {
    NewTodo {
        title: "first todo".to_string(),
        body: "a body here".to_string(),
    }
}

async fn get(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let resp = router
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn first_todo_gets_id_one_and_keeps_its_content() -> Result<()> {
    let service = create_test_service().await;
    service.create_todo(first_todo()).await?;

    let todo = service.get_todo(1).await?;
    assert_eq!(todo.title, "first todo");
    assert_eq!(todo.body, "a body here");
    Ok(())
}

#[tokio::test]
async fn list_is_ordered_by_id() -> Result<()> {
    let service = create_test_service().await;
    for title in ["b", "a", "c"] {
        service
            .create_todo(NewTodo {
                title: title.into(),
                body: String::new(),
            })
            .await?;
    }

    let ids: Vec<i32> = service.list_todos().await?.iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    Ok(())
}

#[tokio::test]
async fn rest_detail_and_list() -> Result<()> {
    let service = create_test_service().await;
    service.create_todo(first_todo()).await?;
    let router = router_for(service);

    let (status, json) = get(router.clone(), "/api/todos/1/").await;
    assert_eq!(status, StatusCode::OK);
    let dto: TodoDto = serde_json::from_value(json)?;
    assert_eq!(dto.id, 1);
    assert_eq!(dto.title, "first todo");
    assert_eq!(dto.body, "a body here");

    let (status, json) = get(router, "/api/todos/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json.as_array().map(Vec::len), Some(1));
    Ok(())
}

#[tokio::test]
async fn unknown_or_non_integer_pk_is_not_found() -> Result<()> {
    let router = router_for(create_test_service().await);

    let (status, problem) = get(router.clone(), "/api/todos/42/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(problem["code"], "TODOS_NOT_FOUND");

    let (status, _) = get(router, "/api/todos/abc/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn local_client_maps_errors_to_contract() -> Result<()> {
    let client = TodosLocalClient::new(create_test_service().await);

    let err = client.get_todo(9).await.unwrap_err();
    assert_eq!(err, TodosError::NotFound { id: 9 });

    let err = client
        .create_todo(NewTodo {
            title: "  ".into(),
            body: String::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, TodosError::Validation { .. }));

    let created = client.create_todo(first_todo()).await?;
    assert_eq!(client.list_todos().await?, vec![created]);
    Ok(())
}
