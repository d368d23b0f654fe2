//! The ingress hosting a REST module through the registry's rest phase.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Path},
    http::{Request, StatusCode},
    Json, Router,
};
use modkit::api::{Missing, OperationBuilder};
use modkit::{Module, ModuleCtx, ModuleCtxBuilder, OpenApiRegistry, RegistryBuilder, RestfulModule};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use utoipa::ToSchema;

#[derive(Serialize, Deserialize, ToSchema)]
struct Note {
    id: i32,
    text: String,
}

#[derive(Deserialize, ToSchema)]
struct NewNote {
    text: String,
}

struct NotesModule;

#[async_trait]
impl Module for NotesModule {
    async fn init(&self, _ctx: &ModuleCtx) -> Result<()> {
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

async fn get_note(Path(id): Path<i32>) -> Json<Note> {
    Json(Note {
        id,
        text: "hello".into(),
    })
}

async fn create_note(
    body: Result<Json<NewNote>, JsonRejection>,
) -> Result<(StatusCode, Json<Note>), modkit::ProblemResponse> {
    let Json(new) = body.map_err(|r| modkit::json_rejection(r, "/notes"))?;
    Ok((StatusCode::CREATED, Json(Note { id: 7, text: new.text })))
}

impl RestfulModule for NotesModule {
    fn register_rest(
        &self,
        _ctx: &ModuleCtx,
        router: Router,
        openapi: &dyn OpenApiRegistry,
    ) -> Result<Router> {
        let router = OperationBuilder::<Missing, Missing, ()>::get("/notes/{id}")
            .operation_id("notes.get")
            .path_param("id", "Note id")
            .handler(get_note)
            .json_response_with_schema::<Note>(openapi, 200, "Note")
            .register(router, openapi);

        let router = OperationBuilder::<Missing, Missing, ()>::post("/notes")
            .operation_id("notes.create")
            .json_request::<NewNote>(openapi, "Note text")
            .handler(create_note)
            .json_response_with_schema::<Note>(openapi, 201, "Created")
            .problem_response(openapi, 400, "Bad Request")
            .register(router, openapi);

        Ok(router)
    }
}

fn build_app() -> (Router, Arc<api_ingress::ApiIngress>) {
    let ingress = Arc::new(api_ingress::ApiIngress::default());
    let notes = Arc::new(NotesModule);

    let mut b = RegistryBuilder::default();
    b.register_core("api_ingress", &[], ingress.clone());
    b.register_rest_host("api_ingress", ingress.clone());
    b.register_core("notes", &["api_ingress"], notes.clone());
    b.register_rest("notes", notes);
    let registry = b.build_topo_sorted().expect("registry");

    let ctx = ModuleCtxBuilder::new(CancellationToken::new()).build();
    let router = registry
        .run_rest_phase(&ctx, Router::new())
        .expect("rest phase");
    (router, ingress)
}

#[tokio::test]
async fn module_routes_are_served_behind_the_ingress() {
    let (app, _) = build_app();

    let resp = app
        .oneshot(Request::get("/notes/3").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let note: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(note["id"], 3);
}

#[tokio::test]
async fn malformed_body_becomes_a_problem() {
    let (app, _) = build_app();

    let resp = app
        .oneshot(
            Request::post("/notes")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.headers().get("content-type").unwrap(),
        "application/problem+json"
    );
}

#[tokio::test]
async fn openapi_document_covers_module_operations() {
    let (app, ingress) = build_app();

    let doc = serde_json::to_value(ingress.build_openapi().unwrap()).unwrap();
    assert!(doc["paths"]["/notes/{id}"]["get"].is_object());
    assert_eq!(
        doc["paths"]["/notes"]["post"]["requestBody"]["content"]["application/json"]["schema"]
            ["$ref"],
        "#/components/schemas/NewNote"
    );
    assert!(doc["components"]["schemas"]["Problem"].is_object());

    let resp = app
        .oneshot(Request::get("/openapi.json").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
