//! Agenda routes mounted behind the ingress, as the server wires them.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use modkit::{DbModule, Module, ModuleCtxBuilder, RegistryBuilder};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use agenda::AgendaModule;
use api_ingress::ApiIngress;

async fn build_app() -> (Router, Arc<ApiIngress>) {
    let db = Arc::new(
        modkit_db::DbHandle::connect("sqlite::memory:", Default::default())
            .await
            .unwrap(),
    );
    let ctx = ModuleCtxBuilder::new(CancellationToken::new())
        .with_db(db.clone())
        .for_module("agenda")
        .build();

    let ingress = Arc::new(ApiIngress::default());
    let agenda = Arc::new(AgendaModule::default());
    agenda.init(&ctx).await.unwrap();
    agenda.migrate(&db).await.unwrap();

    let mut b = RegistryBuilder::default();
    b.register_core("api_ingress", &[], ingress.clone());
    b.register_rest_host("api_ingress", ingress.clone());
    b.register_core("agenda", &["api_ingress"], agenda.clone());
    b.register_rest("agenda", agenda);
    let registry = b.build_topo_sorted().unwrap();

    let router = registry.run_rest_phase(&ctx, Router::new()).unwrap();
    (router, ingress)
}

#[tokio::test]
async fn document_lists_agenda_operations() {
    let (_, ingress) = build_app().await;
    let doc = serde_json::to_value(ingress.build_openapi().unwrap()).unwrap();

    let paths = &doc["paths"];
    for (path, method) in [
        ("/api/persona/list", "get"),
        ("/api/persona/search/{kword}", "get"),
        ("/api/persona/create", "post"),
        ("/api/persona/detail/{pk}", "get"),
        ("/api/persona/delete/{pk}", "delete"),
        ("/api/persona/update/{pk}", "put"),
        ("/api/persona/update/{pk}", "patch"),
        ("/api/persona/modificar/{pk}", "get"),
        ("/api/persona/modificar/{pk}", "put"),
        ("/api/persona/modificar/{pk}", "patch"),
        ("/api/personas/", "get"),
        ("/api/reuniones/", "get"),
        ("/api/reuniones-link/", "get"),
        ("/api/reunion/create", "post"),
        ("/api/hobbies/", "get"),
        ("/api/hobbies/", "post"),
    ] {
        assert!(paths[path][method].is_object(), "{method} {path} missing");
    }

    assert_eq!(
        paths["/api/personas/"]["get"]["responses"]["200"]["content"]["application/json"]["schema"]
            ["items"]["$ref"],
        "#/components/schemas/PersonWithHobbiesDto"
    );
    assert!(doc["components"]["schemas"]["ReunionDto"].is_object());
    assert!(paths["/api/persona/delete/{pk}"]["delete"]["responses"]["204"]
        .get("content")
        .is_none());
}

#[tokio::test]
async fn agenda_routes_answer_behind_the_ingress() {
    let (app, _) = build_app().await;

    let resp = app
        .clone()
        .oneshot(Request::get("/api/persona/list").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().contains_key("x-request-id"));

    let resp = app
        .oneshot(Request::get("/healthz").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
