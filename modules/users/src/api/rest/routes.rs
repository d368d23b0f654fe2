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
    router = OperationBuilder::<Missing, Missing, ()>::post("/api/google-login/")
        .operation_id("users.google_login")
        .summary("Sign in with a Google ID token")
        .description("The payload is validated; signing in is not available, so a valid payload gets 501.")
        .tag("users")
        .json_request::<dto::LoginSocialReq>(openapi, "Google ID token")
        .handler(handlers::google_login)
        .problem_response(openapi, 400, "Bad Request")
        .problem_response(openapi, 501, "Not Implemented")
        .register(router, openapi);

    router = OperationBuilder::<Missing, Missing, ()>::get("/login/")
        .operation_id("users.login_page")
        .summary("Login page")
        .tag("users")
        .handler(handlers::login_page)
        .html_response(200, "Login page")
        .register(router, openapi);

    Ok(router.layer(Extension(service)))
}
