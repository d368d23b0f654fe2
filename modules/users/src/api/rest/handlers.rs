use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    http::Uri,
    response::Html,
    Extension, Json,
};
use modkit::api::problem::ProblemResponse;
use tracing::{info, warn};

use crate::api::rest::dto::LoginSocialReq;
use crate::api::rest::error::map_domain_error;
use crate::domain::service::Service;

const LOGIN_PAGE: &str = include_str!("../../../assets/login.html");

/// Always answers with a problem: 400 for a bad payload, otherwise the
/// service's unavailable error.
pub async fn google_login(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    body: Result<Json<LoginSocialReq>, JsonRejection>,
) -> ProblemResponse {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => return modkit::json_rejection(rejection, uri.path()),
    };
    let login = match Service::validate_login(req.token_id) {
        Ok(login) => login,
        Err(e) => return map_domain_error(&e, uri.path()),
    };

    let e = svc.google_login(login).await;
    warn!("Google login rejected: {}", e);
    map_domain_error(&e, uri.path())
}

pub async fn login_page() -> Html<&'static str> {
    info!("Serving login page");
    Html(LOGIN_PAGE)
}
