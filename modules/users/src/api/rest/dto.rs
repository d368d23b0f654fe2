use serde::Deserialize;
use utoipa::ToSchema;

/// Body of `POST /api/google-login/`.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LoginSocialReq {
    pub token_id: Option<String>,
}
