use tracing::{info, instrument, warn};

use crate::contract::model::LoginSocial;
use crate::domain::error::DomainError;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";

#[derive(Debug, Clone, Default)]
pub struct Service;

impl Service {
    /// Check the payload of a social login request.
    ///
    /// `token_id` is `None` when the field was absent.
    pub fn validate_login(token_id: Option<String>) -> Result<LoginSocial, DomainError> {
        match token_id {
            None => Err(DomainError::validation("token_id", REQUIRED)),
            Some(t) if t.trim().is_empty() => Err(DomainError::validation("token_id", BLANK)),
            Some(token_id) => Ok(LoginSocial { token_id }),
        }
    }

    /// Social login through Google.
    ///
    /// No identity provider is wired in, so every validated request ends in
    /// [`DomainError::SocialLoginUnavailable`]. Only the token length is
    /// logged, never the token.
    #[instrument(name = "users.service.google_login", skip_all)]
    pub async fn google_login(&self, login: LoginSocial) -> DomainError {
        info!(token_len = login.token_id.len(), "Google login requested");
        warn!("Google login is not wired to an identity provider");
        DomainError::SocialLoginUnavailable { provider: "google" }
    }
}
