use axum::http::StatusCode;
use modkit::api::problem::{Problem, ProblemResponse, ValidationError};

use crate::domain::error::DomainError;

pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    let problem = match e {
        DomainError::Validation { field, message } => {
            Problem::new(StatusCode::BAD_REQUEST, "Validation error", e.to_string())
                .with_code("USERS_VALIDATION")
                .with_errors(vec![ValidationError::field(field, message.clone())])
        }
        DomainError::SocialLoginUnavailable { .. } => {
            Problem::new(StatusCode::NOT_IMPLEMENTED, "Not Implemented", e.to_string())
                .with_code("USERS_SOCIAL_LOGIN_UNAVAILABLE")
        }
    };
    ProblemResponse(problem.with_instance(instance))
}
