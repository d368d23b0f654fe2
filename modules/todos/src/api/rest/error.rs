use axum::http::StatusCode;
use modkit::api::problem::{Problem, ProblemResponse, ValidationError};

use crate::domain::error::DomainError;

fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    detail: impl Into<String>,
    instance: &str,
) -> Problem {
    Problem::new(status, title, detail)
        .with_code(code)
        .with_instance(instance)
}

/// Map domain error to RFC 9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    let problem = match e {
        DomainError::TodoNotFound { id } => from_parts(
            StatusCode::NOT_FOUND,
            "TODOS_NOT_FOUND",
            "Not Found",
            format!("Todo with id {id} was not found"),
            instance,
        ),
        DomainError::Validation { field, message } => from_parts(
            StatusCode::BAD_REQUEST,
            "TODOS_VALIDATION",
            "Validation error",
            e.to_string(),
            instance,
        )
        .with_errors(vec![ValidationError::field(field, message.clone())]),
        DomainError::Database { .. } => {
            tracing::error!(error = ?e, "Database error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_DB",
                "Internal error",
                "An internal database error occurred",
                instance,
            )
        }
    };
    ProblemResponse(problem)
}

/// `pk` segments that are not integers name no todo.
pub fn not_found_pk(pk: &str, instance: &str) -> ProblemResponse {
    ProblemResponse(from_parts(
        StatusCode::NOT_FOUND,
        "TODOS_NOT_FOUND",
        "Not Found",
        format!("Todo with id {pk} was not found"),
        instance,
    ))
}
