use axum::http::StatusCode;
use modkit::api::problem::{Problem, ProblemResponse, ValidationError};

use crate::api::rest::links::HostError;
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

fn does_not_exist(id: i32) -> String {
    format!("Invalid pk \"{id}\" - object does not exist.")
}

/// Map domain error to RFC 9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    let problem = match e {
        DomainError::PersonNotFound { id } => from_parts(
            StatusCode::NOT_FOUND,
            "AGENDA_NOT_FOUND",
            "Not Found",
            format!("Person with id {id} was not found"),
            instance,
        ),
        DomainError::Validation { errors } => from_parts(
            StatusCode::BAD_REQUEST,
            "AGENDA_VALIDATION",
            "Validation error",
            e.to_string(),
            instance,
        )
        .with_errors(
            errors
                .iter()
                .map(|v| ValidationError::field(&v.field, v.message.clone()))
                .collect(),
        ),
        DomainError::UnknownHobbies { ids } => from_parts(
            StatusCode::BAD_REQUEST,
            "AGENDA_UNKNOWN_HOBBY",
            "Validation error",
            e.to_string(),
            instance,
        )
        .with_errors(
            ids.iter()
                .map(|id| ValidationError::field("hobbies", does_not_exist(*id)))
                .collect(),
        ),
        DomainError::UnknownPerson { id } => from_parts(
            StatusCode::BAD_REQUEST,
            "AGENDA_UNKNOWN_PERSON",
            "Validation error",
            e.to_string(),
            instance,
        )
        .with_errors(vec![ValidationError::field("persona", does_not_exist(*id))]),
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

pub fn not_found_pk(pk: &str, instance: &str) -> ProblemResponse {
    ProblemResponse(from_parts(
        StatusCode::NOT_FOUND,
        "AGENDA_NOT_FOUND",
        "Not Found",
        format!("Person with id {pk} was not found"),
        instance,
    ))
}

/// 400 for a request whose host cannot be used in links.
pub fn invalid_host(e: &HostError, instance: &str) -> ProblemResponse {
    tracing::warn!(error = %e, "Rejected request host");
    ProblemResponse(from_parts(
        StatusCode::BAD_REQUEST,
        "AGENDA_INVALID_HOST",
        "Bad Request",
        e.to_string(),
        instance,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_hobbies_point_at_the_field() {
        let resp = map_domain_error(&DomainError::unknown_hobbies(vec![7, 9]), "/api/persona/create");
        let problem = resp.0;
        assert_eq!(problem.status, 400);
        assert_eq!(problem.code, "AGENDA_UNKNOWN_HOBBY");
        let errors = problem.errors.unwrap();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].pointer, "/hobbies");
        assert_eq!(errors[0].detail, "Invalid pk \"7\" - object does not exist.");
    }

    #[test]
    fn database_details_are_hidden() {
        let resp = map_domain_error(&DomainError::database("disk I/O error"), "/api/persona/list");
        assert_eq!(resp.0.status, 500);
        assert!(!resp.0.detail.contains("disk"));
    }
}
