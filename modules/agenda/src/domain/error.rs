use thiserror::Error;

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Person not found: {id}")]
    PersonNotFound { id: i32 },

    #[error("Validation failed: {}", join_violations(.errors))]
    Validation { errors: Vec<FieldViolation> },

    #[error("Unknown hobby ids: {ids:?}")]
    UnknownHobbies { ids: Vec<i32> },

    #[error("Unknown person: {id}")]
    UnknownPerson { id: i32 },

    #[error("Database error: {message}")]
    Database { message: String },
}

fn join_violations(errors: &[FieldViolation]) -> String {
    errors
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl DomainError {
    pub fn person_not_found(id: i32) -> Self {
        Self::PersonNotFound { id }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            errors: vec![FieldViolation {
                field: field.into(),
                message: message.into(),
            }],
        }
    }

    pub fn unknown_hobbies(ids: Vec<i32>) -> Self {
        Self::UnknownHobbies { ids }
    }

    pub fn unknown_person(id: i32) -> Self {
        Self::UnknownPerson { id }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}
