use thiserror::Error;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TodosError {
    #[error("Todo not found: {id}")]
    NotFound { id: i32 },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error")]
    Internal,
}

impl From<crate::domain::error::DomainError> for TodosError {
    fn from(e: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match e {
            TodoNotFound { id } => Self::NotFound { id },
            Validation { .. } => Self::Validation {
                message: e.to_string(),
            },
            Database { .. } => Self::Internal,
        }
    }
}
