use thiserror::Error;

/// Errors that are safe to expose to other modules
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgendaError {
    #[error("Person not found: {id}")]
    NotFound { id: i32 },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Internal error")]
    Internal,
}

impl AgendaError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

impl From<crate::domain::error::DomainError> for AgendaError {
    fn from(e: crate::domain::error::DomainError) -> Self {
        use crate::domain::error::DomainError::*;
        match e {
            PersonNotFound { id } => Self::NotFound { id },
            Validation { .. } | UnknownHobbies { .. } | UnknownPerson { .. } => {
                Self::validation(e.to_string())
            }
            Database { .. } => Self::Internal,
        }
    }
}
