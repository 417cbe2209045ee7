use thiserror::Error;

use crate::domain::quote::{QuoteOutcome, QuoteResponse};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum QuoteValidationError {
    #[error("body must be a JSON object")]
    NotAnObject,
    #[error("body must have required property '{0}'")]
    MissingField(&'static str),
    #[error("body/{field} must be {expected}")]
    WrongType { field: &'static str, expected: &'static str },
    #[error("body/{field} must match format \"{format}\"")]
    InvalidFormat { field: &'static str, format: &'static str },
    #[error("body/{field} must be equal to one of the allowed values ({allowed})")]
    NotAllowed { field: &'static str, allowed: String },
    #[error("body/{field} must be {bound}")]
    OutOfRange { field: &'static str, bound: String },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("invalid project identifier `{project_id}`: {reason}")]
    InvalidProjectId { project_id: String, reason: &'static str },
    #[error(transparent)]
    InvalidQuote(#[from] QuoteValidationError),
}

/// Caller-facing failure. The `message` is safe to show; internal causes are
/// only ever logged.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String },
    #[error("not found: {message}")]
    NotFound { message: String },
    #[error("internal error: {message}")]
    Internal { message: String },
}

pub const QUOTE_FAILURE_MESSAGE: &str = "Failed to generate quote";

impl InterfaceError {
    pub fn error(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => "Bad Request",
            Self::NotFound { .. } => "Project not found",
            Self::Internal { .. } => "Internal Server Error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest { message }
            | Self::NotFound { message }
            | Self::Internal { message } => message,
        }
    }
}

impl QuoteOutcome {
    pub fn into_response(self) -> Result<QuoteResponse, InterfaceError> {
        match self {
            Self::Success(result) => Ok(result.to_response()),
            Self::ProjectNotFound { project_id } => Err(InterfaceError::NotFound {
                message: format!("No project found with ID: {project_id}"),
            }),
            Self::ValidationFailed { reason } => Err(InterfaceError::BadRequest { message: reason }),
            Self::ScoringFailed(_) => {
                Err(InterfaceError::Internal { message: QUOTE_FAILURE_MESSAGE.to_owned() })
            }
        }
    }
}
