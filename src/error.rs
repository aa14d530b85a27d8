//! Service-level error taxonomy.
//!
//! `NotFound` covers both rows that do not exist and rows the caller does not
//! own; responses never distinguish the two, so probing cannot reveal which
//! ids exist. Authentication errors are raised before any data access.

use crate::storage::StorageError;
use sea_orm::DbErr;

/// Errors surfaced by the course, content and enrollment services.
#[derive(Debug)]
pub enum Error {
    /// Entity missing, or present but not owned by the caller.
    NotFound(&'static str),
    /// Field-level validation failures.
    Validation(Vec<FieldError>),
    /// No signed-in user.
    Unauthenticated,
    /// Signed in, but not allowed to perform the operation.
    Forbidden(&'static str),
    /// Database failure.
    Db(DbErr),
    /// Media storage failure.
    Storage(StorageError),
}

/// A single failed field with a human-readable reason.
#[derive(Debug, Clone, serde::Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl Error {
    /// Single-field validation failure.
    pub fn validation(field: &str, message: &str) -> Self {
        Error::Validation(vec![FieldError {
            field: field.to_string(),
            message: message.to_string(),
        }])
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::NotFound(what) => write!(f, "{} not found", what),
            Error::Validation(errors) => {
                write!(f, "validation failed")?;
                for e in errors {
                    write!(f, "; {}: {}", e.field, e.message)?;
                }
                Ok(())
            }
            Error::Unauthenticated => write!(f, "login required"),
            Error::Forbidden(msg) => write!(f, "forbidden: {}", msg),
            Error::Db(e) => write!(f, "database error: {}", e),
            Error::Storage(e) => write!(f, "storage error: {}", e),
        }
    }
}

impl std::error::Error for Error {}

impl From<DbErr> for Error {
    fn from(e: DbErr) -> Self {
        Error::Db(e)
    }
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Error::Storage(e)
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = Vec::new();
        for (field, kinds) in errors.field_errors() {
            for kind in kinds {
                let message = kind
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("invalid value ({})", kind.code));
                fields.push(FieldError {
                    field: field.to_string(),
                    message,
                });
            }
        }
        Error::Validation(fields)
    }
}
