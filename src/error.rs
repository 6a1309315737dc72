use mongodb::error::{ErrorKind, WriteFailure};
use thiserror::Error;

/// Server error code returned when a collection already exists.
pub const NAMESPACE_EXISTS: i32 = 48;
/// Same index name, different options.
pub const INDEX_OPTIONS_CONFLICT: i32 = 85;
/// Same index name, different key pattern.
pub const INDEX_KEY_SPECS_CONFLICT: i32 = 86;
pub const DOCUMENT_VALIDATION_FAILURE: i32 = 121;
pub const DUPLICATE_KEY: i32 = 11000;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("conflict: {message}")]
    Conflict { code: Option<i32>, message: String },
    #[error("document failed validation: {0}")]
    Validation(String),
    #[error("invalid declaration: {0}")]
    InvalidDeclaration(String),
    #[error("configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MigrationError>;

impl MigrationError {
    pub fn conflict(code: i32, message: impl Into<String>) -> Self {
        MigrationError::Conflict {
            code: Some(code),
            message: message.into(),
        }
    }

    pub fn is_namespace_exists(&self) -> bool {
        matches!(self, MigrationError::Conflict { code: Some(NAMESPACE_EXISTS), .. })
    }
}

fn classify(code: i32, message: String) -> MigrationError {
    match code {
        NAMESPACE_EXISTS | INDEX_OPTIONS_CONFLICT | INDEX_KEY_SPECS_CONFLICT | DUPLICATE_KEY => {
            MigrationError::conflict(code, message)
        }
        DOCUMENT_VALIDATION_FAILURE => MigrationError::Validation(message),
        _ => MigrationError::Transport(format!("server error {}: {}", code, message)),
    }
}

impl From<mongodb::error::Error> for MigrationError {
    fn from(err: mongodb::error::Error) -> Self {
        match err.kind.as_ref() {
            ErrorKind::Command(cmd) => classify(cmd.code, cmd.message.clone()),
            ErrorKind::Write(WriteFailure::WriteError(write)) => {
                classify(write.code, write.message.clone())
            }
            _ => MigrationError::Transport(err.to_string()),
        }
    }
}
