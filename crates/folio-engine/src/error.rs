//! Error types for folio-engine

use thiserror::Error;

/// Result type alias using folio-engine Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while planning or executing document tasks
#[derive(Error, Debug)]
pub enum Error {
    /// An error from the completion-service layer
    #[error(transparent)]
    Ai(#[from] folio_ai::Error),

    /// Model output did not contain a usable JSON value
    #[error("Could not parse response: {0}")]
    Parse(String),

    /// A task was present but its action or parameters were unusable
    #[error("{action}: {reason}")]
    Validation { action: String, reason: String },

    /// The document manipulation library refused an operation
    #[error("Document error: {0}")]
    Library(String),

    /// Page rasterization failed
    #[error("Render error: {0}")]
    Render(String),

    /// Packaging an archive failed
    #[error("Archive error: {0}")]
    Archive(String),

    /// An operation needed a loaded document and none was
    #[error("No document is loaded")]
    NoDocument,

    /// A new instruction arrived while a suspension is waiting for input
    #[error("Waiting for requested input before accepting new instructions")]
    AwaitingInput,

    /// Input was supplied but nothing is waiting for it
    #[error("No task is waiting for input")]
    NotSuspended,

    /// Input was supplied in a different form than the pending request asked for
    #[error("The pending request expects {expected}")]
    WrongInputKind { expected: String },
}

impl Error {
    /// Create a validation error naming the action
    pub fn validation(action: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            action: action.into(),
            reason: reason.into(),
        }
    }

    /// Create a library error
    pub fn library(message: impl Into<String>) -> Self {
        Self::Library(message.into())
    }

    /// Whether this error is a misuse of the suspend/resume protocol
    pub fn is_protocol_misuse(&self) -> bool {
        matches!(
            self,
            Error::AwaitingInput | Error::NotSuspended | Error::WrongInputKind { .. }
        )
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Error::Archive(e.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Archive(e.to_string())
    }
}
