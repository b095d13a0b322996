//! Error types for unlayout library.

use std::io;
use thiserror::Error;

/// Result type alias for unlayout operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while reconstructing or chunking a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The analysis result could not be decoded.
    #[error("Invalid analysis result: {0}")]
    InvalidInput(String),

    /// A formatter, limit set or pool was configured with invalid values.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The analysis result contradicts itself (page gaps, mismatched image
    /// keys, placeholder counts that do not line up).
    #[error("Consistency error: {0}")]
    Consistency(String),

    /// An offset lies beyond the end of the last page.
    #[error("Offset {offset} is beyond the end of the document ({end})")]
    OutOfRange { offset: usize, end: usize },

    /// A single element failed to convert.
    #[error("Failed to process element {element_id}: {message}")]
    ElementProcessing { element_id: String, message: String },

    /// The element kind has no unit producer.
    #[error("Unsupported element type {kind} ({element_id})")]
    UnsupportedElement { kind: String, element_id: String },

    /// Error during rendering (Markdown, JSON).
    #[error("Rendering error: {0}")]
    Render(String),

    /// A language model collaborator returned an error.
    #[error("LLM call failed: {0}")]
    Llm(String),

    /// One or more chunk dispatch tasks failed.
    #[error("{failed} of {total} chunk tasks failed")]
    Dispatch { failed: usize, total: usize },

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an element processing error.
    pub fn element(element_id: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ElementProcessing {
            element_id: element_id.into(),
            message: message.into(),
        }
    }

    /// Whether the error must abort processing regardless of the error mode.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Configuration(_) | Error::Consistency(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidInput(err.to_string())
    }
}
