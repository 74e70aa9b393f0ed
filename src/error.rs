//! Error types for the receipt rendering engine

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while producing receipt artifacts
///
/// Note that numeric parse failures are not errors: the currency codec
/// degrades to `None`/zero and callers substitute placeholders. Only the
/// variants below ever cross an API boundary, and of these only
/// `Artifact` is fatal for a render call — `Letterhead` is recovered by
/// the page renderer, which logs it and continues on a blank background.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to load or decode the letterhead background image
    #[error("Failed to load letterhead: {0}")]
    Letterhead(String),

    /// Failed to finalize the page artifact (PDF assembly/serialization)
    #[error("Artifact generation failed: {0}")]
    Artifact(String),

    /// Invalid render configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<printpdf::Error> for Error {
    fn from(err: printpdf::Error) -> Self {
        Error::Artifact(err.to_string())
    }
}
