//! Error types for the extraction engine.

use thiserror::Error;

/// Result type alias for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors that can occur during extraction.
///
/// Only the element-count guard can prevent a result: everything else in
/// the pipeline degrades to `None` fields or a null content root.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Invalid base URL provided
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    /// Document exceeds the configured element limit
    #[error("Aborting: document holds {found} elements (limit: {limit})")]
    TooManyElements { found: usize, limit: usize },
}
