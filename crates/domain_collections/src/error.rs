//! Collections domain errors

use thiserror::Error;

/// Errors from the collection store
#[derive(Debug, Error)]
pub enum CollectionError {
    /// No collection with the given id
    #[error("Collection not found: {0}")]
    NotFound(String),

    /// Malformed collection input
    #[error("Invalid collection: {0}")]
    Invalid(String),
}
