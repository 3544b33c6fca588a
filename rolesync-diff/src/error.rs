//! Error types for the diff layer.

use std::fmt;
use thiserror::Error;

/// Result type for diff operations.
pub type DiffResult<T> = Result<T, ExtractionError>;

/// Which input collection a diff error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionSide {
    /// The previously applied collection.
    Old,
    /// The desired collection.
    New,
}

impl fmt::Display for CollectionSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollectionSide::Old => write!(f, "old"),
            CollectionSide::New => write!(f, "new"),
        }
    }
}

/// An input collection could not be decoded into items.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// The value was present but not a JSON array.
    #[error("{side} collection is not a list (found {found})")]
    NotAList {
        side: CollectionSide,
        found: &'static str,
    },

    /// An element failed to decode.
    #[error("{side} collection element {index} is malformed: {source}")]
    Malformed {
        side: CollectionSide,
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl ExtractionError {
    /// Returns the side of the diff that failed to decode.
    pub fn side(&self) -> CollectionSide {
        match self {
            ExtractionError::NotAList { side, .. } | ExtractionError::Malformed { side, .. } => {
                *side
            }
        }
    }
}
