use thiserror::Error;

/// Result alias for `topicflow`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the similarity, clustering, and scoring stages.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// Zero documents were given where at least one is required.
    #[error("empty document collection")]
    EmptyCollection,

    /// Matrix or vector shape does not match what the operation needs.
    #[error("invalid shape: expected {expected}, found {found}")]
    InvalidShape {
        /// Expected shape description.
        expected: String,
        /// Actual shape description.
        found: String,
    },

    /// Requested graph representation is not known.
    #[error("unsupported graph representation '{0}'")]
    UnsupportedRepresentation(String),

    /// Invalid parameter value.
    #[error("invalid parameter '{name}': {message}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },
}

impl Error {
    pub(crate) fn shape(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Error::InvalidShape {
            expected: expected.into(),
            found: found.into(),
        }
    }
}
