//! Error types for the fissure-core library.
//!
//! Errors are classified by how far they reach: a missing package statement
//! disqualifies a whole file, while a malformed declaration only costs the one
//! candidate it belongs to.

use crate::lexer::MalformedReason;
use thiserror::Error;

/// Result type alias for fissure operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all fissure-core operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The text has no package/namespace statement in code
    #[error("no package declaration found")]
    MissingPackageDeclaration,

    /// The body of a declaration could not be delimited
    #[error("malformed declaration '{name}' at offset {offset}: {reason}")]
    MalformedDeclaration {
        /// Name of the declared type
        name: String,
        /// Byte offset where the declaration header begins
        offset: usize,
        /// What the body scan ran into
        reason: MalformedReason,
    },

    /// A dialect table produced a pattern the regex engine rejected
    #[error("invalid declaration pattern: {0}")]
    InvalidPattern(String),
}

impl Error {
    /// Creates a new malformed declaration error
    pub fn malformed(name: impl Into<String>, offset: usize, reason: MalformedReason) -> Self {
        Self::MalformedDeclaration {
            name: name.into(),
            offset,
            reason,
        }
    }

    /// Creates a new invalid pattern error
    pub fn invalid_pattern(msg: impl Into<String>) -> Self {
        Self::InvalidPattern(msg.into())
    }
}

impl From<regex::Error> for Error {
    fn from(err: regex::Error) -> Self {
        Self::invalid_pattern(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::malformed("Order", 42, MalformedReason::NoOpeningBrace);
        let msg = err.to_string();
        assert!(msg.contains("Order"));
        assert!(msg.contains("42"));
        assert!(msg.contains("opening brace"));
    }
}
