//! Resolution error types

use thiserror::Error;

/// Errors that can occur while resolving references in a document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// A `${` marker was never closed by a matching `}`.
    #[error("unmatched braces in reference: {0}")]
    MalformedReference(String),

    /// A reference path segment could not be located.
    #[error("path not found: {path}")]
    PathNotFound {
        /// The dot-separated path that failed to resolve.
        path: String,
    },

    /// A reference chain depends on itself and no default breaks it.
    #[error("circular reference: {0}")]
    CircularReference(String),

    /// Two distinct original keys resolved to the same final map key.
    #[error("duplicate key after resolution: {0}")]
    DuplicateKey(String),

    /// A map key resolved to a value that cannot serve as a key.
    #[error("key at {path} resolved to non-scalar {kind}")]
    NonScalarKey {
        /// Location of the offending key in the document.
        path: String,
        /// Variant name of the resolved key value.
        kind: &'static str,
    },

    /// Strict-mode summary of every reference left unresolved.
    #[error("{} unresolved reference(s): {}", .paths.len(), .paths.join(", "))]
    UnresolvedReferences {
        /// Every reference that remained unresolved after the final pass.
        paths: Vec<String>,
    },

    /// The maximum resolution depth was exceeded.
    #[error("maximum resolution depth exceeded at: {path}")]
    TooDeep {
        /// Location in the document where the guard tripped.
        path: String,
    },
}

/// Result type alias for resolution operations.
pub type ResolveResult<T> = Result<T, ResolveError>;
