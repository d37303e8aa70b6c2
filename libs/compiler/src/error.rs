//! Error types for the query compiler.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Compilation errors.
///
/// All failures abort the compile eagerly with no partial result;
/// compilation is a pure function of (AST, schema), so a failure always
/// indicates a caller/schema mismatch rather than a transient condition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The query cannot be compiled against the schema: unknown field,
    /// operator incompatible with the field type, malformed AST shape,
    /// external-hook failure, validator rejection, or a malformed order
    /// specification.
    #[error("Unsupported query: {0}")]
    UnsupportedQuery(String),

    /// Entry-point argument validation failure.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
