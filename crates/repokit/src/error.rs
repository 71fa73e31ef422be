//! Error types for repokit

use crate::translate::TranslateError;
use thiserror::Error;

/// Result type alias for repokit operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Boxed driver or application error carried inside [`RepoError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Error types for data-access operations
///
/// Variants fall into three groups:
/// - nothing reached the store: [`RepoError::NoHandle`], [`RepoError::Translate`],
///   [`RepoError::Build`], [`RepoError::Prepare`], [`RepoError::Config`]
/// - the store was touched: execution, decoding and row-count errors (these pass
///   through an [`ErrorChecker`](crate::ErrorChecker) when one is configured)
/// - the transaction could not be finalized: [`RepoError::Commit`] and
///   [`RepoError::Rollback`]
#[derive(Debug, Error)]
pub enum RepoError {
    /// The statement-capable handle was absent or already closed
    #[error("{op}: statement handle is missing or closed")]
    NoHandle { op: &'static str },

    /// API input could not be translated into a query
    #[error(transparent)]
    Translate(#[from] TranslateError),

    /// The query builder rejected its input
    #[error("Query build error: {0}")]
    Build(String),

    /// The handle failed to prepare the statement
    #[error("Prepare error: {0}")]
    Prepare(#[source] BoxError),

    /// Statement execution or row fetch failed
    #[error("Execution error: {0}")]
    Execute(#[source] BoxError),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// The execution result cannot report the requested metadata
    #[error("Result unavailable: {0}")]
    ResultUnavailable(String),

    /// Commit failed; the transaction outcome is unknown
    #[error("Commit failed: {0}")]
    Commit(#[source] BoxError),

    /// Rollback failed; writes may not have been undone
    #[error("Rollback failed: {0}")]
    Rollback(#[source] BoxError),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unique constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// Application-defined error, usually produced by an error checker
    #[error("{0}")]
    Domain(#[source] BoxError),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl RepoError {
    /// Create a prepare error from a driver error
    pub fn prepare(err: impl Into<BoxError>) -> Self {
        Self::Prepare(err.into())
    }

    /// Create an execution error from a driver error
    pub fn execute(err: impl Into<BoxError>) -> Self {
        Self::Execute(err.into())
    }

    /// Create a commit error from a driver error
    pub fn commit(err: impl Into<BoxError>) -> Self {
        Self::Commit(err.into())
    }

    /// Create a rollback error from a driver error
    pub fn rollback(err: impl Into<BoxError>) -> Self {
        Self::Rollback(err.into())
    }

    /// Wrap an application error
    pub fn domain(err: impl Into<BoxError>) -> Self {
        Self::Domain(err.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a query build error
    pub fn build(message: impl Into<String>) -> Self {
        Self::Build(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Check if this is a translation error
    pub fn is_translation(&self) -> bool {
        matches!(self, Self::Translate(_))
    }

    /// `true` when the error was raised before any statement ran.
    pub fn is_pre_execution(&self) -> bool {
        matches!(
            self,
            Self::NoHandle { .. }
                | Self::Translate(_)
                | Self::Build(_)
                | Self::Prepare(_)
                | Self::Config(_)
        )
    }

    /// `true` when commit or rollback itself failed.
    ///
    /// The store may hold partially applied writes; callers should surface this loudly.
    pub fn is_finalization(&self) -> bool {
        matches!(self, Self::Commit(_) | Self::Rollback(_))
    }

    /// Returns the translation error, if this is one.
    pub fn as_translation(&self) -> Option<&TranslateError> {
        match self {
            Self::Translate(err) => Some(err),
            _ => None,
        }
    }
}
