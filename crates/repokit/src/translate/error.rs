use serde::Serialize;
use thiserror::Error;

/// Rejected API input.
///
/// Serializes as `{"code": "...", "data": {...}}` so an API layer can put it
/// into its error envelope unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "code", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TranslateError {
    #[error("cannot translate predicate: {predicate}")]
    InvalidPredicate { predicate: String },

    #[error("cannot translate selector field: {field}")]
    InvalidSelectorField { field: String },

    #[error("cannot translate order field: {field}")]
    InvalidOrderField { field: String },

    #[error("cannot translate update field: {field}")]
    InvalidUpdateField { field: String },

    #[error("invalid order direction '{direction}' for field: {field}")]
    InvalidOrderDirection { field: String, direction: String },

    #[error("need at least one selector")]
    NeedAtLeastOneSelector,

    #[error("need at least one update")]
    NeedAtLeastOneUpdate,

    #[error("page limit exceeds the maximum of {max_limit}")]
    MaxPageLimitExceeded { max_limit: u64 },

    #[error("predicate '{predicate}' is not allowed for field: {field}")]
    PredicateNotAllowed { field: String, predicate: String },
}

impl TranslateError {
    /// Stable identifier for API error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPredicate { .. } => "INVALID_PREDICATE",
            Self::InvalidSelectorField { .. } => "INVALID_SELECTOR_FIELD",
            Self::InvalidOrderField { .. } => "INVALID_ORDER_FIELD",
            Self::InvalidUpdateField { .. } => "INVALID_UPDATE_FIELD",
            Self::InvalidOrderDirection { .. } => "INVALID_ORDER_DIRECTION",
            Self::NeedAtLeastOneSelector => "NEED_AT_LEAST_ONE_SELECTOR",
            Self::NeedAtLeastOneUpdate => "NEED_AT_LEAST_ONE_UPDATE",
            Self::MaxPageLimitExceeded { .. } => "MAX_PAGE_LIMIT_EXCEEDED",
            Self::PredicateNotAllowed { .. } => "PREDICATE_NOT_ALLOWED",
        }
    }

    /// The offending API field, when the error is about one.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidSelectorField { field }
            | Self::InvalidOrderField { field }
            | Self::InvalidUpdateField { field }
            | Self::InvalidOrderDirection { field, .. }
            | Self::PredicateNotAllowed { field, .. } => Some(field),
            _ => None,
        }
    }

    /// `true` for the "field is not on the allow-list" class.
    pub fn is_field_not_allowed(&self) -> bool {
        matches!(
            self,
            Self::InvalidSelectorField { .. }
                | Self::InvalidOrderField { .. }
                | Self::InvalidUpdateField { .. }
        )
    }
}
