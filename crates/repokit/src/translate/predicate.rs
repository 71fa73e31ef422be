use super::TranslateError;
use crate::query::{OrderDirection, Predicate};

/// Translate an API predicate token. Matching is case-insensitive.
///
/// | token          | predicate   |
/// |----------------|-------------|
/// | `gt`, `>`      | `>`         |
/// | `ge`, `>=`     | `>=`        |
/// | `eq`, `=`      | `=`         |
/// | `ne`, `!=`     | `!=`        |
/// | `lt`, `<`      | `<`         |
/// | `le`, `<=`     | `<=`        |
/// | `in`           | `IN`        |
/// | `not_in`       | `NOT IN`    |
/// | `like`         | `LIKE`      |
/// | `not_like`     | `NOT LIKE`  |
pub fn parse_predicate(token: &str) -> Result<Predicate, TranslateError> {
    let predicate = match token.to_ascii_lowercase().as_str() {
        "gt" | ">" => Predicate::Greater,
        "ge" | ">=" => Predicate::GreaterOrEqual,
        "eq" | "=" => Predicate::Equal,
        "ne" | "!=" => Predicate::NotEqual,
        "lt" | "<" => Predicate::Less,
        "le" | "<=" => Predicate::LessOrEqual,
        "in" => Predicate::In,
        "not_in" => Predicate::NotIn,
        "like" => Predicate::Like,
        "not_like" => Predicate::NotLike,
        _ => {
            return Err(TranslateError::InvalidPredicate {
                predicate: token.to_string(),
            });
        }
    };
    Ok(predicate)
}

/// Translate an API sort direction for `field`. Matching is case-insensitive.
pub fn parse_direction(field: &str, token: &str) -> Result<OrderDirection, TranslateError> {
    match token.to_ascii_lowercase().as_str() {
        "asc" | "ascending" => Ok(OrderDirection::Asc),
        "desc" | "descending" => Ok(OrderDirection::Desc),
        _ => Err(TranslateError::InvalidOrderDirection {
            field: field.to_string(),
            direction: token.to_string(),
        }),
    }
}

/// The predicates a field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredicateSet(&'static [Predicate]);

impl PredicateSet {
    pub const ALL: Self = Self(&[
        Predicate::Greater,
        Predicate::GreaterOrEqual,
        Predicate::Equal,
        Predicate::NotEqual,
        Predicate::Less,
        Predicate::LessOrEqual,
        Predicate::In,
        Predicate::NotIn,
        Predicate::Like,
        Predicate::NotLike,
    ]);
    pub const ONLY_EQUAL: Self = Self(&[Predicate::Equal]);
    pub const EQUAL_AND_NOT_EQUAL: Self = Self(&[Predicate::Equal, Predicate::NotEqual]);
    pub const ONLY_GREATER: Self = Self(&[Predicate::Greater, Predicate::GreaterOrEqual]);
    pub const ONLY_LESS: Self = Self(&[Predicate::Less, Predicate::LessOrEqual]);
    pub const ONLY_IN_AND_NOT_IN: Self = Self(&[Predicate::In, Predicate::NotIn]);

    pub const fn new(predicates: &'static [Predicate]) -> Self {
        Self(predicates)
    }

    pub fn allows(&self, predicate: Predicate) -> bool {
        self.0.contains(&predicate)
    }

    pub fn predicates(&self) -> &'static [Predicate] {
        self.0
    }
}

impl Default for PredicateSet {
    fn default() -> Self {
        Self::ALL
    }
}
