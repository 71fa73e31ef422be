//! Driver-neutral query model: selectors, orders, updates, joins, pages, projections.
//!
//! These are plain data. The translation layer produces them from API input and
//! a [`QueryBuilder`](crate::QueryBuilder) turns them into SQL.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Deref, DerefMut};

/// Comparison predicate of a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Predicate {
    Greater,
    GreaterOrEqual,
    Equal,
    NotEqual,
    Less,
    LessOrEqual,
    In,
    NotIn,
    Like,
    NotLike,
}

impl Predicate {
    /// SQL operator text.
    pub fn as_sql(self) -> &'static str {
        match self {
            Predicate::Greater => ">",
            Predicate::GreaterOrEqual => ">=",
            Predicate::Equal => "=",
            Predicate::NotEqual => "!=",
            Predicate::Less => "<",
            Predicate::LessOrEqual => "<=",
            Predicate::In => "IN",
            Predicate::NotIn => "NOT IN",
            Predicate::Like => "LIKE",
            Predicate::NotLike => "NOT LIKE",
        }
    }

    /// Whether the predicate takes a list of values.
    pub fn is_list(self) -> bool {
        matches!(self, Predicate::In | Predicate::NotIn)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Join kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinType {
    pub fn as_sql(self) -> &'static str {
        match self {
            JoinType::Inner => "INNER",
            JoinType::Left => "LEFT",
            JoinType::Right => "RIGHT",
            JoinType::Full => "FULL",
        }
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// A single filter: `table.column <predicate> value`.
///
/// An empty `table` means the column is unqualified.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    pub table: String,
    pub column: String,
    pub predicate: Predicate,
    pub value: Value,
}

impl Selector {
    pub fn new(column: impl Into<String>, predicate: Predicate, value: impl Into<Value>) -> Self {
        Self {
            table: String::new(),
            column: column.into(),
            predicate,
            value: value.into(),
        }
    }

    /// Returns a copy qualified with `table`.
    pub fn with_table(&self, table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            ..self.clone()
        }
    }
}

/// Ordered list of selectors, combined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selectors(Vec<Selector>);

impl Selectors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a selector (builder style).
    pub fn add(
        mut self,
        column: impl Into<String>,
        predicate: Predicate,
        value: impl Into<Value>,
    ) -> Self {
        self.0.push(Selector::new(column, predicate, value));
        self
    }

    /// First selector on `column`.
    pub fn get_by_field(&self, column: &str) -> Option<&Selector> {
        self.0.iter().find(|s| s.column == column)
    }

    /// All selectors on any of `columns`, grouped in the order the columns are given.
    pub fn get_by_fields(&self, columns: &[&str]) -> Vec<&Selector> {
        columns
            .iter()
            .flat_map(|c| self.0.iter().filter(move |s| s.column == *c))
            .collect()
    }

    pub fn into_vec(self) -> Vec<Selector> {
        self.0
    }
}

impl Deref for Selectors {
    type Target = Vec<Selector>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Selectors {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl From<Vec<Selector>> for Selectors {
    fn from(v: Vec<Selector>) -> Self {
        Self(v)
    }
}

impl FromIterator<Selector> for Selectors {
    fn from_iter<I: IntoIterator<Item = Selector>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Selectors {
    type Item = &'a Selector;
    type IntoIter = std::slice::Iter<'a, Selector>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub table: String,
    pub field: String,
    pub direction: OrderDirection,
}

impl Order {
    pub fn new(table: impl Into<String>, field: impl Into<String>, direction: OrderDirection) -> Self {
        Self {
            table: table.into(),
            field: field.into(),
            direction,
        }
    }
}

/// Column assignment for UPDATE.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    pub field: String,
    pub value: Value,
}

impl Update {
    pub fn new(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Ordered list of column assignments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Updates(Vec<Update>);

impl Updates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.push(Update::new(field, value));
        self
    }

    pub fn into_vec(self) -> Vec<Update> {
        self.0
    }
}

impl Deref for Updates {
    type Target = Vec<Update>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<Update>> for Updates {
    fn from(v: Vec<Update>) -> Self {
        Self(v)
    }
}

impl FromIterator<Update> for Updates {
    fn from_iter<I: IntoIterator<Item = Update>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Result window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub offset: u64,
    pub limit: u64,
}

impl Page {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }
}

/// A `table.column` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSelector {
    pub table: String,
    pub column: String,
}

impl ColumnSelector {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// Selected output column; empty `alias` means none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    pub table: String,
    pub column: String,
    pub alias: String,
}

impl Projection {
    pub fn new(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
            alias: String::new(),
        }
    }

    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }
}

/// `<join_type> JOIN table ON on_left = on_right`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Join {
    pub join_type: JoinType,
    pub table: String,
    pub on_left: ColumnSelector,
    pub on_right: ColumnSelector,
}

impl Join {
    pub fn new(
        join_type: JoinType,
        table: impl Into<String>,
        on_left: ColumnSelector,
        on_right: ColumnSelector,
    ) -> Self {
        Self {
            join_type,
            table: table.into(),
            on_left,
            on_right,
        }
    }
}
