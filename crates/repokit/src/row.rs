//! Row access traits and utilities

use crate::error::{RepoError, RepoResult};
use crate::value::{FromValue, Value};

/// A single result row, independent of the driver that produced it.
///
/// The trait is object safe; entity scanners receive `&dyn Row`.
pub trait Row {
    /// Number of columns in the row
    fn len(&self) -> usize;

    /// Whether the row has no columns
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the column at `idx`, if in range
    fn column_name(&self, idx: usize) -> Option<&str>;

    /// Decode the column at `idx` into a [`Value`]
    fn value_at(&self, idx: usize) -> RepoResult<Value>;

    /// Position of a column by name
    fn index_of(&self, column: &str) -> Option<usize> {
        (0..self.len()).find(|&i| self.column_name(i) == Some(column))
    }
}

/// Extension trait for [`Row`] to provide typed access
pub trait RowExt: Row {
    /// Get a column by name, returning [`RepoError::Decode`] on failure
    fn try_get_column<T: FromValue>(&self, column: &str) -> RepoResult<T> {
        let idx = self
            .index_of(column)
            .ok_or_else(|| RepoError::decode(column, "no such column"))?;
        let value = self.value_at(idx)?;
        T::from_value(value).map_err(|e| RepoError::decode(column, e.to_string()))
    }

    /// Get a column by position
    fn try_get_at<T: FromValue>(&self, idx: usize) -> RepoResult<T> {
        let name = self.column_name(idx).unwrap_or("?").to_string();
        if idx >= self.len() {
            return Err(RepoError::decode(
                format!("#{idx}"),
                format!("row has {} columns", self.len()),
            ));
        }
        let value = self.value_at(idx)?;
        T::from_value(value).map_err(|e| RepoError::decode(name, e.to_string()))
    }
}

impl<R: Row + ?Sized> RowExt for R {}

/// An owned row of named values.
///
/// Useful for drivers that materialize rows eagerly and for tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValueRow {
    columns: Vec<(String, Value)>,
}

impl ValueRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column (builder style).
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.columns.push((column.into(), value.into()));
        self
    }

    pub fn push(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.push((column.into(), value.into()));
    }

    /// Value of `column`, if present.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, v)| v)
    }

    /// Replace the value of `column`, appending it when absent.
    pub fn set(&mut self, column: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.columns.iter_mut().find(|(name, _)| name == column) {
            Some((_, slot)) => *slot = value,
            None => self.columns.push((column.to_string(), value)),
        }
    }

    pub fn into_values(self) -> Vec<Value> {
        self.columns.into_iter().map(|(_, v)| v).collect()
    }
}

impl FromIterator<(String, Value)> for ValueRow {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

impl Row for ValueRow {
    fn len(&self) -> usize {
        self.columns.len()
    }

    fn column_name(&self, idx: usize) -> Option<&str> {
        self.columns.get(idx).map(|(name, _)| name.as_str())
    }

    fn value_at(&self, idx: usize) -> RepoResult<Value> {
        self.columns
            .get(idx)
            .map(|(_, v)| v.clone())
            .ok_or_else(|| RepoError::decode(format!("#{idx}"), "column index out of range"))
    }
}
