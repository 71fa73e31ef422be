//! Entity contracts consumed by the execution primitives and repositories.
//!
//! These are usually derived with `#[derive(Entity)]` (feature `derive`):
//!
//! ```ignore
//! use repokit::Entity;
//!
//! #[derive(Debug, Default, Entity)]
//! #[repo(table = "users")]
//! struct User {
//!     #[repo(skip_insert)]
//!     id: i64,
//!     name: String,
//!     #[repo(column = "email_address")]
//!     email: Option<String>,
//! }
//! ```

use crate::error::RepoResult;
use crate::row::Row;
use crate::value::Value;

/// Column names paired positionally with their values.
pub type InsertedValues = (Vec<String>, Vec<Value>);

/// Anything that knows which table it lives in.
pub trait TableNamer {
    fn table_name(&self) -> &str;
}

/// An entity that can populate itself from a result row.
pub trait Getter: TableNamer {
    /// Fill `self` from `row`. Called once per row on a freshly constructed value.
    fn scan_row(&mut self, row: &dyn Row) -> RepoResult<()>;
}

/// An entity that can describe the columns written on insert.
pub trait Mutator: TableNamer {
    /// Columns and values for an INSERT, in matching order.
    fn inserted_values(&self) -> InsertedValues;
}

/// Convenience bound for entities that are both readable and writable.
pub trait CrudEntity: Getter + Mutator {}

impl<T: Getter + Mutator> CrudEntity for T {}
