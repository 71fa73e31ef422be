//! Query builder contract.
//!
//! A builder turns a table name plus query-model values into statement text and
//! positional parameters. The execution layer never inspects the SQL it gets;
//! dialect concerns (placeholders, quoting, locking syntax) live entirely in
//! the implementation. [`PgQueryBuilder`](crate::postgres::PgQueryBuilder) is
//! the PostgreSQL one.

use crate::entity::InsertedValues;
use crate::error::RepoResult;
use crate::query::{Join, Order, Page, Projection, Selector, Selectors, Update};
use crate::value::Value;

/// Statement text with its positional parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

impl BuiltQuery {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// Options for a SELECT.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GetOptions {
    pub selectors: Selectors,
    pub orders: Vec<Order>,
    pub page: Option<Page>,
    pub joins: Vec<Join>,
    pub projections: Vec<Projection>,
    /// Lock the selected rows for the rest of the transaction.
    pub lock: bool,
}

impl GetOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selectors(mut self, selectors: impl Into<Selectors>) -> Self {
        self.selectors = selectors.into();
        self
    }

    pub fn orders(mut self, orders: Vec<Order>) -> Self {
        self.orders = orders;
        self
    }

    pub fn page(mut self, page: Page) -> Self {
        self.page = Some(page);
        self
    }

    pub fn join(mut self, join: Join) -> Self {
        self.joins.push(join);
        self
    }

    pub fn project(mut self, projection: Projection) -> Self {
        self.projections.push(projection);
        self
    }

    pub fn lock(mut self) -> Self {
        self.lock = true;
        self
    }
}

/// Options for a COUNT.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CountOptions {
    pub selectors: Selectors,
    pub page: Option<Page>,
    pub joins: Vec<Join>,
}

/// Options for a DELETE.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteOptions {
    /// Delete at most this many rows.
    pub limit: Option<u64>,
    /// Which rows go first when `limit` applies.
    pub orders: Vec<Order>,
}

/// Read-side statements.
pub trait ReaderQuery {
    fn get(&self, table: &str, opts: &GetOptions) -> RepoResult<BuiltQuery>;

    /// A statement returning a single integer column.
    fn count(&self, table: &str, opts: &CountOptions) -> RepoResult<BuiltQuery>;
}

/// Write-side statements.
pub trait MutatorQuery {
    fn insert(&self, table: &str, values: &InsertedValues) -> RepoResult<BuiltQuery>;

    /// One multi-row INSERT. Every row must list the same columns.
    fn insert_many(&self, table: &str, rows: &[InsertedValues]) -> RepoResult<BuiltQuery>;

    /// Multi-row INSERT that updates `update_projections` when a row collides
    /// on `conflict_columns`.
    fn upsert_many(
        &self,
        table: &str,
        rows: &[InsertedValues],
        update_projections: &[Projection],
        conflict_columns: &[&str],
    ) -> RepoResult<BuiltQuery>;

    fn update(
        &self,
        table: &str,
        updates: &[Update],
        selectors: &[Selector],
    ) -> RepoResult<BuiltQuery>;

    fn delete(
        &self,
        table: &str,
        selectors: &[Selector],
        opts: &DeleteOptions,
    ) -> RepoResult<BuiltQuery>;
}

/// A complete builder.
pub trait QueryBuilder: ReaderQuery + MutatorQuery {}

impl<T: ReaderQuery + MutatorQuery> QueryBuilder for T {}
