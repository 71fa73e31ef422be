//! # repokit
//!
//! Data access for REST-style services: translate loosely-typed API filters
//! into a typed query model, build SQL from it, execute it against any handle
//! that can prepare statements, and run units of work in panic-safe
//! transactions.
//!
//! ## Pipeline
//!
//! ```ignore
//! use repokit::translate::{ApiSelectors, ApiToDbFields, parse_get_input};
//! use repokit::postgres::{PgErrorChecker, PgQueryBuilder};
//! use repokit::ReaderRepo;
//!
//! // Allow-list: API field -> table.column
//! let fields = ApiToDbFields::new().field("age", "users", "age");
//!
//! // {"age": {"predicate": "gt", "value": 18}}
//! let selectors: ApiSelectors = serde_json::from_value(body)?;
//! let input = parse_get_input(&fields, &selectors, &Default::default(), None, 100, false)?;
//!
//! let users = ReaderRepo::<User, _>::new(PgQueryBuilder::new())
//!     .with_error_checker(PgErrorChecker);
//! let adults = users.get_many(&conn, User::default, &input.get_options()).await?;
//! ```
//!
//! ## Transactions
//!
//! ```ignore
//! let n = repokit::with_transaction(&mut conn, async |tx| {
//!     users.insert(tx, alice).await?;
//!     users.insert(tx, bob).await?;
//!     Ok::<_, repokit::RepoError>(2)
//! })
//! .await?;
//! ```
//!
//! ## Features
//!
//! - `postgres` (default): tokio-postgres handles, `PgQueryBuilder`, `PgErrorChecker`
//! - `pool` (default): deadpool-postgres pool construction
//! - `derive` (default): `#[derive(Entity)]`

extern crate self as repokit;

pub mod builder;
pub mod checker;
pub mod client;
pub mod config;
pub mod entity;
pub mod error;
pub mod exec;
pub mod query;
pub mod repo;
pub mod row;
pub mod transaction;
pub mod translate;
pub mod value;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use builder::{
    BuiltQuery, CountOptions, DeleteOptions, GetOptions, MutatorQuery, QueryBuilder, ReaderQuery,
};
pub use checker::ErrorChecker;
pub use client::{
    Close, Connection, ExecResult, Guard, OpenQuery, PreparedStatement, Preparer, RowCursor,
    Transaction,
};
pub use config::ConnectConfig;
pub use entity::{CrudEntity, Getter, InsertedValues, Mutator, TableNamer};
pub use error::{BoxError, RepoError, RepoResult};
pub use query::{
    ColumnSelector, Join, JoinType, Order, OrderDirection, Page, Predicate, Projection, Selector,
    Selectors, Update, Updates,
};
pub use repo::{CustomRepo, MutatorRepo, RawQueryer, ReaderRepo};
pub use row::{Row, RowExt, ValueRow};
pub use transaction::{
    IsolationLevel, TxOptions, transaction, with_transaction, with_transaction_opts,
};
pub use translate::TranslateError;
pub use value::{FromValue, Value, ValueTypeError};

#[cfg(feature = "derive")]
pub use repokit_derive::Entity;
