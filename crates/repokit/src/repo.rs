//! Per-entity repositories composing a query builder, the execution primitives
//! and an optional error checker.
//!
//! # Example
//!
//! ```ignore
//! use repokit::postgres::{PgErrorChecker, PgQueryBuilder};
//! use repokit::{GetOptions, ReaderRepo};
//!
//! let users = ReaderRepo::<User, _>::new(PgQueryBuilder::new())
//!     .with_error_checker(PgErrorChecker);
//! let all = users.get_many(&conn, User::default, &GetOptions::new()).await?;
//! ```

mod custom;
mod mutator;
mod raw;
mod reader;

pub use custom::CustomRepo;
pub use mutator::MutatorRepo;
pub use raw::RawQueryer;
pub use reader::ReaderRepo;
