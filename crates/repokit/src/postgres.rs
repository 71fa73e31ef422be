//! PostgreSQL backend over tokio-postgres.
//!
//! ```ignore
//! use repokit::postgres::{connect, PgErrorChecker, PgQueryBuilder};
//! use repokit::{ConnectConfig, MutatorRepo};
//!
//! let mut conn = connect(&ConnectConfig::from_env()?).await?;
//! let users = MutatorRepo::<User, _>::new(PgQueryBuilder::new())
//!     .with_error_checker(PgErrorChecker);
//! users.insert(&conn, user).await?;
//! ```

mod builder;
mod checker;
mod client;
pub mod ident;
#[cfg(feature = "pool")]
mod pool;
mod rows;
mod types;

pub use builder::PgQueryBuilder;
pub use checker::PgErrorChecker;
pub use client::{PgClient, PgConnection, PgStatement, PgTransaction, connect};
pub use ident::ident;
#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_manager_config, create_pool_with_tls, pooled};
pub use rows::{PgRow, PgRows};
