//! Transaction unit of work.
//!
//! [`transaction`] runs a closure against an open transaction and finalizes it
//! exactly once:
//!
//! - closure returns `Ok` → commit; a commit failure replaces the value
//! - closure returns `Err` → rollback; a rollback failure replaces the error
//! - closure panics → rollback, then the panic continues unwinding
//!
//! # Example
//!
//! ```ignore
//! use repokit::{with_transaction, RepoError};
//!
//! let moved = with_transaction(&mut conn, async |tx| {
//!     let debited = accounts.update(tx, &from, &by_id(1), &debit).await?;
//!     let credited = accounts.update(tx, &to, &by_id(2), &credit).await?;
//!     Ok::<_, RepoError>(debited + credited)
//! })
//! .await?;
//! ```

use crate::client::{Connection, Transaction};
use crate::error::RepoError;
use futures_util::FutureExt;
use std::panic::AssertUnwindSafe;

/// Transaction isolation level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationLevel {
    /// Treated as read committed by PostgreSQL
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    pub fn as_sql(self) -> &'static str {
        match self {
            IsolationLevel::ReadUncommitted => "READ UNCOMMITTED",
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Serializable => "SERIALIZABLE",
        }
    }
}

/// Options for [`Connection::begin_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TxOptions {
    /// `None` keeps the server default.
    pub isolation: Option<IsolationLevel>,
    pub read_only: bool,
}

impl TxOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn isolation(mut self, level: IsolationLevel) -> Self {
        self.isolation = Some(level);
        self
    }

    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }
}

/// Run `f` inside `tx`, then commit or roll back.
///
/// The transaction is consumed, so exactly one of commit/rollback happens per
/// call. A panic inside `f` is caught, the transaction is rolled back and the
/// panic is resumed; the caller never sees it as an ordinary error.
pub async fn transaction<X, T, E, F>(mut tx: X, f: F) -> Result<T, E>
where
    X: Transaction,
    F: AsyncFnOnce(&mut X) -> Result<T, E>,
    E: From<RepoError>,
{
    let outcome = AssertUnwindSafe(f(&mut tx)).catch_unwind().await;

    match outcome {
        Ok(Ok(value)) => {
            tracing::debug!(target: "repokit.tx", "commit");
            tx.commit().await.map_err(E::from)?;
            Ok(value)
        }
        Ok(Err(err)) => {
            tracing::debug!(target: "repokit.tx", "rollback");
            match tx.rollback().await {
                Ok(()) => Err(err),
                Err(rollback_err) => Err(E::from(rollback_err)),
            }
        }
        Err(panic) => {
            tracing::warn!(target: "repokit.tx", "rolling back after panic");
            if let Err(rollback_err) = tx.rollback().await {
                tracing::error!(
                    target: "repokit.tx",
                    error = %rollback_err,
                    "rollback after panic failed"
                );
            }
            std::panic::resume_unwind(panic)
        }
    }
}

/// Begin a transaction on `conn` and run `f` in it; see [`transaction`].
///
/// A failure to begin is returned before `f` is called.
pub async fn with_transaction<'c, C, T, E, F>(conn: &'c mut C, f: F) -> Result<T, E>
where
    C: Connection,
    F: AsyncFnOnce(&mut C::Tx<'c>) -> Result<T, E>,
    E: From<RepoError>,
{
    with_transaction_opts(conn, TxOptions::default(), f).await
}

/// [`with_transaction`] with explicit [`TxOptions`].
pub async fn with_transaction_opts<'c, C, T, E, F>(
    conn: &'c mut C,
    opts: TxOptions,
    f: F,
) -> Result<T, E>
where
    C: Connection,
    F: AsyncFnOnce(&mut C::Tx<'c>) -> Result<T, E>,
    E: From<RepoError>,
{
    tracing::debug!(
        target: "repokit.tx",
        isolation = opts.isolation.map(IsolationLevel::as_sql),
        read_only = opts.read_only,
        "begin"
    );
    let tx = conn.begin_with(opts).await.map_err(E::from)?;
    transaction(tx, f).await
}
