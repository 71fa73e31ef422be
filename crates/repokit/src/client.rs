//! Statement-capable handles.
//!
//! The execution primitives are written against these traits so that the same
//! code runs on a plain connection or inside an open transaction, and against
//! any driver that can implement them.
//!
//! | trait                 | role                                                 |
//! |-----------------------|------------------------------------------------------|
//! | [`Preparer`]          | anything that can prepare a statement                |
//! | [`PreparedStatement`] | a prepared statement, executable many times          |
//! | [`RowCursor`]         | forward-only result rows                             |
//! | [`Connection`]        | a [`Preparer`] that also runs raw SQL and begins txs |
//! | [`Transaction`]       | a [`Preparer`] consumed by commit or rollback        |

use crate::error::RepoResult;
use crate::row::Row;
use crate::transaction::TxOptions;
use crate::value::Value;
use std::future::Future;
use std::ops::{Deref, DerefMut};

/// A resource that must be released.
///
/// `close` must be idempotent: closing an already closed resource succeeds.
pub trait Close {
    fn close(&mut self) -> RepoResult<()>;
}

/// Something that can prepare statements: a connection or an open transaction.
pub trait Preparer: Send + Sync {
    type Statement<'a>: PreparedStatement
    where
        Self: 'a;

    fn prepare(
        &self,
        sql: &str,
    ) -> impl Future<Output = RepoResult<Self::Statement<'_>>> + Send;

    /// `true` once the handle can no longer run statements.
    ///
    /// The execution primitives check this before touching the driver.
    fn is_closed(&self) -> bool {
        false
    }
}

/// A prepared statement.
pub trait PreparedStatement: Close + Send {
    type Rows: RowCursor;

    /// Run a statement that does not produce rows.
    fn execute(
        &mut self,
        params: &[Value],
    ) -> impl Future<Output = RepoResult<ExecResult>> + Send;

    /// Run a statement that produces rows.
    fn query(&mut self, params: &[Value]) -> impl Future<Output = RepoResult<Self::Rows>> + Send;
}

/// Forward-only row cursor.
pub trait RowCursor: Close + Send {
    type Row: Row + Send;

    /// Fetch the next row; `Ok(None)` once exhausted.
    fn next(&mut self) -> impl Future<Output = RepoResult<Option<Self::Row>>> + Send;
}

/// A database connection.
pub trait Connection: Preparer {
    type Tx<'a>: Transaction
    where
        Self: 'a;

    type RawRows: RowCursor;

    /// Execute SQL without an explicit prepare step.
    fn exec_raw(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = RepoResult<ExecResult>> + Send;

    /// Query without an explicit prepare step.
    fn query_raw(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = RepoResult<Self::RawRows>> + Send;

    /// Begin a transaction with default options.
    fn begin(&mut self) -> impl Future<Output = RepoResult<Self::Tx<'_>>> + Send {
        self.begin_with(TxOptions::default())
    }

    fn begin_with(
        &mut self,
        opts: TxOptions,
    ) -> impl Future<Output = RepoResult<Self::Tx<'_>>> + Send;
}

/// An open transaction. Committing or rolling back consumes it.
pub trait Transaction: Preparer {
    fn commit(self) -> impl Future<Output = RepoResult<()>> + Send;

    fn rollback(self) -> impl Future<Output = RepoResult<()>> + Send;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum InsertId {
    Unsupported,
    Id(i64),
    Failed(String),
}

/// Outcome of a non-row statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecResult {
    rows_affected: Option<u64>,
    insert_id: InsertId,
}

impl ExecResult {
    /// A result that knows how many rows were touched and has no insert id.
    pub fn new(rows_affected: u64) -> Self {
        Self {
            rows_affected: Some(rows_affected),
            insert_id: InsertId::Unsupported,
        }
    }

    /// A result whose row count is not reported by the driver.
    pub fn without_rows_affected() -> Self {
        Self {
            rows_affected: None,
            insert_id: InsertId::Unsupported,
        }
    }

    pub fn with_insert_id(mut self, id: i64) -> Self {
        self.insert_id = InsertId::Id(id);
        self
    }

    /// Record that the driver tried to fetch the generated id and failed.
    pub fn with_insert_id_error(mut self, message: impl Into<String>) -> Self {
        self.insert_id = InsertId::Failed(message.into());
        self
    }

    pub fn rows_affected(&self) -> RepoResult<u64> {
        self.rows_affected.ok_or_else(|| {
            crate::RepoError::ResultUnavailable("rows affected is not reported".into())
        })
    }

    /// Generated id of the inserted row.
    ///
    /// `Ok(None)` when the driver has no notion of one (PostgreSQL uses
    /// `RETURNING` instead); `Err` only when retrieval was attempted and failed.
    pub fn last_insert_id(&self) -> RepoResult<Option<i64>> {
        match &self.insert_id {
            InsertId::Unsupported => Ok(None),
            InsertId::Id(id) => Ok(Some(*id)),
            InsertId::Failed(msg) => Err(crate::RepoError::ResultUnavailable(msg.clone())),
        }
    }
}

/// Closes the wrapped resource when dropped.
///
/// Dropping cannot report errors, so a failed close is logged; call
/// [`Guard::close`] to observe it.
pub struct Guard<T: Close> {
    inner: Option<T>,
    kind: &'static str,
}

impl<T: Close> Guard<T> {
    pub fn new(inner: T, kind: &'static str) -> Self {
        Self {
            inner: Some(inner),
            kind,
        }
    }

    /// Close now and report the outcome.
    pub fn close(mut self) -> RepoResult<()> {
        match self.inner.take() {
            Some(mut inner) => inner.close(),
            None => Ok(()),
        }
    }

    /// Stop guarding and hand back the resource, still open.
    pub fn into_inner(mut self) -> Option<T> {
        self.inner.take()
    }
}

impl<T: Close> Deref for Guard<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // `inner` is only taken by methods that consume the guard.
        match &self.inner {
            Some(inner) => inner,
            None => unreachable!("guard used after release"),
        }
    }
}

impl<T: Close> DerefMut for Guard<T> {
    fn deref_mut(&mut self) -> &mut T {
        match &mut self.inner {
            Some(inner) => inner,
            None => unreachable!("guard used after release"),
        }
    }
}

impl<T: Close> Drop for Guard<T> {
    fn drop(&mut self) {
        if let Some(mut inner) = self.inner.take()
            && let Err(err) = inner.close()
        {
            tracing::warn!(target: "repokit.sql", kind = self.kind, error = %err, "failed to close");
        }
    }
}

/// An executed query whose statement and cursor are still open.
///
/// Returned by [`query`](crate::exec::query). Rows are read with
/// [`OpenQuery::next`]; both resources are closed on drop or by
/// [`OpenQuery::close`].
pub struct OpenQuery<S: PreparedStatement> {
    rows: Guard<S::Rows>,
    statement: Guard<S>,
}

impl<S: PreparedStatement> OpenQuery<S> {
    pub(crate) fn new(statement: Guard<S>, rows: S::Rows) -> Self {
        Self {
            rows: Guard::new(rows, "cursor"),
            statement,
        }
    }

    pub async fn next(&mut self) -> RepoResult<Option<<S::Rows as RowCursor>::Row>> {
        self.rows.next().await
    }

    pub fn statement(&self) -> &S {
        &self.statement
    }

    /// Close cursor then statement. The first failure is returned; both are attempted.
    pub fn close(self) -> RepoResult<()> {
        let Self { rows, statement } = self;
        let rows_result = rows.close();
        let statement_result = statement.close();
        rows_result.and(statement_result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Tracked {
        closes: Arc<AtomicUsize>,
        fail: bool,
    }

    impl Close for Tracked {
        fn close(&mut self) -> RepoResult<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(crate::RepoError::Other("close failed".into()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn guard_closes_on_drop_once() {
        let closes = Arc::new(AtomicUsize::new(0));
        {
            let _g = Guard::new(
                Tracked {
                    closes: closes.clone(),
                    fail: false,
                },
                "statement",
            );
        }
        assert_eq!(closes.load(Ordering::SeqCst), 1);

        let g = Guard::new(
            Tracked {
                closes: closes.clone(),
                fail: true,
            },
            "statement",
        );
        assert!(g.close().is_err());
        assert_eq!(closes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn guard_into_inner_skips_close() {
        let closes = Arc::new(AtomicUsize::new(0));
        let g = Guard::new(
            Tracked {
                closes: closes.clone(),
                fail: false,
            },
            "cursor",
        );
        let inner = g.into_inner();
        assert!(inner.is_some());
        assert_eq!(closes.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn exec_result_accessors() {
        let r = ExecResult::new(3);
        assert_eq!(r.rows_affected().unwrap(), 3);
        assert_eq!(r.last_insert_id().unwrap(), None);

        let r = ExecResult::new(1).with_insert_id(42);
        assert_eq!(r.last_insert_id().unwrap(), Some(42));

        let r = ExecResult::without_rows_affected().with_insert_id_error("no id");
        assert!(matches!(
            r.rows_affected(),
            Err(crate::RepoError::ResultUnavailable(_))
        ));
        assert!(r.last_insert_id().is_err());
    }
}
