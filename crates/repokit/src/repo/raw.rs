use crate::client::{Connection, ExecResult, Guard, OpenQuery, Preparer};
use crate::error::RepoResult;
use crate::exec;
use crate::value::Value;

/// The execution primitives without an error checker.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawQueryer;

impl RawQueryer {
    pub fn new() -> Self {
        Self
    }

    pub async fn exec<P: Preparer>(
        &self,
        preparer: &P,
        sql: &str,
        params: &[Value],
    ) -> RepoResult<ExecResult> {
        exec::exec(preparer, sql, params, None).await
    }

    pub async fn exec_raw<C: Connection>(
        &self,
        conn: &C,
        sql: &str,
        params: &[Value],
    ) -> RepoResult<ExecResult> {
        exec::exec_raw(conn, sql, params, None).await
    }

    pub async fn query<'p, P: Preparer>(
        &self,
        preparer: &'p P,
        sql: &str,
        params: &[Value],
    ) -> RepoResult<OpenQuery<P::Statement<'p>>> {
        exec::query(preparer, sql, params, None).await
    }

    pub async fn query_raw<C: Connection>(
        &self,
        conn: &C,
        sql: &str,
        params: &[Value],
    ) -> RepoResult<Guard<C::RawRows>> {
        exec::query_raw(conn, sql, params, None).await
    }
}
