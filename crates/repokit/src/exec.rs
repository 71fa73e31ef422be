//! Generic execution primitives.
//!
//! Every function takes a statement-capable handle (a connection or an open
//! transaction), SQL text, positional parameters and an optional
//! [`ErrorChecker`]. Statements and cursors are released on every exit path;
//! only [`query`] hands them to the caller, as an [`OpenQuery`].
//!
//! Errors raised by the driver or while scanning go through the checker.
//! [`RepoError::NoHandle`] is returned before any driver call when the handle
//! is closed, and is never checked.

use crate::checker::{ErrorChecker, apply_checker};
use crate::client::{Connection, ExecResult, Guard, OpenQuery, PreparedStatement, Preparer};
use crate::entity::Getter;
use crate::error::{RepoError, RepoResult};
use crate::row::{Row, RowExt};
use crate::value::{FromValue, Value};

const MAX_LOGGED_SQL: usize = 200;

pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

fn log_sql(op: &'static str, sql: &str, params: &[Value]) {
    let truncated = sql.len() > MAX_LOGGED_SQL;
    tracing::debug!(
        target: "repokit.sql",
        op,
        sql = truncate_sql_bytes(sql, MAX_LOGGED_SQL),
        truncated,
        param_count = params.len(),
        "execute"
    );
}

fn ensure_open<P: Preparer + ?Sized>(handle: &P, op: &'static str) -> RepoResult<()> {
    if handle.is_closed() {
        return Err(RepoError::NoHandle { op });
    }
    Ok(())
}

/// Prepare and execute a statement that returns no rows.
pub async fn exec<P: Preparer>(
    preparer: &P,
    sql: &str,
    params: &[Value],
    checker: Option<&dyn ErrorChecker>,
) -> RepoResult<ExecResult> {
    ensure_open(preparer, "exec")?;
    log_sql("exec", sql, params);

    let check = |err| apply_checker(checker, err);
    let statement = preparer.prepare(sql).await.map_err(check)?;
    let mut statement = Guard::new(statement, "statement");
    statement.execute(params).await.map_err(check)
}

/// Execute on a connection without an explicit prepare step.
pub async fn exec_raw<C: Connection>(
    conn: &C,
    sql: &str,
    params: &[Value],
    checker: Option<&dyn ErrorChecker>,
) -> RepoResult<ExecResult> {
    ensure_open(conn, "exec_raw")?;
    log_sql("exec_raw", sql, params);

    conn.exec_raw(sql, params)
        .await
        .map_err(|err| apply_checker(checker, err))
}

/// Prepare and run a row-producing statement, returning it still open.
///
/// If the statement prepares but fails to run, it is closed before the error
/// is returned.
pub async fn query<'p, P: Preparer>(
    preparer: &'p P,
    sql: &str,
    params: &[Value],
    checker: Option<&dyn ErrorChecker>,
) -> RepoResult<OpenQuery<P::Statement<'p>>> {
    ensure_open(preparer, "query")?;
    log_sql("query", sql, params);
    open_query(preparer, sql, params)
        .await
        .map_err(|err| apply_checker(checker, err))
}

async fn open_query<'p, P: Preparer>(
    preparer: &'p P,
    sql: &str,
    params: &[Value],
) -> RepoResult<OpenQuery<P::Statement<'p>>> {
    let statement = preparer.prepare(sql).await?;
    let mut statement = Guard::new(statement, "statement");
    match statement.query(params).await {
        Ok(rows) => Ok(OpenQuery::new(statement, rows)),
        Err(err) => {
            if let Err(close_err) = statement.close() {
                tracing::warn!(
                    target: "repokit.sql",
                    error = %close_err,
                    "failed to close statement after query error"
                );
            }
            Err(err)
        }
    }
}

/// Query on a connection without an explicit prepare step.
///
/// The cursor is closed when the returned guard drops.
pub async fn query_raw<C: Connection>(
    conn: &C,
    sql: &str,
    params: &[Value],
    checker: Option<&dyn ErrorChecker>,
) -> RepoResult<Guard<C::RawRows>> {
    ensure_open(conn, "query_raw")?;
    log_sql("query_raw", sql, params);

    conn.query_raw(sql, params)
        .await
        .map(|rows| Guard::new(rows, "cursor"))
        .map_err(|err| apply_checker(checker, err))
}

/// Fetch the first row into a fresh entity from `factory`.
///
/// No row yields [`RepoError::NotFound`], passed through the checker.
pub async fn query_to_one<P, E, F>(
    preparer: &P,
    sql: &str,
    params: &[Value],
    checker: Option<&dyn ErrorChecker>,
    factory: F,
) -> RepoResult<E>
where
    P: Preparer,
    E: Getter,
    F: FnOnce() -> E,
{
    ensure_open(preparer, "query_to_one")?;
    log_sql("query_to_one", sql, params);

    let mut open = open_query(preparer, sql, params)
        .await
        .map_err(|err| apply_checker(checker, err))?;
    let result: RepoResult<E> = async {
        match open.next().await? {
            Some(row) => {
                let mut entity = factory();
                entity.scan_row(&row)?;
                Ok(entity)
            }
            None => Err(RepoError::not_found(format!(
                "no rows returned by: {}",
                truncate_sql_bytes(sql, MAX_LOGGED_SQL)
            ))),
        }
    }
    .await;
    result.map_err(|err| apply_checker(checker, err))
}

/// Fetch every row, one fresh entity from `factory` per row.
pub async fn query_to_many<P, E, F>(
    preparer: &P,
    sql: &str,
    params: &[Value],
    checker: Option<&dyn ErrorChecker>,
    mut factory: F,
) -> RepoResult<Vec<E>>
where
    P: Preparer,
    E: Getter,
    F: FnMut() -> E,
{
    query_map(preparer, sql, params, checker, |row| {
        let mut entity = factory();
        entity.scan_row(row)?;
        Ok(entity)
    })
    .await
}

/// Fetch the first column of the first row.
///
/// No row yields [`RepoError::NotFound`].
pub async fn query_scalar<P, T>(
    preparer: &P,
    sql: &str,
    params: &[Value],
    checker: Option<&dyn ErrorChecker>,
) -> RepoResult<T>
where
    P: Preparer,
    T: FromValue,
{
    ensure_open(preparer, "query_scalar")?;
    log_sql("query_scalar", sql, params);

    let mut open = open_query(preparer, sql, params)
        .await
        .map_err(|err| apply_checker(checker, err))?;
    let result: RepoResult<T> = async {
        match open.next().await? {
            Some(row) => row.try_get_at::<T>(0),
            None => Err(RepoError::not_found("scalar query returned no rows")),
        }
    }
    .await;
    result.map_err(|err| apply_checker(checker, err))
}

/// Map every row through `map`.
pub async fn query_map<P, T, M>(
    preparer: &P,
    sql: &str,
    params: &[Value],
    checker: Option<&dyn ErrorChecker>,
    mut map: M,
) -> RepoResult<Vec<T>>
where
    P: Preparer,
    M: FnMut(&dyn Row) -> RepoResult<T>,
{
    ensure_open(preparer, "query_map")?;
    log_sql("query_map", sql, params);

    let mut open = open_query(preparer, sql, params)
        .await
        .map_err(|err| apply_checker(checker, err))?;
    let result: RepoResult<Vec<T>> = async {
        let mut out = Vec::new();
        while let Some(row) = open.next().await? {
            out.push(map(&row)?);
        }
        Ok(out)
    }
    .await;
    result.map_err(|err| apply_checker(checker, err))
}
