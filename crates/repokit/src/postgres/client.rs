//! Handle traits over tokio-postgres clients and transactions.

use super::rows::PgRows;
use crate::client::{Close, Connection, ExecResult, PreparedStatement, Preparer, Transaction};
use crate::config::ConnectConfig;
use crate::error::{RepoError, RepoResult};
use crate::transaction::{IsolationLevel, TxOptions};
use crate::value::Value;
use tokio_postgres::{GenericClient, NoTls, Statement};

/// Anything that owns a `tokio_postgres::Client`.
///
/// Implemented for the plain client and, with the `pool` feature, for a
/// pooled `deadpool_postgres::Client`.
pub trait PgClient: Send + Sync {
    fn pg(&self) -> &tokio_postgres::Client;

    fn pg_mut(&mut self) -> &mut tokio_postgres::Client;
}

impl PgClient for tokio_postgres::Client {
    fn pg(&self) -> &tokio_postgres::Client {
        self
    }

    fn pg_mut(&mut self) -> &mut tokio_postgres::Client {
        self
    }
}

#[cfg(feature = "pool")]
impl PgClient for deadpool_postgres::Client {
    fn pg(&self) -> &tokio_postgres::Client {
        self
    }

    fn pg_mut(&mut self) -> &mut tokio_postgres::Client {
        self
    }
}

/// A PostgreSQL connection usable with the execution primitives.
pub struct PgConnection<C> {
    client: C,
}

impl<C: PgClient> PgConnection<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &tokio_postgres::Client {
        self.client.pg()
    }

    pub fn into_inner(self) -> C {
        self.client
    }
}

/// Open a single connection, driving it on a spawned tokio task.
pub async fn connect(config: &ConnectConfig) -> RepoResult<PgConnection<tokio_postgres::Client>> {
    let pg_config = config.to_pg_config()?;
    let (client, connection) = pg_config
        .connect(NoTls)
        .await
        .map_err(|e| RepoError::Connection(e.to_string()))?;

    tokio::spawn(async move {
        if let Err(e) = connection.await {
            tracing::error!(target: "repokit.sql", error = %e, "connection error");
        }
    });

    Ok(PgConnection::new(client))
}

/// A server-side prepared statement bound to the client or transaction that
/// prepared it.
pub struct PgStatement<'a, G> {
    client: &'a G,
    statement: Option<Statement>,
}

impl<'a, G> PgStatement<'a, G> {
    fn new(client: &'a G, statement: Statement) -> Self {
        Self {
            client,
            statement: Some(statement),
        }
    }

    fn statement(&self, op: &'static str) -> RepoResult<&Statement> {
        self.statement.as_ref().ok_or(RepoError::NoHandle { op })
    }
}

impl<G> Close for PgStatement<'_, G> {
    fn close(&mut self) -> RepoResult<()> {
        self.statement = None;
        Ok(())
    }
}

impl<G> PreparedStatement for PgStatement<'_, G>
where
    G: GenericClient + Sync,
{
    type Rows = PgRows;

    async fn execute(&mut self, params: &[Value]) -> RepoResult<ExecResult> {
        let statement = self.statement("execute")?;
        let n = self
            .client
            .execute_raw(statement, params.iter())
            .await
            .map_err(RepoError::execute)?;
        Ok(ExecResult::new(n))
    }

    async fn query(&mut self, params: &[Value]) -> RepoResult<PgRows> {
        let statement = self.statement("query")?;
        let stream = self
            .client
            .query_raw(statement, params.iter())
            .await
            .map_err(RepoError::execute)?;
        Ok(PgRows::new(stream))
    }
}

impl<C: PgClient> Preparer for PgConnection<C> {
    type Statement<'a>
        = PgStatement<'a, tokio_postgres::Client>
    where
        Self: 'a;

    async fn prepare(&self, sql: &str) -> RepoResult<Self::Statement<'_>> {
        let client = self.client.pg();
        let statement = client.prepare(sql).await.map_err(RepoError::prepare)?;
        Ok(PgStatement::new(client, statement))
    }

    fn is_closed(&self) -> bool {
        self.client.pg().is_closed()
    }
}

fn pg_isolation(level: IsolationLevel) -> tokio_postgres::IsolationLevel {
    match level {
        IsolationLevel::ReadUncommitted => tokio_postgres::IsolationLevel::ReadUncommitted,
        IsolationLevel::ReadCommitted => tokio_postgres::IsolationLevel::ReadCommitted,
        IsolationLevel::RepeatableRead => tokio_postgres::IsolationLevel::RepeatableRead,
        IsolationLevel::Serializable => tokio_postgres::IsolationLevel::Serializable,
    }
}

impl<C: PgClient> Connection for PgConnection<C> {
    type Tx<'a>
        = PgTransaction<'a>
    where
        Self: 'a;

    type RawRows = PgRows;

    async fn exec_raw(&self, sql: &str, params: &[Value]) -> RepoResult<ExecResult> {
        let n = self
            .client
            .pg()
            .execute_raw(sql, params.iter())
            .await
            .map_err(RepoError::execute)?;
        Ok(ExecResult::new(n))
    }

    async fn query_raw(&self, sql: &str, params: &[Value]) -> RepoResult<PgRows> {
        let stream = self
            .client
            .pg()
            .query_raw(sql, params.iter())
            .await
            .map_err(RepoError::execute)?;
        Ok(PgRows::new(stream))
    }

    async fn begin_with(&mut self, opts: TxOptions) -> RepoResult<PgTransaction<'_>> {
        let mut builder = self.client.pg_mut().build_transaction();
        if let Some(level) = opts.isolation {
            builder = builder.isolation_level(pg_isolation(level));
        }
        if opts.read_only {
            builder = builder.read_only(true);
        }
        let tx = builder.start().await.map_err(RepoError::execute)?;
        Ok(PgTransaction { tx })
    }
}

/// An open PostgreSQL transaction.
///
/// Dropping it without [`commit`](Transaction::commit) rolls back, as
/// tokio-postgres does.
pub struct PgTransaction<'a> {
    tx: tokio_postgres::Transaction<'a>,
}

impl<'a> Preparer for PgTransaction<'a> {
    type Statement<'s>
        = PgStatement<'s, tokio_postgres::Transaction<'a>>
    where
        Self: 's;

    async fn prepare(&self, sql: &str) -> RepoResult<Self::Statement<'_>> {
        let statement = self.tx.prepare(sql).await.map_err(RepoError::prepare)?;
        Ok(PgStatement::new(&self.tx, statement))
    }

    fn is_closed(&self) -> bool {
        GenericClient::client(&self.tx).is_closed()
    }
}

impl Transaction for PgTransaction<'_> {
    async fn commit(self) -> RepoResult<()> {
        self.tx.commit().await.map_err(RepoError::commit)
    }

    async fn rollback(self) -> RepoResult<()> {
        self.tx.rollback().await.map_err(RepoError::rollback)
    }
}
