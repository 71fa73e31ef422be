//! Connection pool construction

use super::client::PgConnection;
use crate::config::ConnectConfig;
use crate::error::{RepoError, RepoResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, PoolBuilder, RecyclingMethod};
use tokio_postgres::tls::{MakeTlsConnect, TlsConnect};
use tokio_postgres::{NoTls, Socket};

/// Create a pool sized by `config.max_size`, without TLS.
///
/// ```ignore
/// let pool = repokit::postgres::create_pool(&ConnectConfig::from_env()?)?;
/// let mut conn = repokit::postgres::pooled(&pool).await?;
/// ```
pub fn create_pool(config: &ConnectConfig) -> RepoResult<Pool> {
    create_pool_with_tls(config, NoTls)
}

/// Create a pool using a custom TLS connector.
pub fn create_pool_with_tls<T>(config: &ConnectConfig, tls: T) -> RepoResult<Pool>
where
    T: MakeTlsConnect<Socket> + Clone + Sync + Send + 'static,
    T::Stream: Sync + Send,
    T::TlsConnect: Sync + Send,
    <T::TlsConnect as TlsConnect<Socket>>::Future: Send,
{
    let max_size = config.max_size;
    create_pool_with_manager_config(config, tls, default_manager_config(), |builder| {
        builder.max_size(max_size)
    })
}

/// Create a pool with an explicit `ManagerConfig` and pool tuning.
pub fn create_pool_with_manager_config<T>(
    config: &ConnectConfig,
    tls: T,
    manager_config: ManagerConfig,
    configure_pool: impl FnOnce(PoolBuilder) -> PoolBuilder,
) -> RepoResult<Pool>
where
    T: MakeTlsConnect<Socket> + Clone + Sync + Send + 'static,
    T::Stream: Sync + Send,
    T::TlsConnect: Sync + Send,
    <T::TlsConnect as TlsConnect<Socket>>::Future: Send,
{
    let pg_config = config.to_pg_config()?;
    let mgr = Manager::from_config(pg_config, tls, manager_config);
    configure_pool(Pool::builder(mgr))
        .build()
        .map_err(|e| RepoError::Connection(format!("failed to build pool: {e}")))
}

/// Check a connection out of `pool`.
pub async fn pooled(pool: &Pool) -> RepoResult<PgConnection<deadpool_postgres::Client>> {
    let client = pool
        .get()
        .await
        .map_err(|e| RepoError::Connection(e.to_string()))?;
    Ok(PgConnection::new(client))
}

fn default_manager_config() -> ManagerConfig {
    ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    }
}
