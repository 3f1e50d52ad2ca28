//! Connection pool constructors.

use super::PgHostConfig;
use crate::error::{TableError, TableResult};
use deadpool_postgres::{Manager, ManagerConfig, Pool, PoolBuilder, RecyclingMethod};
use tokio_postgres::NoTls;
use tokio_postgres::Socket;
use tokio_postgres::tls::{MakeTlsConnect, TlsConnect};

/// Pool of 16 plaintext connections to `database_url`.
pub fn create_pool(database_url: &str) -> TableResult<Pool> {
    create_pool_with_config(&PgHostConfig::new(database_url))
}

/// Plaintext pool sized from `config`.
pub fn create_pool_with_config(config: &PgHostConfig) -> TableResult<Pool> {
    let max_size = config.max_size;
    create_pool_with_manager_config(
        &config.database_url,
        NoTls,
        default_manager_config(),
        |builder| builder.max_size(max_size),
    )
}

/// Pool with a custom TLS connector, manager config and pool tuning.
pub fn create_pool_with_manager_config<T>(
    database_url: &str,
    tls: T,
    manager_config: ManagerConfig,
    configure_pool: impl FnOnce(PoolBuilder) -> PoolBuilder,
) -> TableResult<Pool>
where
    T: MakeTlsConnect<Socket> + Clone + Sync + Send + 'static,
    T::Stream: Sync + Send,
    T::TlsConnect: Sync + Send,
    <T::TlsConnect as TlsConnect<Socket>>::Future: Send,
{
    let pg_config: tokio_postgres::Config = database_url
        .parse()
        .map_err(|e: tokio_postgres::Error| TableError::Connection(e.to_string()))?;

    let manager = Manager::from_config(pg_config, tls, manager_config);
    configure_pool(Pool::builder(manager))
        .build()
        .map_err(|e| TableError::Pool(e.to_string()))
}

fn default_manager_config() -> ManagerConfig {
    ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    }
}
