//! Shared `PostgreSQL` plumbing for the diesel-backed adapters.
//!
//! Diesel connections are synchronous, so every adapter runs its queries on
//! the blocking thread pool. The helper here also bounds each call with the
//! configured per-request timeout.

use diesel::pg::PgConnection;
use diesel::r2d2::{ConnectionManager, Pool, PoolError};
use std::time::Duration;
use thiserror::Error;

/// `PostgreSQL` connection pool shared by all adapters.
pub type PgPool = Pool<ConnectionManager<PgConnection>>;

/// Default bound on a single database round trip.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Failures raised by the blocking bridge before the query itself runs.
#[derive(Debug, Error)]
pub enum BlockingError {
    /// No connection could be checked out of the pool.
    #[error("connection pool error: {0}")]
    Pool(#[from] PoolError),

    /// The blocking task panicked or was cancelled.
    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// The call did not finish within the configured bound.
    #[error("database call exceeded {0:?}")]
    Timeout(Duration),
}

/// Builds a connection pool for `database_url`.
///
/// # Errors
///
/// Returns [`PoolError`] when the pool cannot open its initial connections.
pub fn build_pool(database_url: &str, max_size: u32) -> Result<PgPool, PoolError> {
    Pool::builder()
        .max_size(max_size)
        .build(ConnectionManager::<PgConnection>::new(database_url))
}

/// Runs `f` with a pooled connection on the blocking thread pool.
///
/// # Errors
///
/// Returns the error produced by `f`, or a [`BlockingError`] converted into
/// `E` when checkout, the blocking task, or the timeout fails.
pub async fn run_blocking<F, T, E>(pool: &PgPool, timeout: Duration, f: F) -> Result<T, E>
where
    F: FnOnce(&mut PgConnection) -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: From<BlockingError> + Send + 'static,
{
    let pool = pool.clone();
    let handle = tokio::task::spawn_blocking(move || {
        let mut connection = pool.get().map_err(|err| E::from(BlockingError::Pool(err)))?;
        f(&mut connection)
    });

    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_error)) => Err(E::from(BlockingError::Join(join_error))),
        Err(_) => Err(E::from(BlockingError::Timeout(timeout))),
    }
}
