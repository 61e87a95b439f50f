use diesel::SqliteConnection;
use uc_core::ports::errors::{CoreError, ErrorKind};

use crate::db::pool::DbPool;

/// Runs blocking Diesel closures off the async executor. Mirrors the
/// teacher's `DbExecutor` seam so repositories stay storage-agnostic;
/// the pool itself provides the single-writer serialization spec.md §4.C
/// requires (r2d2 hands out one connection per blocking task).
#[async_trait::async_trait]
pub trait DbExecutor: Send + Sync {
    async fn run<T, F>(&self, f: F) -> Result<T, CoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T, CoreError> + Send + 'static;
}

pub struct PooledExecutor {
    pool: DbPool,
}

impl PooledExecutor {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl DbExecutor for PooledExecutor {
    async fn run<T, F>(&self, f: F) -> Result<T, CoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T, CoreError> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| CoreError::new(ErrorKind::Unavailable, "store", format!("pool exhausted: {e}")))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| CoreError::new(ErrorKind::Fatal, "store", format!("executor task panicked: {e}")))?
    }
}
