use std::time::{Duration, Instant};

use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use fs2::FileExt;
use tracing::info;
use uc_core::ports::errors::{CoreError, ErrorKind};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub type DbPool = Pool<ConnectionManager<SqliteConnection>>;

const LOCK_TIMEOUT: Duration = Duration::from_millis(500);

/// Builds the connection pool and runs pending migrations. Call once at
/// startup, after the exclusive file lock on `db_file` has been acquired.
pub fn init_db_pool(database_url: &str) -> Result<DbPool, CoreError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);

    let pool = Pool::builder().build(manager).map_err(|e| {
        CoreError::new(ErrorKind::Fatal, "store", format!("failed to build connection pool: {e}"))
    })?;

    run_migrations(&pool)?;
    Ok(pool)
}

fn run_migrations(pool: &DbPool) -> Result<(), CoreError> {
    let mut conn = pool
        .get()
        .map_err(|e| CoreError::new(ErrorKind::Fatal, "store", format!("no pooled connection: {e}")))?;

    info!("running database migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| CoreError::new(ErrorKind::Fatal, "store", format!("migration failed: {e}")))?;
    Ok(())
}

/// Acquires an exclusive advisory lock on the sidecar `<db_file>.lock` file,
/// spec.md §4.C: open fails with `Locked` if the lock is not obtained within
/// 500 ms. Held for the lifetime of the returned guard.
pub struct StoreLock {
    file: std::fs::File,
}

impl StoreLock {
    pub fn acquire(db_file: &std::path::Path) -> Result<Self, CoreError> {
        if let Some(parent) = db_file.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CoreError::new(ErrorKind::Fatal, "store", format!("cannot create data dir: {e}"))
            })?;
        }
        let lock_path = db_file.with_extension("db.lock");
        let file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .open(&lock_path)
            .map_err(|e| CoreError::new(ErrorKind::Fatal, "store", format!("cannot open lock file: {e}")))?;

        let deadline = Instant::now() + LOCK_TIMEOUT;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => return Ok(Self { file }),
                Err(_) if Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(_) => {
                    return Err(CoreError::new(
                        ErrorKind::Locked,
                        "store",
                        "could not acquire exclusive lock on database within 500ms",
                    ))
                }
            }
        }
    }
}

impl Drop for StoreLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}
