//! # uc-infra
//!
//! Concrete adapters for the ports `uc-core` declares: SQLite-backed
//! persistence (history store, device registry, group membership),
//! configuration loading, and the `tracing`-backed logger.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;

pub use clock::SystemClock;
pub use db::executor::{DbExecutor, PooledExecutor};
pub use db::pool::{init_db_pool, DbPool, StoreLock};
pub use db::repositories::{SqliteDeviceRepository, SqliteGroupRepository, SqliteHistoryStore};
pub use logging::TracingLogger;
