//! Diesel/SQLite-backed [`HistoryStorePort`], grounded in the teacher's
//! `DieselClipboardEntryRepository` (per-query `tracing::debug_span!`,
//! `conn.transaction` for atomicity) but collapsed to a single table since
//! this domain has one flat record type rather than the teacher's
//! entry/event/representation graph.

use chrono::{DateTime, TimeZone, Utc};
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;
use tracing::debug_span;

use uc_core::clipboard::{ClipboardContent, ContentHash, ContentType, ListOpts};
use uc_core::device::DeviceId;
use uc_core::ports::errors::{CoreError, ErrorKind};
use uc_core::ports::history_store::{FlushStats, HistoryStorePort, PutOutcome};

use crate::db::executor::DbExecutor;
use crate::db::models::{ClipboardItemRow, NewClipboardItemRow};
use crate::db::schema::clipboard_item;

pub struct SqliteHistoryStore<E> {
    executor: E,
    max_size: u64,
    keep_items: usize,
}

impl<E> SqliteHistoryStore<E>
where
    E: DbExecutor,
{
    pub fn new(executor: E, max_size: u64, keep_items: usize) -> Self {
        Self { executor, max_size, keep_items }
    }
}

fn row_to_content(row: ClipboardItemRow) -> Result<ClipboardContent, CoreError> {
    let content_type: ContentType = row
        .content_type
        .parse()
        .map_err(|e| CoreError::new(ErrorKind::Fatal, "store", format!("corrupt content_type: {e}")))?;
    let hash = ContentHash::from_hex(&row.hash)
        .map_err(|e| CoreError::new(ErrorKind::Fatal, "store", format!("corrupt hash: {e}")))?;
    let origin_device: DeviceId = row
        .origin_device
        .parse()
        .map_err(|e| CoreError::new(ErrorKind::Fatal, "store", format!("corrupt origin_device: {e}")))?;
    let created = millis_to_datetime(row.created_at_ms)?;

    Ok(ClipboardContent {
        data: row.data,
        content_type,
        created,
        hash,
        origin_device,
    })
}

fn millis_to_datetime(ms: i64) -> Result<DateTime<Utc>, CoreError> {
    Utc.timestamp_millis_opt(ms)
        .single()
        .ok_or_else(|| CoreError::new(ErrorKind::Fatal, "store", "corrupt created_at_ms"))
}

#[async_trait::async_trait]
impl<E> HistoryStorePort for SqliteHistoryStore<E>
where
    E: DbExecutor,
{
    async fn put(&self, content: ClipboardContent) -> Result<PutOutcome, CoreError> {
        let span = debug_span!("infra.sqlite.put", hash = %content.hash);
        let _enter = span.enter();

        let max_size = self.max_size;
        let keep_items = self.keep_items;
        self.executor
            .run(move |conn| {
                conn.transaction::<PutOutcome, diesel::result::Error, _>(|conn| {
                    let hash_hex = content.hash.to_hex();
                    let existing = clipboard_item::table
                        .find(&hash_hex)
                        .first::<ClipboardItemRow>(conn)
                        .optional()?;

                    let outcome = match existing {
                        Some(row) => {
                            let newer = content.created.timestamp_millis().max(row.created_at_ms);
                            diesel::update(clipboard_item::table.find(&hash_hex))
                                .set(clipboard_item::created_at_ms.eq(newer))
                                .execute(conn)?;
                            PutOutcome::Duplicate
                        }
                        None => {
                            let new_row = NewClipboardItemRow {
                                hash: &hash_hex,
                                data: &content.data,
                                content_type: content.content_type.as_str(),
                                created_at_ms: content.created.timestamp_millis(),
                                origin_device: &content.origin_device.to_string(),
                                size_bytes: content.data.len() as i64,
                            };
                            diesel::insert_into(clipboard_item::table)
                                .values(&new_row)
                                .execute(conn)?;
                            PutOutcome::Inserted
                        }
                    };

                    evict_within_transaction(conn, max_size, keep_items)?;
                    Ok(outcome)
                })
                .map_err(|e: diesel::result::Error| {
                    CoreError::new(ErrorKind::Transient, "store", format!("put failed: {e}"))
                })
            })
            .await
    }

    async fn get(&self, hash: &ContentHash) -> Result<Option<ClipboardContent>, CoreError> {
        let hash_hex = hash.to_hex();
        self.executor
            .run(move |conn| {
                let row = clipboard_item::table
                    .find(&hash_hex)
                    .first::<ClipboardItemRow>(conn)
                    .optional()
                    .map_err(|e| CoreError::new(ErrorKind::Transient, "store", format!("get failed: {e}")))?;
                row.map(row_to_content).transpose()
            })
            .await
    }

    async fn list(&self, opts: ListOpts) -> Result<Vec<ClipboardContent>, CoreError> {
        self.executor
            .run(move |conn| {
                let mut query = clipboard_item::table.into_boxed();
                if let Some(since) = opts.since {
                    query = query.filter(clipboard_item::created_at_ms.ge(since.timestamp_millis()));
                }
                if let Some(before) = opts.before {
                    query = query.filter(clipboard_item::created_at_ms.lt(before.timestamp_millis()));
                }
                if let Some(ty) = opts.content_type {
                    query = query.filter(clipboard_item::content_type.eq(ty.as_str()));
                }
                if let Some(min) = opts.min_size {
                    query = query.filter(clipboard_item::size_bytes.ge(min as i64));
                }
                if let Some(max) = opts.max_size {
                    query = query.filter(clipboard_item::size_bytes.le(max as i64));
                }
                query = if opts.reverse {
                    query.order(clipboard_item::created_at_ms.desc())
                } else {
                    query.order(clipboard_item::created_at_ms.asc())
                };
                if let Some(limit) = opts.limit {
                    query = query.limit(limit as i64);
                }

                let rows = query
                    .load::<ClipboardItemRow>(conn)
                    .map_err(|e| CoreError::new(ErrorKind::Transient, "store", format!("list failed: {e}")))?;
                rows.into_iter().map(row_to_content).collect()
            })
            .await
    }

    async fn latest(&self) -> Result<Option<ClipboardContent>, CoreError> {
        self.executor
            .run(|conn| {
                let row = clipboard_item::table
                    .order(clipboard_item::created_at_ms.desc())
                    .first::<ClipboardItemRow>(conn)
                    .optional()
                    .map_err(|e| CoreError::new(ErrorKind::Transient, "store", format!("latest failed: {e}")))?;
                row.map(row_to_content).transpose()
            })
            .await
    }

    async fn delete(&self, hash: &ContentHash) -> Result<bool, CoreError> {
        let hash_hex = hash.to_hex();
        self.executor
            .run(move |conn| {
                let affected = diesel::delete(clipboard_item::table.find(&hash_hex))
                    .execute(conn)
                    .map_err(|e| CoreError::new(ErrorKind::Transient, "store", format!("delete failed: {e}")))?;
                Ok(affected > 0)
            })
            .await
    }

    async fn delete_matching(&self, opts: ListOpts) -> Result<usize, CoreError> {
        self.executor
            .run(move |conn| {
                let mut query = clipboard_item::table.into_boxed();
                if let Some(since) = opts.since {
                    query = query.filter(clipboard_item::created_at_ms.ge(since.timestamp_millis()));
                }
                if let Some(before) = opts.before {
                    query = query.filter(clipboard_item::created_at_ms.lt(before.timestamp_millis()));
                }
                if let Some(ty) = opts.content_type {
                    query = query.filter(clipboard_item::content_type.eq(ty.as_str()));
                }
                if let Some(min) = opts.min_size {
                    query = query.filter(clipboard_item::size_bytes.ge(min as i64));
                }
                if let Some(max) = opts.max_size {
                    query = query.filter(clipboard_item::size_bytes.le(max as i64));
                }

                let matching_hashes: Vec<String> = query
                    .select(clipboard_item::hash)
                    .load(conn)
                    .map_err(|e| CoreError::new(ErrorKind::Transient, "store", format!("delete_matching query failed: {e}")))?;

                diesel::delete(clipboard_item::table.filter(clipboard_item::hash.eq_any(&matching_hashes)))
                    .execute(conn)
                    .map_err(|e| CoreError::new(ErrorKind::Transient, "store", format!("delete_matching failed: {e}")))
            })
            .await
    }

    async fn flush(&self, keep_items: usize) -> Result<FlushStats, CoreError> {
        self.executor
            .run(move |conn| {
                conn.transaction::<FlushStats, diesel::result::Error, _>(|conn| {
                    let before = total_bytes(conn)?;
                    evict_to_keep(conn, keep_items)?;
                    let after = total_bytes(conn)?;
                    Ok(FlushStats {
                        freed_bytes: before.saturating_sub(after),
                        before,
                        after,
                    })
                })
                .map_err(|e| CoreError::new(ErrorKind::Transient, "store", format!("flush failed: {e}")))
            })
            .await
    }

    async fn cache_size(&self) -> Result<u64, CoreError> {
        self.executor
            .run(|conn| {
                total_bytes(conn).map_err(|e| CoreError::new(ErrorKind::Transient, "store", format!("cache_size failed: {e}")))
            })
            .await
    }
}

fn total_bytes(conn: &mut SqliteConnection) -> diesel::result::QueryResult<u64> {
    use diesel::dsl::sum;
    let total: Option<i64> = clipboard_item::table
        .select(sum(clipboard_item::size_bytes))
        .first(conn)?;
    Ok(total.unwrap_or(0).max(0) as u64)
}

/// Eviction pass run inside the transaction that just committed a `put`
/// (spec.md §4.C): delete oldest-by-`created` records until live bytes drop
/// to ≤ 0.9x `max_size`, but never below the `keep_items` floor.
fn evict_within_transaction(
    conn: &mut SqliteConnection,
    max_size: u64,
    keep_items: usize,
) -> diesel::result::QueryResult<()> {
    let live = total_bytes(conn)?;
    if live <= max_size {
        return Ok(());
    }
    let target = (max_size as f64 * 0.9) as u64;
    evict_until(conn, target, keep_items)
}

fn evict_to_keep(conn: &mut SqliteConnection, keep_items: usize) -> diesel::result::QueryResult<()> {
    evict_until(conn, 0, keep_items)
}

/// Shared eviction loop: deletes the oldest record repeatedly until either
/// `target_bytes` live bytes or fewer, or the floor-count of most-recent
/// records (`keep_items`) is hit.
fn evict_until(
    conn: &mut SqliteConnection,
    target_bytes: u64,
    keep_items: usize,
) -> diesel::result::QueryResult<()> {
    loop {
        let count: i64 = clipboard_item::table.count().get_result(conn)?;
        if (count as usize) <= keep_items {
            return Ok(());
        }
        let live = total_bytes(conn)?;
        if live <= target_bytes {
            return Ok(());
        }

        let oldest: Option<String> = clipboard_item::table
            .select(clipboard_item::hash)
            .order(clipboard_item::created_at_ms.asc())
            .first(conn)
            .optional()?;

        match oldest {
            Some(hash) => {
                diesel::delete(clipboard_item::table.find(&hash)).execute(conn)?;
            }
            None => return Ok(()),
        }
    }
}
