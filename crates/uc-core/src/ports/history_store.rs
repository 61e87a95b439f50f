//! The history store port (spec.md §4.C).

use async_trait::async_trait;

use crate::clipboard::{ClipboardContent, ContentHash, ListOpts};
use crate::ports::errors::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Inserted,
    /// `hash` was already present; `created` was bumped to the newer of the
    /// two observations.
    Duplicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlushStats {
    pub freed_bytes: u64,
    pub before: u64,
    pub after: u64,
}

#[async_trait]
pub trait HistoryStorePort: Send + Sync {
    /// Inserts if `hash` is absent; if present, updates `created` to the
    /// newer of the two and returns `Duplicate`. Atomic: on failure the
    /// store is unchanged. Triggers eviction as a side effect (spec.md §4.C).
    async fn put(&self, content: ClipboardContent) -> Result<PutOutcome, CoreError>;

    async fn get(&self, hash: &ContentHash) -> Result<Option<ClipboardContent>, CoreError>;

    /// Finite, non-restartable sequence in `by_time` order (or reversed).
    async fn list(&self, opts: ListOpts) -> Result<Vec<ClipboardContent>, CoreError>;

    /// Constant-time read of the most recently inserted record.
    async fn latest(&self) -> Result<Option<ClipboardContent>, CoreError>;

    async fn delete(&self, hash: &ContentHash) -> Result<bool, CoreError>;

    async fn delete_matching(&self, opts: ListOpts) -> Result<usize, CoreError>;

    /// Eviction pass: retains the `keep_items` most-recent records and
    /// deletes the rest, subject to the 0.9x-max_size stop condition
    /// (spec.md §4.C "Eviction algorithm").
    async fn flush(&self, keep_items: usize) -> Result<FlushStats, CoreError>;

    async fn cache_size(&self) -> Result<u64, CoreError>;
}
