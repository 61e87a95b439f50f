//! The publisher contract (spec.md §4.D): a pluggable sink for outbound
//! events and source for inbound events, abstracting a sync transport behind
//! a uniform interface. The core never branches on which concrete variant
//! (no-op vs. group) is active.
//!
//! Per the Design Notes, the monitor owns the publisher and calls
//! `publish`/`join`/`leave`; the publisher holds a weak, set-once callback
//! into the monitor for inbound events. There is no shared mutable state
//! between the two directions.

use std::sync::Arc;

use async_trait::async_trait;

use crate::clipboard::ClipboardContent;
use crate::ports::errors::CoreError;

/// Registered once by the monitor; invoked by the publisher for every
/// distinct inbound `(group, hash)` it has not already delivered within the
/// last 30 seconds (spec.md §4.D inbound de-duplication).
pub type InboundHandler = Arc<dyn Fn(String, ClipboardContent) + Send + Sync>;

#[async_trait]
pub trait PublisherPort: Send + Sync {
    /// Best-effort emission. Fails with `NotConnected`→`Unavailable`,
    /// `Filtered`, `TooLarge`, or `Transient`; filtering (spec.md §4.D) is
    /// applied before this returns.
    async fn publish(&self, group: &str, content: &ClipboardContent) -> Result<(), CoreError>;

    async fn join(&self, group: &str) -> Result<(), CoreError>;

    async fn leave(&self, group: &str) -> Result<(), CoreError>;

    async fn list_groups(&self) -> Result<Vec<String>, CoreError>;

    /// Registers the monitor's inbound callback. Implementations call this
    /// at most once; later calls replace the previous handler.
    fn on_inbound(&self, handler: InboundHandler);
}
