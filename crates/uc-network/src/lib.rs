//! # uc-network
//!
//! The pluggable sync transport (spec.md §4.D): [`NoopPublisher`] for
//! `sync.enabled = false`, and [`GroupPublisher`] for LAN peer-to-peer
//! exchange over libp2p. Both implement the same `PublisherPort`; the rest
//! of the daemon never branches on which one is active.

mod behaviour;
mod dedup;
mod group_publisher;
mod noop;
mod swarm;
mod transport;
mod wire;

pub use group_publisher::GroupPublisher;
pub use noop::NoopPublisher;
pub use wire::{ClipboardEnvelope, SyncAck};
