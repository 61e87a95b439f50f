//! # uc-core
//!
//! Core domain models, value objects and port traits for the clipman daemon.
//!
//! This crate contains pure business logic without any infrastructure
//! dependencies: no filesystem, no database, no sockets. Everything that
//! touches the outside world is expressed here only as a trait (a "port")
//! and implemented in `uc-infra`, `uc-platform`, or `uc-network`.

pub mod clipboard;
pub mod config;
pub mod device;
pub mod ids;
pub mod ports;
pub mod sync;

pub use clipboard::{ClipboardContent, ContentHash, ContentType};
pub use config::AppConfig;
pub use device::{Device, DeviceId};
pub use ports::errors::{CoreError, ErrorKind};
