//! # uc-app
//!
//! Application-layer orchestration for the clipman daemon: the explicit
//! dependency bundle ([`deps::AppDeps`]), the clipboard monitor, the local
//! IPC surface, and the supervisor that sequences them and drives
//! shutdown. Nothing in this crate touches a concrete database, OS
//! clipboard API, or network transport directly — it depends only on the
//! port traits from `uc-core`.

pub mod deps;
pub mod ipc;
pub mod monitor;
pub mod supervisor;

pub use deps::AppDeps;
pub use monitor::ClipboardMonitor;
