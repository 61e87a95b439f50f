//! # uc-platform
//!
//! OS-facing adapters: the system clipboard ([`ClipboardAdapterPort`]),
//! single-instance PID locking, and platform daemonization.

pub mod clipboard;
pub mod daemon;

pub use clipboard::SystemClipboardAdapter;
