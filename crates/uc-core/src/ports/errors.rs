//! The error-kind taxonomy from spec.md §7, realized as a `thiserror` enum
//! rather than a grab-bag of subsystem-specific error types — grounded in
//! the teacher's `uc-core/src/ports/errors.rs` use of `thiserror::Error`.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    AlreadyExists,
    InvalidArgument,
    Locked,
    Unavailable,
    Transient,
    Fatal,
    Unsupported,
    Timeout,
    Filtered,
    TooLarge,
}

/// A subsystem-tagged error. `message` carries the stable
/// `"store: …" / "sync: …" / "clipboard: …"` prefix spec.md §7 requires on
/// every IPC-visible error.
#[derive(Debug, Error)]
#[error("{subsystem}: {message}")]
pub struct CoreError {
    pub kind: ErrorKind,
    pub subsystem: &'static str,
    pub message: String,
}

impl CoreError {
    pub fn new(kind: ErrorKind, subsystem: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            subsystem,
            message: message.into(),
        }
    }

    pub fn not_found(subsystem: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, subsystem, message)
    }

    pub fn locked(subsystem: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Locked, subsystem, message)
    }

    pub fn invalid_argument(subsystem: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, subsystem, message)
    }

    pub fn too_large(subsystem: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TooLarge, subsystem, message)
    }

    pub fn fatal(subsystem: &'static str, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Fatal, subsystem, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}
