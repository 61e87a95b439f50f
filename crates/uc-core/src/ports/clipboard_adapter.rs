//! The clipboard adapter port (spec.md §4.A): a capability-boundary wrapper
//! around the OS clipboard. Concrete implementations (`uc-platform`) must
//! not leak OS-specific handles across this interface.

use async_trait::async_trait;

use crate::clipboard::ContentType;
use crate::ports::errors::CoreError;

/// Opaque token identifying a clipboard generation. Implementations may back
/// this with a native change counter or a content hash; callers must treat
/// it as opaque.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChangeToken(pub String);

pub struct ClipboardRead {
    pub data: Vec<u8>,
    pub mime_hints: Vec<String>,
    pub change_token: ChangeToken,
}

#[async_trait]
pub trait ClipboardAdapterPort: Send + Sync {
    /// Reads the current selection. Fails with `Unavailable` if there is no
    /// selection, `Transient` on recoverable OS errors.
    async fn read(&self) -> Result<ClipboardRead, CoreError>;

    /// Replaces the system selection. Fails with `Unsupported` for content
    /// types the OS selection cannot carry.
    async fn write(&self, data: &[u8], content_type: ContentType) -> Result<(), CoreError>;

    /// Non-blocking: returns `Some(token)` if the OS reports a change since
    /// `previous`, `None` otherwise.
    async fn poll_changed(&self, previous: Option<&ChangeToken>) -> Option<ChangeToken>;
}
