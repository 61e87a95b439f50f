//! [`ClipboardAdapterPort`] implementation over `clipboard-rs`, grounded in
//! the teacher's `clipboard/common.rs` (per-format read/write dispatch) and
//! `clipboard/platform/linux.rs` (`Arc<Mutex<ClipboardContext>>`,
//! `tracing::debug_span!` per call, poisoned-mutex handling). The teacher
//! keeps one representation per format; this daemon's data model (spec.md
//! §3) carries exactly one representation per observation, so `read`/`write`
//! collapse the teacher's multi-representation snapshot to a single
//! `(bytes, mime_hints)` pair instead of a `Vec`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use clipboard_rs::{Clipboard, ClipboardContext, ContentFormat, RustImageData};
use tracing::{debug, debug_span, error};

use uc_core::clipboard::ContentType;
use uc_core::ports::clipboard_adapter::{ChangeToken, ClipboardAdapterPort, ClipboardRead};
use uc_core::ports::errors::{CoreError, ErrorKind};

pub struct SystemClipboardAdapter {
    ctx: Arc<Mutex<ClipboardContext>>,
    stealth_mode: bool,
}

impl SystemClipboardAdapter {
    pub fn new(stealth_mode: bool) -> Result<Self, CoreError> {
        let context = ClipboardContext::new()
            .map_err(|e| CoreError::new(ErrorKind::Fatal, "clipboard", format!("failed to open clipboard: {e}")))?;
        Ok(Self {
            ctx: Arc::new(Mutex::new(context)),
            stealth_mode,
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, ClipboardContext>, CoreError> {
        self.ctx.lock().map_err(|poison| {
            error!("clipboard context mutex poisoned");
            CoreError::new(ErrorKind::Fatal, "clipboard", format!("mutex poisoned: {poison}"))
        })
    }

    /// A cheap fingerprint of what's on the clipboard right now, used by
    /// `poll_changed` as the change-counter fallback spec.md §4.A allows
    /// when the OS exposes no native generation counter. In stealth mode
    /// (spec.md §4.E) this never reads content, only format presence, since
    /// some platforms raise a user-visible notification on a content read;
    /// a format-presence flip is still enough to detect most changes, just
    /// not an edit that keeps the same formats (e.g. retyping the same
    /// selection).
    fn fingerprint(&self) -> Result<String, CoreError> {
        let ctx = self.lock()?;
        let mut hasher = blake3::Hasher::new();
        for fmt in [
            ContentFormat::Text,
            ContentFormat::Rtf,
            ContentFormat::Html,
            ContentFormat::Files,
            ContentFormat::Image,
        ] {
            hasher.update(&[ctx.has(fmt) as u8]);
        }
        if !self.stealth_mode && ctx.has(ContentFormat::Text) {
            if let Ok(text) = ctx.get_text() {
                hasher.update(text.as_bytes());
            }
        }
        Ok(hasher.finalize().to_hex().to_string())
    }
}

#[async_trait]
impl ClipboardAdapterPort for SystemClipboardAdapter {
    async fn read(&self) -> Result<ClipboardRead, CoreError> {
        let span = debug_span!("platform.clipboard.read");
        let _enter = span.enter();

        let ctx = self.lock()?;

        let mut mime_hints = Vec::new();
        if ctx.has(ContentFormat::Image) {
            mime_hints.push("image/png".to_string());
        }
        if ctx.has(ContentFormat::Html) {
            mime_hints.push("text/html".to_string());
        }
        if ctx.has(ContentFormat::Rtf) {
            mime_hints.push("text/rtf".to_string());
        }
        if ctx.has(ContentFormat::Files) {
            mime_hints.push("text/uri-list".to_string());
        }
        if ctx.has(ContentFormat::Text) {
            mime_hints.push("text/plain".to_string());
        }

        if mime_hints.is_empty() {
            return Err(CoreError::new(ErrorKind::Unavailable, "clipboard", "no selection present"));
        }

        let data = if ctx.has(ContentFormat::Files) {
            let files = ctx
                .get_files()
                .map_err(|e| CoreError::new(ErrorKind::Transient, "clipboard", format!("get_files failed: {e}")))?;
            serde_json::to_vec(&files)
                .map_err(|e| CoreError::new(ErrorKind::Fatal, "clipboard", format!("file list encode failed: {e}")))?
        } else if ctx.has(ContentFormat::Image) {
            let img = ctx
                .get_image()
                .map_err(|e| CoreError::new(ErrorKind::Transient, "clipboard", format!("get_image failed: {e}")))?;
            img.to_png()
                .map_err(|e| CoreError::new(ErrorKind::Transient, "clipboard", format!("png encode failed: {e}")))?
                .get_bytes()
                .to_vec()
        } else if ctx.has(ContentFormat::Html) {
            ctx.get_html()
                .map_err(|e| CoreError::new(ErrorKind::Transient, "clipboard", format!("get_html failed: {e}")))?
                .into_bytes()
        } else if ctx.has(ContentFormat::Rtf) {
            ctx.get_rich_text()
                .map_err(|e| CoreError::new(ErrorKind::Transient, "clipboard", format!("get_rich_text failed: {e}")))?
                .into_bytes()
        } else {
            ctx.get_text()
                .map_err(|e| CoreError::new(ErrorKind::Transient, "clipboard", format!("get_text failed: {e}")))?
                .into_bytes()
        };

        debug!(bytes = data.len(), hints = ?mime_hints, "read clipboard selection");

        let change_token = ChangeToken(blake3::hash(&data).to_hex().to_string());
        Ok(ClipboardRead { data, mime_hints, change_token })
    }

    async fn write(&self, data: &[u8], content_type: ContentType) -> Result<(), CoreError> {
        let span = debug_span!("platform.clipboard.write", content_type = %content_type);
        let _enter = span.enter();

        let mut ctx = self.lock()?;
        match content_type {
            ContentType::Text | ContentType::String | ContentType::Url | ContentType::Filepath => {
                let text = String::from_utf8(data.to_vec())
                    .map_err(|e| CoreError::new(ErrorKind::InvalidArgument, "clipboard", format!("not valid UTF-8: {e}")))?;
                ctx.set_text(text)
                    .map_err(|e| CoreError::new(ErrorKind::Transient, "clipboard", format!("set_text failed: {e}")))?;
            }
            ContentType::Html => {
                let html = String::from_utf8(data.to_vec())
                    .map_err(|e| CoreError::new(ErrorKind::InvalidArgument, "clipboard", format!("not valid UTF-8: {e}")))?;
                ctx.set_html(html)
                    .map_err(|e| CoreError::new(ErrorKind::Transient, "clipboard", format!("set_html failed: {e}")))?;
            }
            ContentType::Rtf => {
                let rtf = String::from_utf8(data.to_vec())
                    .map_err(|e| CoreError::new(ErrorKind::InvalidArgument, "clipboard", format!("not valid UTF-8: {e}")))?;
                ctx.set_rich_text(rtf)
                    .map_err(|e| CoreError::new(ErrorKind::Transient, "clipboard", format!("set_rich_text failed: {e}")))?;
            }
            ContentType::File => {
                let paths: Vec<String> = serde_json::from_slice(data)
                    .map_err(|e| CoreError::new(ErrorKind::InvalidArgument, "clipboard", format!("not a JSON path list: {e}")))?;
                ctx.set_files(paths)
                    .map_err(|e| CoreError::new(ErrorKind::Transient, "clipboard", format!("set_files failed: {e}")))?;
            }
            ContentType::Image => {
                let img = RustImageData::from_png(data.to_vec())
                    .map_err(|e| CoreError::new(ErrorKind::InvalidArgument, "clipboard", format!("not a decodable PNG: {e}")))?;
                ctx.set_image(img)
                    .map_err(|e| CoreError::new(ErrorKind::Transient, "clipboard", format!("set_image failed: {e}")))?;
            }
            ContentType::Unknown => {
                return Err(CoreError::new(
                    ErrorKind::Unsupported,
                    "clipboard",
                    "cannot write unknown content type to the system selection",
                ));
            }
        }
        Ok(())
    }

    async fn poll_changed(&self, previous: Option<&ChangeToken>) -> Option<ChangeToken> {
        let current = match self.fingerprint() {
            Ok(fp) => ChangeToken(fp),
            Err(_) => return None,
        };
        match previous {
            Some(prev) if prev.0 == current.0 => None,
            _ => Some(current),
        }
    }
}
