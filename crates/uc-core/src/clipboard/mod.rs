pub mod classifier;
pub mod content;
pub mod list_opts;

pub use classifier::{classify, MimeHint};
pub use content::{ClipboardContent, ContentHash, ContentType};
pub use list_opts::ListOpts;
