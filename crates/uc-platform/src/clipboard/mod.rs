pub mod adapter;

pub use adapter::SystemClipboardAdapter;
