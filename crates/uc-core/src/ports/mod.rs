pub mod clipboard_adapter;
pub mod clock;
pub mod device_repository;
pub mod errors;
pub mod group_repository;
pub mod history_store;
pub mod logger;
pub mod publisher;
pub mod sync_filter;

pub use clipboard_adapter::{ChangeToken, ClipboardAdapterPort, ClipboardRead};
pub use clock::ClockPort;
pub use device_repository::DeviceRepositoryPort;
pub use errors::{CoreError, ErrorKind};
pub use group_repository::GroupRepositoryPort;
pub use history_store::{FlushStats, HistoryStorePort, PutOutcome};
pub use logger::{LogLevel, LoggerPort, NullLogger};
pub use publisher::{InboundHandler, PublisherPort};
