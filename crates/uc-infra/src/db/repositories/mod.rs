pub mod device_repository;
pub mod group_repository;
pub mod history_store;

pub use device_repository::SqliteDeviceRepository;
pub use group_repository::SqliteGroupRepository;
pub use history_store::SqliteHistoryStore;
