use async_trait::async_trait;

use crate::device::{Device, DeviceId};
use crate::ports::errors::CoreError;

#[async_trait]
pub trait DeviceRepositoryPort: Send + Sync {
    /// Creates the local device record on first startup if absent; returns
    /// the existing record otherwise.
    async fn get_or_create(&self, device_id: DeviceId, device_name: &str) -> Result<Device, CoreError>;

    async fn touch(&self, device_id: DeviceId) -> Result<(), CoreError>;
}
