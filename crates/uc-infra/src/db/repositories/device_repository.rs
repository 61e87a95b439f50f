use chrono::TimeZone;
use diesel::prelude::*;
use tracing::debug_span;

use uc_core::device::{Device, DeviceId};
use uc_core::ports::device_repository::DeviceRepositoryPort;
use uc_core::ports::errors::{CoreError, ErrorKind};

use crate::db::executor::DbExecutor;
use crate::db::models::{DeviceRow, NewDeviceRow};
use crate::db::schema::device;

pub struct SqliteDeviceRepository<E> {
    executor: E,
}

impl<E> SqliteDeviceRepository<E>
where
    E: DbExecutor,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }
}

#[async_trait::async_trait]
impl<E> DeviceRepositoryPort for SqliteDeviceRepository<E>
where
    E: DbExecutor,
{
    async fn get_or_create(&self, device_id: DeviceId, device_name: &str) -> Result<Device, CoreError> {
        let span = debug_span!("infra.sqlite.get_or_create_device", device_id = %device_id);
        let _enter = span.enter();

        let device_name = device_name.to_string();
        self.executor
            .run(move |conn| {
                let id_str = device_id.to_string();
                let existing = device::table
                    .find(&id_str)
                    .first::<DeviceRow>(conn)
                    .optional()
                    .map_err(|e| CoreError::new(ErrorKind::Transient, "store", format!("device lookup failed: {e}")))?;

                if let Some(row) = existing {
                    return row_to_device(row);
                }

                let now = chrono::Utc::now().timestamp_millis();
                let new_row = NewDeviceRow {
                    device_id: &id_str,
                    device_name: &device_name,
                    first_seen_ms: now,
                    last_seen_ms: now,
                };
                diesel::insert_into(device::table)
                    .values(&new_row)
                    .execute(conn)
                    .map_err(|e| CoreError::new(ErrorKind::Transient, "store", format!("device insert failed: {e}")))?;

                row_to_device(DeviceRow {
                    device_id: id_str,
                    device_name,
                    first_seen_ms: now,
                    last_seen_ms: now,
                })
            })
            .await
    }

    async fn touch(&self, device_id: DeviceId) -> Result<(), CoreError> {
        self.executor
            .run(move |conn| {
                let id_str = device_id.to_string();
                let now = chrono::Utc::now().timestamp_millis();
                diesel::update(device::table.find(&id_str))
                    .set(device::last_seen_ms.eq(now))
                    .execute(conn)
                    .map_err(|e| CoreError::new(ErrorKind::Transient, "store", format!("device touch failed: {e}")))?;
                Ok(())
            })
            .await
    }
}

fn row_to_device(row: DeviceRow) -> Result<Device, CoreError> {
    let device_id: DeviceId = row
        .device_id
        .parse()
        .map_err(|e| CoreError::new(ErrorKind::Fatal, "store", format!("corrupt device_id: {e}")))?;
    let first_seen = chrono::Utc
        .timestamp_millis_opt(row.first_seen_ms)
        .single()
        .ok_or_else(|| CoreError::new(ErrorKind::Fatal, "store", "corrupt first_seen_ms"))?;
    let last_seen = chrono::Utc
        .timestamp_millis_opt(row.last_seen_ms)
        .single()
        .ok_or_else(|| CoreError::new(ErrorKind::Fatal, "store", "corrupt last_seen_ms"))?;

    Ok(Device {
        device_id,
        device_name: row.device_name,
        first_seen,
        last_seen,
    })
}
