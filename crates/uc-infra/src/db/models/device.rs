use diesel::prelude::*;

use crate::db::schema::device;

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = device)]
#[diesel(primary_key(device_id))]
pub struct DeviceRow {
    pub device_id: String,
    pub device_name: String,
    pub first_seen_ms: i64,
    pub last_seen_ms: i64,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = device)]
pub struct NewDeviceRow<'a> {
    pub device_id: &'a str,
    pub device_name: &'a str,
    pub first_seen_ms: i64,
    pub last_seen_ms: i64,
}
