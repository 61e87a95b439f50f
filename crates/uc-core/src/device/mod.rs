//! Device records (spec.md §3): created on first startup if absent,
//! `last_seen` updated at each successful publish/subscribe.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use crate::ids::DeviceId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub device_id: DeviceId,
    pub device_name: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

impl Device {
    pub fn new(device_id: DeviceId, device_name: String, now: DateTime<Utc>) -> Self {
        Self {
            device_id,
            device_name,
            first_seen: now,
            last_seen: now,
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_seen = now;
    }
}
