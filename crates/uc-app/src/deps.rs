//! `AppDeps`: the explicit context every component is constructed with
//! (spec.md §9 Design Note: "Replace module-level mutable handles with an
//! explicit `CoreContext { config, logger, clock }` passed into every
//! component at construction"). Grounded in the teacher's convention of
//! passing `Arc<dyn Port>` fields into use-case structs rather than reaching
//! for globals — generalized here into one parameter-grouping struct shared
//! by the monitor, the IPC dispatcher, and the supervisor.

use std::sync::Arc;

use uc_core::config::AppConfig;
use uc_core::device::DeviceId;
use uc_core::ports::{
    ClipboardAdapterPort, ClockPort, DeviceRepositoryPort, GroupRepositoryPort, HistoryStorePort,
    LoggerPort, PublisherPort,
};

#[derive(Clone)]
pub struct AppDeps {
    pub config: AppConfig,
    pub device_id: DeviceId,
    pub store: Arc<dyn HistoryStorePort>,
    pub adapter: Arc<dyn ClipboardAdapterPort>,
    pub publisher: Arc<dyn PublisherPort>,
    pub devices: Arc<dyn DeviceRepositoryPort>,
    pub groups: Arc<dyn GroupRepositoryPort>,
    pub logger: Arc<dyn LoggerPort>,
    pub clock: Arc<dyn ClockPort>,
}
