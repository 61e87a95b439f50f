//! Application configuration domain model (spec.md §3).
//!
//! This is read-only to the core after startup. The on-disk format and
//! layout are external collaborators (spec.md §1); `uc-infra::config` is
//! responsible for producing a populated `AppConfig` from whatever file the
//! CLI front-end points it at.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::clipboard::ContentType;
use crate::ids::DeviceId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub device_id: DeviceId,
    pub device_name: String,

    pub storage: StorageConfig,
    pub sync: SyncConfig,
    pub monitor: MonitorConfig,
    pub ipc: IpcConfig,
    pub paths: PathsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Live-byte cap that triggers eviction.
    pub max_size: u64,
    /// Floor count of most-recent records eviction always preserves.
    pub keep_items: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub enabled: bool,
    pub default_group: String,
    pub max_item_size: u64,
    #[serde(default)]
    pub allowed_types: Option<Vec<ContentType>>,
    #[serde(default)]
    pub excluded_types: Vec<ContentType>,
    #[serde(default)]
    pub include_patterns: Vec<String>,
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    pub polling_interval_ms: u64,
    #[serde(default)]
    pub stealth_mode: bool,
    /// Whether inbound sync events are written back to the OS clipboard.
    #[serde(default = "default_apply_inbound")]
    pub apply_inbound: bool,
}

fn default_apply_inbound() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpcConfig {
    pub socket_path: PathBuf,
    #[serde(default = "default_handler_pool")]
    pub handler_pool: usize,
}

fn default_handler_pool() -> usize {
    8
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub db_file: PathBuf,
    pub log_dir: PathBuf,
    pub run_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            max_size: 64 * 1024 * 1024,
            keep_items: 200,
        }
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            default_group: "default".to_string(),
            max_item_size: 4 * 1024 * 1024,
            allowed_types: None,
            excluded_types: Vec::new(),
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            polling_interval_ms: 500,
            stealth_mode: false,
            apply_inbound: true,
        }
    }
}
