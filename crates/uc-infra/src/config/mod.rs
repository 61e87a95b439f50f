//! Configuration loading (spec.md §1 "out of scope: configuration file
//! format", §6 environment variables). The core receives a fully-populated
//! [`AppConfig`]; this module is the one piece responsible for producing it
//! from a TOML file plus environment overrides, grounded in the teacher's
//! per-subsystem `*Config::defaults()` convention.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;
use uc_core::config::{AppConfig, IpcConfig, MonitorConfig, PathsConfig, StorageConfig, SyncConfig};
use uc_core::ids::DeviceId;
use uc_core::ports::errors::{CoreError, ErrorKind};

const CONFIG_ENV: &str = "CLIPMAN_CONFIG";
const DATA_DIR_ENV: &str = "CLIPMAN_DATA_DIR";

/// Mirrors [`AppConfig`] but every field is optional so a partial or absent
/// TOML file still deserializes; absent fields fall back to the per-section
/// `Default` impls in `uc_core::config`.
#[derive(Debug, Default, Deserialize)]
struct RawAppConfig {
    device_id: Option<String>,
    device_name: Option<String>,
    #[serde(default)]
    storage: RawStorageConfig,
    #[serde(default)]
    sync: RawSyncConfig,
    #[serde(default)]
    monitor: RawMonitorConfig,
    #[serde(default)]
    ipc: RawIpcConfig,
    #[serde(default)]
    paths: RawPathsConfig,
}

#[derive(Debug, Default, Deserialize)]
struct RawStorageConfig {
    max_size: Option<u64>,
    keep_items: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct RawSyncConfig {
    enabled: Option<bool>,
    default_group: Option<String>,
    max_item_size: Option<u64>,
    allowed_types: Option<Vec<uc_core::ContentType>>,
    excluded_types: Option<Vec<uc_core::ContentType>>,
    include_patterns: Option<Vec<String>>,
    exclude_patterns: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMonitorConfig {
    polling_interval_ms: Option<u64>,
    stealth_mode: Option<bool>,
    apply_inbound: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct RawIpcConfig {
    socket_path: Option<PathBuf>,
    handler_pool: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPathsConfig {
    db_file: Option<PathBuf>,
    log_dir: Option<PathBuf>,
    run_dir: Option<PathBuf>,
}

/// Resolves the config file path: `explicit` argument, then `CLIPMAN_CONFIG`,
/// then `<data_dir>/config.toml`.
pub fn resolve_config_path(explicit: Option<PathBuf>, data_dir: &Path) -> PathBuf {
    explicit
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
        .unwrap_or_else(|| data_dir.join("config.toml"))
}

/// Resolves the data directory: `CLIPMAN_DATA_DIR`, then the platform's
/// per-user data directory joined with `clipman`.
pub fn resolve_data_dir() -> PathBuf {
    std::env::var_os(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| dirs::data_dir().unwrap_or_else(std::env::temp_dir).join("clipman"))
}

/// Loads configuration from `config_path` (if present) layered with
/// `CLIPMAN_*` environment overrides, then fills every field the file left
/// unset with the per-section defaults and path conventions anchored at
/// `data_dir`.
pub fn load(config_path: &Path, data_dir: &Path) -> Result<AppConfig, CoreError> {
    let builder = Config::builder()
        .add_source(File::from(config_path).required(false))
        .add_source(Environment::with_prefix("CLIPMAN").separator("__"));

    let built = builder
        .build()
        .map_err(|e| CoreError::new(ErrorKind::InvalidArgument, "config", format!("failed to read configuration: {e}")))?;

    let raw: RawAppConfig = built
        .try_deserialize()
        .map_err(|e| CoreError::new(ErrorKind::InvalidArgument, "config", format!("invalid configuration: {e}")))?;

    Ok(materialize(raw, data_dir))
}

/// The configuration `clipman config reset` writes back: every section at
/// its built-in default, with `device_id`/`device_name` freshly generated
/// exactly as an absent file would produce them.
pub fn defaults(data_dir: &Path) -> AppConfig {
    materialize(RawAppConfig::default(), data_dir)
}

fn materialize(raw: RawAppConfig, data_dir: &Path) -> AppConfig {
    let storage_defaults = StorageConfig::default();
    let sync_defaults = SyncConfig::default();
    let monitor_defaults = MonitorConfig::default();

    let device_id = raw
        .device_id
        .and_then(|s| s.parse::<DeviceId>().ok())
        .unwrap_or_default();
    let device_name = raw.device_name.unwrap_or_else(default_device_name);

    AppConfig {
        device_id,
        device_name,
        storage: StorageConfig {
            max_size: raw.storage.max_size.unwrap_or(storage_defaults.max_size),
            keep_items: raw.storage.keep_items.unwrap_or(storage_defaults.keep_items),
        },
        sync: SyncConfig {
            enabled: raw.sync.enabled.unwrap_or(sync_defaults.enabled),
            default_group: raw.sync.default_group.unwrap_or(sync_defaults.default_group),
            max_item_size: raw.sync.max_item_size.unwrap_or(sync_defaults.max_item_size),
            allowed_types: raw.sync.allowed_types,
            excluded_types: raw.sync.excluded_types.unwrap_or_default(),
            include_patterns: raw.sync.include_patterns.unwrap_or_default(),
            exclude_patterns: raw.sync.exclude_patterns.unwrap_or_default(),
        },
        monitor: MonitorConfig {
            polling_interval_ms: raw.monitor.polling_interval_ms.unwrap_or(monitor_defaults.polling_interval_ms),
            stealth_mode: raw.monitor.stealth_mode.unwrap_or(monitor_defaults.stealth_mode),
            apply_inbound: raw.monitor.apply_inbound.unwrap_or(monitor_defaults.apply_inbound),
        },
        ipc: IpcConfig {
            socket_path: raw.ipc.socket_path.unwrap_or_else(|| default_socket_path(data_dir)),
            handler_pool: raw.ipc.handler_pool.unwrap_or(8),
        },
        paths: PathsConfig {
            db_file: raw.paths.db_file.unwrap_or_else(|| data_dir.join("clipman.db")),
            log_dir: raw.paths.log_dir.unwrap_or_else(|| data_dir.join("log")),
            run_dir: raw.paths.run_dir.unwrap_or_else(|| data_dir.join("run")),
        },
    }
}

fn default_device_name() -> String {
    hostname_or_fallback()
}

fn hostname_or_fallback() -> String {
    std::env::var("HOSTNAME")
        .or_else(|_| std::env::var("COMPUTERNAME"))
        .unwrap_or_else(|_| "unknown-device".to_string())
}

#[cfg(unix)]
fn default_socket_path(data_dir: &Path) -> PathBuf {
    std::env::var_os("XDG_RUNTIME_DIR")
        .map(|d| PathBuf::from(d).join("clipman").join("clipman.sock"))
        .unwrap_or_else(|| data_dir.join("run").join("clipman.sock"))
}

#[cfg(not(unix))]
fn default_socket_path(_data_dir: &Path) -> PathBuf {
    PathBuf::from(r"\\.\pipe\clipman")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_absent_file_yields_full_defaults() {
        let data_dir = std::env::temp_dir().join("clipman-config-test");
        let cfg = load(&data_dir.join("missing-config.toml"), &data_dir).unwrap();
        assert_eq!(cfg.storage.keep_items, 200);
        assert!(!cfg.sync.enabled);
        assert_eq!(cfg.monitor.polling_interval_ms, 500);
        assert_eq!(cfg.paths.db_file, data_dir.join("clipman.db"));
    }

    #[test]
    fn resolve_config_path_prefers_explicit_argument() {
        let data_dir = PathBuf::from("/tmp/clipman-data");
        let explicit = PathBuf::from("/etc/clipman/custom.toml");
        assert_eq!(resolve_config_path(Some(explicit.clone()), &data_dir), explicit);
    }
}
