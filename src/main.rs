//! `clipmand`: the cross-device clipboard manager daemon and its own CLI
//! front-end (spec.md §6). `daemon start` assembles a real [`AppDeps`] from
//! the concrete adapters in `uc-infra`/`uc-platform`/`uc-network` and hands
//! it to [`uc_app::supervisor::run`]; every other subcommand is a thin IPC
//! client that forwards one request to the already-running daemon.

mod cli;
mod ipc_client;

use std::io::Read;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use serde_json::{json, Value};
use tracing::{error, info};

use cli::{Cli, ClipAction, Command, ConfigAction, DaemonAction, HistoryAction, SyncAction};
use uc_app::AppDeps;
use uc_core::config::AppConfig;
use uc_core::ports::errors::ErrorKind;
use uc_core::ports::PublisherPort;

const EXIT_OK: u8 = 0;
const EXIT_ERROR: u8 = 1;
const EXIT_NOT_RUNNING: u8 = 3;
const EXIT_ALREADY_RUNNING: u8 = 4;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("failed to start the async runtime: {e}");
            return ExitCode::from(EXIT_ERROR);
        }
    };

    runtime.block_on(run(cli))
}

async fn run(cli: Cli) -> ExitCode {
    let data_dir = cli.data_dir.clone().unwrap_or_else(uc_infra::config::resolve_data_dir);
    let config_path = uc_infra::config::resolve_config_path(cli.config.clone(), &data_dir);

    // `config` subcommands operate on the file directly rather than a
    // pre-validated `AppConfig`, since `validate` must still run when the
    // file is malformed and `show`/`reset` must still work when it's absent.
    if let Command::Config { action } = cli.command {
        return run_config(action, &config_path, &data_dir).await;
    }

    let config = match uc_infra::config::load(&config_path, &data_dir) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("config: {e}");
            return ExitCode::from(EXIT_ERROR);
        }
    };

    match cli.command {
        Command::Daemon { action } => run_daemon(action, config).await,
        Command::Clip { action } => run_clip(action, &config).await,
        Command::History { action } => run_history(action, &config).await,
        Command::Sync { action } => run_sync(action, &config).await,
        Command::Config { .. } => unreachable!("handled above"),
    }
}

async fn run_config(action: ConfigAction, config_path: &Path, data_dir: &Path) -> ExitCode {
    match action {
        ConfigAction::Show => match uc_infra::config::load(config_path, data_dir) {
            Ok(config) => match toml::to_string_pretty(&config) {
                Ok(text) => {
                    print!("{text}");
                    ExitCode::from(EXIT_OK)
                }
                Err(e) => {
                    eprintln!("config: failed to render configuration: {e}");
                    ExitCode::from(EXIT_ERROR)
                }
            },
            Err(e) => {
                eprintln!("config: {e}");
                ExitCode::from(EXIT_ERROR)
            }
        },
        ConfigAction::Validate => match uc_infra::config::load(config_path, data_dir) {
            Ok(_) => {
                println!("{} is valid", config_path.display());
                ExitCode::from(EXIT_OK)
            }
            Err(e) => {
                eprintln!("{}: {e}", config_path.display());
                ExitCode::from(EXIT_ERROR)
            }
        },
        ConfigAction::Reset { hard } => {
            let mut fresh = uc_infra::config::defaults(data_dir);
            if !hard {
                if let Ok(current) = uc_infra::config::load(config_path, data_dir) {
                    fresh.device_id = current.device_id;
                    fresh.device_name = current.device_name;
                }
            }
            if let Err(e) = write_config_file(config_path, &fresh) {
                eprintln!("config: {e}");
                return ExitCode::from(EXIT_ERROR);
            }
            println!("wrote defaults to {}", config_path.display());
            ExitCode::from(EXIT_OK)
        }
        ConfigAction::Edit => {
            if !config_path.exists() {
                let fresh = uc_infra::config::defaults(data_dir);
                if let Err(e) = write_config_file(config_path, &fresh) {
                    eprintln!("config: {e}");
                    return ExitCode::from(EXIT_ERROR);
                }
            }
            let editor = std::env::var("VISUAL").or_else(|_| std::env::var("EDITOR")).unwrap_or_else(|_| "vi".to_string());
            match std::process::Command::new(&editor).arg(config_path).status() {
                Ok(status) if status.success() => ExitCode::from(EXIT_OK),
                Ok(status) => {
                    eprintln!("{editor} exited with {status}");
                    ExitCode::from(EXIT_ERROR)
                }
                Err(e) => {
                    eprintln!("failed to launch {editor}: {e}");
                    ExitCode::from(EXIT_ERROR)
                }
            }
        }
    }
}

fn write_config_file(config_path: &Path, config: &AppConfig) -> anyhow::Result<()> {
    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let text = toml::to_string_pretty(config)?;
    std::fs::write(config_path, text)?;
    Ok(())
}

async fn run_daemon(action: DaemonAction, config: AppConfig) -> ExitCode {
    match action {
        DaemonAction::Start { foreground } => start_daemon(config, foreground).await,
        DaemonAction::Stop => stop_daemon(&config).await,
        DaemonAction::Status => status_daemon(&config).await,
        DaemonAction::Restart { foreground } => {
            let _ = stop_daemon(&config).await;
            tokio::time::sleep(Duration::from_millis(200)).await;
            start_daemon(config, foreground).await
        }
    }
}

async fn start_daemon(config: AppConfig, foreground: bool) -> ExitCode {
    // On Windows, `daemonize` re-execs this very binary with `CLIPMAN_DAEMON=1`
    // set rather than forking in place; that re-exec must not daemonize
    // itself again. On Unix this is always false at this point, since
    // `daemonize` sets the variable only after it has already forked.
    let already_daemonized = std::env::var_os("CLIPMAN_DAEMON").is_some();
    if !foreground && !already_daemonized {
        if let Err(e) = uc_platform::daemon::daemonize(&config.paths.run_dir, &config.paths.log_dir) {
            eprintln!("daemon: {e}");
            return ExitCode::from(EXIT_ERROR);
        }
    }

    let _log_guard = match uc_infra::logging::init(&config.paths.log_dir, !foreground) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("logging: {e}");
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let pid_file = config.paths.run_dir.join("clipman.pid");
    match uc_platform::daemon::acquire_pid_lock(&pid_file) {
        Ok(outcome) => info!(?outcome, "pid lock acquired"),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            error!(error = %e, "daemon already running");
            return ExitCode::from(EXIT_ALREADY_RUNNING);
        }
        Err(e) => {
            error!(error = %e, "failed to acquire pid lock");
            return ExitCode::from(EXIT_ERROR);
        }
    }

    let result = run_supervised(config).await;
    uc_platform::daemon::release_pid_lock(&pid_file);

    match result {
        Ok(()) => ExitCode::from(EXIT_OK),
        Err(e) => {
            error!(error = %e, "daemon exited with an error");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

/// Wires the concrete adapters into an [`AppDeps`] and runs the supervisor
/// until shutdown. Everything above this function is process-lifecycle
/// concerns (forking, the pid lock, logging); everything below it only
/// knows about port traits.
async fn run_supervised(config: AppConfig) -> anyhow::Result<()> {
    let _store_lock = uc_infra::StoreLock::acquire(&config.paths.db_file)?;
    let db_path = config
        .paths
        .db_file
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("database path is not valid UTF-8"))?;
    let pool = uc_infra::init_db_pool(db_path)?;

    let store = Arc::new(uc_infra::SqliteHistoryStore::new(
        uc_infra::PooledExecutor::new(pool.clone()),
        config.storage.max_size,
        config.storage.keep_items,
    ));
    let devices = Arc::new(uc_infra::SqliteDeviceRepository::new(uc_infra::PooledExecutor::new(pool.clone())));
    let groups = Arc::new(uc_infra::SqliteGroupRepository::new(uc_infra::PooledExecutor::new(pool)));

    let adapter = Arc::new(uc_platform::SystemClipboardAdapter::new(config.monitor.stealth_mode)?);

    let publisher: Arc<dyn PublisherPort> = if config.sync.enabled {
        Arc::new(uc_network::GroupPublisher::spawn(config.sync.clone())?)
    } else {
        Arc::new(uc_network::NoopPublisher::new())
    };

    let deps = AppDeps {
        device_id: config.device_id,
        store,
        adapter,
        publisher,
        devices,
        groups,
        logger: Arc::new(uc_infra::TracingLogger),
        clock: Arc::new(uc_infra::SystemClock),
        config,
    };

    uc_app::supervisor::run(deps).await?;
    Ok(())
}

async fn stop_daemon(config: &AppConfig) -> ExitCode {
    match ipc_client::call(&config.ipc.socket_path, "shutdown", Value::Null).await {
        Ok(response) => {
            if response.status != uc_app::ipc::Status::Ok {
                eprintln!("daemon: {}", response.message.as_deref().unwrap_or("shutdown failed"));
                return ExitCode::from(EXIT_ERROR);
            }
            wait_for_pid_file_removal(&config.paths.run_dir.join("clipman.pid")).await;
            println!("daemon stopped");
            ExitCode::from(EXIT_OK)
        }
        Err(ipc_client::ClientError::NotRunning) => {
            println!("daemon is not running");
            ExitCode::from(EXIT_NOT_RUNNING)
        }
        Err(e) => {
            eprintln!("daemon: {e}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

async fn wait_for_pid_file_removal(pid_file: &Path) {
    for _ in 0..100 {
        if !pid_file.exists() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

async fn status_daemon(config: &AppConfig) -> ExitCode {
    match ipc_client::call(&config.ipc.socket_path, "ping", Value::Null).await {
        Ok(response) if response.status == uc_app::ipc::Status::Ok => {
            println!("daemon is running (socket {})", config.ipc.socket_path.display());
            ExitCode::from(EXIT_OK)
        }
        Ok(response) => {
            eprintln!("daemon responded with an error: {}", response.message.as_deref().unwrap_or("unknown"));
            ExitCode::from(EXIT_ERROR)
        }
        Err(ipc_client::ClientError::NotRunning) => {
            println!("daemon is not running");
            ExitCode::from(EXIT_NOT_RUNNING)
        }
        Err(e) => {
            eprintln!("daemon: {e}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

async fn run_clip(action: ClipAction, config: &AppConfig) -> ExitCode {
    let (command, args) = match action {
        ClipAction::Get => ("clip.get", Value::Null),
        ClipAction::Set(set_args) => {
            let mut data = Vec::new();
            if let Err(e) = std::io::stdin().read_to_end(&mut data) {
                eprintln!("clip set: failed to read stdin: {e}");
                return ExitCode::from(EXIT_ERROR);
            }
            let content_type = set_args.r#type.unwrap_or_else(|| "text".to_string());
            ("clip.set", json!({"data": data, "type": content_type}))
        }
        ClipAction::Flush { keep_last, quiet } => ("flush", json!({"keep_last": keep_last, "quiet": quiet})),
    };
    dispatch(config, command, args).await
}

async fn run_history(action: HistoryAction, config: &AppConfig) -> ExitCode {
    let (command, args) = match action {
        HistoryAction::List { limit, r#type } => ("history.list", json!({"limit": limit, "type": r#type})),
        HistoryAction::Show { hash } => ("history.show", json!({"hash": hash})),
        HistoryAction::Delete { hashes, all, older_than, r#type } => {
            if !hashes.is_empty() {
                ("history.delete", json!({"hashes": hashes}))
            } else if all {
                ("history.delete", json!({"all": true, "older_than": older_than, "type": r#type}))
            } else {
                eprintln!("history delete: pass one or more hashes, or --all");
                return ExitCode::from(2);
            }
        }
        HistoryAction::Stats => ("history.stats", Value::Null),
    };
    dispatch(config, command, args).await
}

async fn run_sync(action: SyncAction, config: &AppConfig) -> ExitCode {
    let (command, args) = match action {
        SyncAction::Status => ("sync.status", Value::Null),
        SyncAction::Join { groups } => ("sync.join", json!({"groups": groups})),
        SyncAction::Leave { groups } => ("sync.leave", json!({"groups": groups})),
        SyncAction::Groups => ("sync.groups", Value::Null),
        SyncAction::Resync => ("sync.resync", Value::Null),
    };
    dispatch(config, command, args).await
}

async fn dispatch(config: &AppConfig, command: &str, args: Value) -> ExitCode {
    match ipc_client::call(&config.ipc.socket_path, command, args).await {
        Ok(response) => {
            let code = ipc_client::exit_code_for(&response);
            match response.status {
                uc_app::ipc::Status::Ok => match response.data {
                    Some(data) => println!("{}", serde_json::to_string_pretty(&data).unwrap_or_default()),
                    None => println!("ok"),
                },
                uc_app::ipc::Status::Error => {
                    eprintln!("{}", response.message.as_deref().unwrap_or("error"));
                }
            }
            ExitCode::from(code)
        }
        Err(ipc_client::ClientError::NotRunning) => {
            eprintln!("daemon is not running");
            ExitCode::from(EXIT_NOT_RUNNING)
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}
