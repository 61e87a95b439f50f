//! The `clipmand` command surface (spec.md §6 "CLI boundary"). The binary
//! is both the daemon process itself (`daemon start`), a thin client that
//! forwards every `clip`/`history`/`sync` verb to the running daemon's IPC
//! socket, and a standalone editor for the config file under `config` (the
//! daemon doesn't need to be running for those).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "clipmand", version, about = "Cross-device clipboard manager daemon")]
pub struct Cli {
    /// Overrides `CLIPMAN_DATA_DIR`.
    #[arg(long, global = true, env = "CLIPMAN_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Overrides `CLIPMAN_CONFIG`.
    #[arg(long, global = true, env = "CLIPMAN_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Daemon lifecycle: start, stop, status, restart.
    Daemon {
        #[command(subcommand)]
        action: DaemonAction,
    },
    /// Inspect or replace the current clipboard contents.
    Clip {
        #[command(subcommand)]
        action: ClipAction,
    },
    /// Query or prune the clipboard history store.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
    /// Manage sync group membership and transport state.
    Sync {
        #[command(subcommand)]
        action: SyncAction,
    },
    /// Inspect or change the on-disk configuration file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum DaemonAction {
    /// Starts the daemon. Forks into the background unless `--foreground`.
    Start {
        #[arg(long)]
        foreground: bool,
    },
    /// Sends `shutdown` to the running daemon and waits for it to exit.
    Stop,
    /// Reports whether the daemon is running.
    Status,
    /// Equivalent to `stop` followed by `start`.
    Restart {
        #[arg(long)]
        foreground: bool,
    },
}

#[derive(Subcommand)]
pub enum ClipAction {
    /// Prints the most recently captured clipboard entry.
    Get,
    /// Writes `--data` (raw bytes, read from stdin if omitted) to the clipboard.
    Set(ClipSetArgs),
    /// Evicts history down to the configured or requested floor.
    Flush {
        #[arg(long)]
        keep_last: Option<usize>,
        #[arg(long)]
        quiet: bool,
    },
}

#[derive(Args)]
pub struct ClipSetArgs {
    /// Content type; inferred by the daemon's classifier if omitted.
    #[arg(long, value_name = "TYPE")]
    pub r#type: Option<String>,
}

#[derive(Subcommand)]
pub enum HistoryAction {
    /// Lists history entries, most recent first.
    List {
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, value_name = "TYPE")]
        r#type: Option<String>,
    },
    /// Shows one entry by content hash.
    Show { hash: String },
    /// Deletes entries by hash, or everything with `--all`.
    Delete {
        hashes: Vec<String>,
        #[arg(long)]
        all: bool,
        #[arg(long)]
        older_than: Option<chrono::DateTime<chrono::Utc>>,
        #[arg(long, value_name = "TYPE")]
        r#type: Option<String>,
    },
    /// Reports entry counts and byte totals.
    Stats,
}

#[derive(Subcommand)]
pub enum SyncAction {
    /// Reports sync mode, joined groups and active filters.
    Status,
    /// Joins one or more sync groups.
    Join { groups: Vec<String> },
    /// Leaves one or more sync groups.
    Leave { groups: Vec<String> },
    /// Lists currently joined sync groups.
    Groups,
    /// Republishes the full history to the default group.
    Resync,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Prints the effective configuration (file merged with `CLIPMAN_*` overrides) as TOML.
    Show,
    /// Opens the config file in `$EDITOR` (`$VISUAL` takes precedence), creating it with defaults first if absent.
    Edit,
    /// Parses the config file and reports the first error, if any.
    Validate,
    /// Overwrites the config file with built-in defaults, keeping `device_id`/`device_name` unless `--hard`.
    Reset {
        #[arg(long)]
        hard: bool,
    },
}
