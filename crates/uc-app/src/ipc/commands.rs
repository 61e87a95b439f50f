//! The command table (spec.md §4.F, normative). `dispatch` never panics on
//! malformed input: argument decoding failures become `error` responses,
//! never a propagated panic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use uc_core::clipboard::{ContentHash, ContentType, ListOpts};
use uc_core::ports::errors::CoreError;
use uc_core::ports::sync_filter;

use crate::deps::AppDeps;
use crate::ipc::protocol::Response;

/// `true` only for the one command (`history.delete` with `all: true`) that
/// is allowed the extended 60-second deadline (spec.md §5).
pub fn wants_extended_deadline(command: &str, args: &Value) -> bool {
    command == "history.delete" && args.get("all").and_then(Value::as_bool).unwrap_or(false)
}

pub async fn dispatch(command: &str, args: Value, deps: &AppDeps, shutdown: &CancellationToken) -> Response {
    match command {
        "ping" => Response::ok("pong"),
        "clip.get" => clip_get(deps).await,
        "clip.set" => clip_set(args, deps).await,
        "clip.watch" => Response::error("unsupported"),
        "history.list" => history_list(args, deps).await,
        "history.show" => history_show(args, deps).await,
        "history.delete" => history_delete(args, deps).await,
        "history.stats" => history_stats(deps).await,
        "flush" => flush(args, deps).await,
        "sync.status" => sync_status(deps).await,
        "sync.join" => sync_join(args, deps).await,
        "sync.leave" => sync_leave(args, deps).await,
        "sync.groups" => sync_groups(deps).await,
        "sync.resync" => sync_resync(deps).await,
        "shutdown" => {
            // Cancelling is latched: the monitor loop and the ipc acceptor
            // each observe it independently, whenever they next check, no
            // matter which of them (if either) was already waiting.
            shutdown.cancel();
            Response::ok_empty()
        }
        _ => Response::error("unknown command"),
    }
}

fn decode<T: serde::de::DeserializeOwned>(args: Value) -> Result<T, Response> {
    serde_json::from_value(args).map_err(|_| Response::error("invalid request"))
}

async fn clip_get(deps: &AppDeps) -> Response {
    match deps.store.latest().await {
        Ok(Some(content)) => Response::ok(content),
        Ok(None) => CoreError::not_found("store", "no clipboard content captured yet").into(),
        Err(e) => e.into(),
    }
}

#[derive(Deserialize)]
struct ClipSetArgs {
    data: Vec<u8>,
    #[serde(rename = "type")]
    content_type: ContentType,
}

async fn clip_set(args: Value, deps: &AppDeps) -> Response {
    let args: ClipSetArgs = match decode(args) {
        Ok(a) => a,
        Err(r) => return r,
    };
    match deps.adapter.write(&args.data, args.content_type).await {
        Ok(()) => Response::ok_empty(),
        Err(e) => e.into(),
    }
}

async fn history_list(args: Value, deps: &AppDeps) -> Response {
    let opts: ListOpts = if args.is_null() { ListOpts::default() } else {
        match decode(args) {
            Ok(o) => o,
            Err(r) => return r,
        }
    };
    match deps.store.list(opts).await {
        Ok(items) => Response::ok(items),
        Err(e) => e.into(),
    }
}

#[derive(Deserialize)]
struct HistoryShowArgs {
    hash: String,
}

async fn history_show(args: Value, deps: &AppDeps) -> Response {
    let args: HistoryShowArgs = match decode(args) {
        Ok(a) => a,
        Err(r) => return r,
    };
    let hash = match ContentHash::from_hex(&args.hash) {
        Ok(h) => h,
        Err(_) => return Response::error("invalid request"),
    };
    match deps.store.get(&hash).await {
        Ok(Some(content)) => Response::ok(content),
        Ok(None) => CoreError::not_found("store", "no entry with that hash").into(),
        Err(e) => e.into(),
    }
}

#[derive(Deserialize, Default)]
struct HistoryDeleteArgs {
    #[serde(default)]
    hashes: Option<Vec<String>>,
    #[serde(default)]
    all: bool,
    #[serde(default)]
    older_than: Option<DateTime<Utc>>,
    #[serde(rename = "type", default)]
    content_type: Option<ContentType>,
}

async fn history_delete(args: Value, deps: &AppDeps) -> Response {
    let args: HistoryDeleteArgs = if args.is_null() { HistoryDeleteArgs::default() } else {
        match decode(args) {
            Ok(a) => a,
            Err(r) => return r,
        }
    };

    if let Some(hashes) = args.hashes {
        let mut count = 0usize;
        for h in hashes {
            let Ok(hash) = ContentHash::from_hex(&h) else { continue };
            match deps.store.delete(&hash).await {
                Ok(true) => count += 1,
                Ok(false) => {}
                Err(e) => return e.into(),
            }
        }
        return Response::ok(count);
    }

    if args.all {
        let opts = ListOpts { before: args.older_than, content_type: args.content_type, ..Default::default() };
        return match deps.store.delete_matching(opts).await {
            Ok(count) => Response::ok(count),
            Err(e) => e.into(),
        };
    }

    Response::error("invalid request")
}

#[derive(Serialize)]
struct HistoryStats {
    total_entries: usize,
    total_size: u64,
    oldest: Option<DateTime<Utc>>,
    newest: Option<DateTime<Utc>>,
    by_type: std::collections::BTreeMap<String, usize>,
}

async fn history_stats(deps: &AppDeps) -> Response {
    let total_size = match deps.store.cache_size().await {
        Ok(n) => n,
        Err(e) => return e.into(),
    };
    let items = match deps.store.list(ListOpts::default()).await {
        Ok(items) => items,
        Err(e) => return e.into(),
    };

    let mut by_type = std::collections::BTreeMap::new();
    let mut oldest = None;
    let mut newest = None;
    for item in &items {
        *by_type.entry(item.content_type.to_string()).or_insert(0usize) += 1;
        oldest = Some(oldest.map_or(item.created, |o: DateTime<Utc>| o.min(item.created)));
        newest = Some(newest.map_or(item.created, |n: DateTime<Utc>| n.max(item.created)));
    }

    Response::ok(HistoryStats { total_entries: items.len(), total_size, oldest, newest, by_type })
}

#[derive(Deserialize, Default)]
struct FlushArgs {
    #[serde(default)]
    keep_last: Option<usize>,
    #[serde(default)]
    quiet: bool,
}

async fn flush(args: Value, deps: &AppDeps) -> Response {
    let args: FlushArgs = if args.is_null() { FlushArgs::default() } else {
        match decode(args) {
            Ok(a) => a,
            Err(r) => return r,
        }
    };
    let keep = args.keep_last.unwrap_or(deps.config.storage.keep_items);
    match deps.store.flush(keep).await {
        Ok(stats) => {
            if !args.quiet {
                deps.logger.info("store", &format!("flush freed {} bytes", stats.freed_bytes));
            }
            #[derive(Serialize)]
            struct Out { freed_bytes: u64, before: u64, after: u64 }
            Response::ok(Out { freed_bytes: stats.freed_bytes, before: stats.before, after: stats.after })
        }
        Err(e) => e.into(),
    }
}

async fn sync_status(deps: &AppDeps) -> Response {
    let groups = match deps.groups.load().await {
        Ok(g) => g.list(),
        Err(e) => return e.into(),
    };
    #[derive(Serialize)]
    struct SyncStatus {
        mode: &'static str,
        default_group: String,
        connected: bool,
        groups: Vec<String>,
        filters: SyncFilters,
    }
    #[derive(Serialize)]
    struct SyncFilters {
        max_item_size: u64,
        allowed_types: Option<Vec<ContentType>>,
        excluded_types: Vec<ContentType>,
    }
    let cfg = &deps.config.sync;
    Response::ok(SyncStatus {
        mode: if cfg.enabled { "enabled" } else { "disabled" },
        default_group: cfg.default_group.clone(),
        connected: cfg.enabled,
        groups,
        filters: SyncFilters {
            max_item_size: cfg.max_item_size,
            allowed_types: cfg.allowed_types.clone(),
            excluded_types: cfg.excluded_types.clone(),
        },
    })
}

#[derive(Deserialize)]
struct GroupsArgs {
    groups: Vec<String>,
}

async fn sync_join(args: Value, deps: &AppDeps) -> Response {
    let args: GroupsArgs = match decode(args) {
        Ok(a) => a,
        Err(r) => return r,
    };
    let mut joined = Vec::new();
    let mut errors = Vec::new();
    for g in args.groups {
        match deps.groups.join(&g).await.and(deps.publisher.join(&g).await) {
            Ok(()) => joined.push(g),
            Err(e) => errors.push(format!("{g}: {e}")),
        }
    }
    #[derive(Serialize)]
    struct Out { joined: Vec<String>, errors: Vec<String> }
    Response::ok(Out { joined, errors })
}

async fn sync_leave(args: Value, deps: &AppDeps) -> Response {
    let args: GroupsArgs = match decode(args) {
        Ok(a) => a,
        Err(r) => return r,
    };
    let mut left = Vec::new();
    let mut errors = Vec::new();
    for g in args.groups {
        match deps.groups.leave(&g).await.and(deps.publisher.leave(&g).await) {
            Ok(()) => left.push(g),
            Err(e) => errors.push(format!("{g}: {e}")),
        }
    }
    #[derive(Serialize)]
    struct Out { left: Vec<String>, errors: Vec<String> }
    Response::ok(Out { left, errors })
}

async fn sync_groups(deps: &AppDeps) -> Response {
    match deps.groups.load().await {
        Ok(g) => Response::ok(g.list()),
        Err(e) => e.into(),
    }
}

/// Republishes the current history to the default group (the application-
/// layer stand-in for the store-level `publish_history` hook; see
/// DESIGN.md's "Store/publisher coupling" decision).
async fn sync_resync(deps: &AppDeps) -> Response {
    let items = match deps.store.list(ListOpts::default()).await {
        Ok(items) => items,
        Err(e) => return e.into(),
    };

    let mut published = 0usize;
    for item in &items {
        if sync_filter::check(&deps.config.sync, item).is_err() {
            continue;
        }
        if deps.publisher.publish(&deps.config.sync.default_group, item).await.is_ok() {
            published += 1;
        }
    }

    #[derive(Serialize)]
    struct Out { published: usize }
    Response::ok(Out { published })
}
