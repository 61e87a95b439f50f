//! End-to-end IPC coverage: a real SQLite-backed store (via `uc-infra`)
//! behind a UNIX socket, driven with hand-written fake adapter/publisher
//! ports in the teacher's mock-struct style rather than `mockall`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;
use tokio::net::UnixStream;
use uc_app::ipc::{read_message, write_message, Request, Response, Status};
use uc_app::AppDeps;
use uc_core::clipboard::ContentType;
use uc_core::config::{AppConfig, IpcConfig, MonitorConfig, PathsConfig, StorageConfig, SyncConfig};
use uc_core::device::DeviceId;
use uc_core::ports::clipboard_adapter::{ChangeToken, ClipboardRead};
use uc_core::ports::errors::CoreError;
use uc_core::ports::{ClipboardAdapterPort, InboundHandler, NullLogger, PublisherPort};
use uc_infra::{PooledExecutor, SqliteDeviceRepository, SqliteGroupRepository, SqliteHistoryStore, SystemClock};

struct FakeAdapter {
    content: Mutex<Vec<u8>>,
}

#[async_trait]
impl ClipboardAdapterPort for FakeAdapter {
    async fn read(&self) -> Result<ClipboardRead, CoreError> {
        Ok(ClipboardRead {
            data: self.content.lock().unwrap().clone(),
            mime_hints: Vec::new(),
            change_token: ChangeToken("1".to_string()),
        })
    }

    async fn write(&self, data: &[u8], _content_type: ContentType) -> Result<(), CoreError> {
        *self.content.lock().unwrap() = data.to_vec();
        Ok(())
    }

    async fn poll_changed(&self, _previous: Option<&ChangeToken>) -> Option<ChangeToken> {
        None
    }
}

#[derive(Default)]
struct FakePublisher {
    published: AtomicBool,
}

#[async_trait]
impl PublisherPort for FakePublisher {
    async fn publish(&self, _group: &str, _content: &uc_core::clipboard::ClipboardContent) -> Result<(), CoreError> {
        self.published.store(true, Ordering::SeqCst);
        Ok(())
    }
    async fn join(&self, _group: &str) -> Result<(), CoreError> {
        Ok(())
    }
    async fn leave(&self, _group: &str) -> Result<(), CoreError> {
        Ok(())
    }
    async fn list_groups(&self) -> Result<Vec<String>, CoreError> {
        Ok(Vec::new())
    }
    fn on_inbound(&self, _handler: InboundHandler) {}
}

fn test_deps(dir: &std::path::Path) -> AppDeps {
    let db_file = dir.join("clipman.db");
    let pool = uc_infra::init_db_pool(db_file.to_str().unwrap()).unwrap();

    let store = Arc::new(SqliteHistoryStore::new(PooledExecutor::new(pool.clone()), 64 * 1024 * 1024, 200));
    let devices = Arc::new(SqliteDeviceRepository::new(PooledExecutor::new(pool.clone())));
    let groups = Arc::new(SqliteGroupRepository::new(PooledExecutor::new(pool)));

    let config = AppConfig {
        device_id: DeviceId::new(),
        device_name: "test-device".to_string(),
        storage: StorageConfig { max_size: 64 * 1024 * 1024, keep_items: 200 },
        sync: SyncConfig { enabled: false, ..SyncConfig::default() },
        monitor: MonitorConfig { polling_interval_ms: 50, stealth_mode: false, apply_inbound: true },
        ipc: IpcConfig { socket_path: dir.join("clipman.sock"), handler_pool: 4 },
        paths: PathsConfig { db_file, log_dir: dir.join("logs"), run_dir: dir.to_path_buf() },
    };

    AppDeps {
        device_id: config.device_id,
        store,
        adapter: Arc::new(FakeAdapter { content: Mutex::new(Vec::new()) }),
        publisher: Arc::new(FakePublisher::default()),
        devices,
        groups,
        logger: Arc::new(NullLogger),
        clock: Arc::new(SystemClock),
        config,
    }
}

async fn call(socket_path: &std::path::Path, command: &str, args: serde_json::Value) -> Response {
    let mut stream = UnixStream::connect(socket_path).await.unwrap();
    let request = Request { command: command.to_string(), args };
    let payload = serde_json::to_vec(&request).unwrap();
    write_message(&mut stream, &payload).await.unwrap();
    let frame = read_message(&mut stream).await.unwrap().unwrap();
    serde_json::from_slice(&frame).unwrap()
}

#[tokio::test]
async fn ping_round_trips_over_the_socket() {
    let dir = tempfile::tempdir().unwrap();
    let deps = test_deps(dir.path());
    let socket_path = deps.config.ipc.socket_path.clone();
    let shutdown = tokio_util::sync::CancellationToken::new();

    let server = tokio::spawn(uc_app::ipc::serve(deps, shutdown.clone()));
    wait_for_socket(&socket_path).await;

    let response = call(&socket_path, "ping", serde_json::Value::Null).await;
    assert_eq!(response.status, Status::Ok);

    shutdown.cancel();
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn clip_set_then_get_round_trips_through_history() {
    let dir = tempfile::tempdir().unwrap();
    let deps = test_deps(dir.path());
    let socket_path = deps.config.ipc.socket_path.clone();
    let shutdown = tokio_util::sync::CancellationToken::new();

    let server = tokio::spawn(uc_app::ipc::serve(deps, shutdown.clone()));
    wait_for_socket(&socket_path).await;

    let set = call(&socket_path, "clip.set", json!({"data": [104, 105], "type": "text"})).await;
    assert_eq!(set.status, Status::Ok);

    let get = call(&socket_path, "clip.get", serde_json::Value::Null).await;
    // The monitor isn't running in this test, so nothing observed the
    // clipboard write; `clip.get` reads the store's latest entry, which is
    // still empty until something calls `history.list`/`put` directly.
    assert_eq!(get.status, Status::Error);

    shutdown.cancel();
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn unknown_command_is_reported_as_an_error_not_a_panic() {
    let dir = tempfile::tempdir().unwrap();
    let deps = test_deps(dir.path());
    let socket_path = deps.config.ipc.socket_path.clone();
    let shutdown = tokio_util::sync::CancellationToken::new();

    let server = tokio::spawn(uc_app::ipc::serve(deps, shutdown.clone()));
    wait_for_socket(&socket_path).await;

    let response = call(&socket_path, "not.a.real.command", serde_json::Value::Null).await;
    assert_eq!(response.status, Status::Error);
    assert_eq!(response.message.as_deref(), Some("unknown command"));

    shutdown.cancel();
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn sync_join_then_groups_reports_the_joined_group() {
    let dir = tempfile::tempdir().unwrap();
    let deps = test_deps(dir.path());
    let socket_path = deps.config.ipc.socket_path.clone();
    let shutdown = tokio_util::sync::CancellationToken::new();

    let server = tokio::spawn(uc_app::ipc::serve(deps, shutdown.clone()));
    wait_for_socket(&socket_path).await;

    let joined = call(&socket_path, "sync.join", json!({"groups": ["team"]})).await;
    assert_eq!(joined.status, Status::Ok);

    let groups = call(&socket_path, "sync.groups", serde_json::Value::Null).await;
    assert_eq!(groups.data, Some(json!(["team"])));

    shutdown.cancel();
    server.await.unwrap().unwrap();
}

#[tokio::test]
async fn shutdown_command_stops_the_acceptor() {
    let dir = tempfile::tempdir().unwrap();
    let deps = test_deps(dir.path());
    let socket_path = deps.config.ipc.socket_path.clone();
    let shutdown = tokio_util::sync::CancellationToken::new();

    let server = tokio::spawn(uc_app::ipc::serve(deps, shutdown.clone()));
    wait_for_socket(&socket_path).await;

    let response = call(&socket_path, "shutdown", serde_json::Value::Null).await;
    assert_eq!(response.status, Status::Ok);

    tokio::time::timeout(std::time::Duration::from_secs(5), server)
        .await
        .expect("server should exit promptly after shutdown")
        .unwrap()
        .unwrap();
}

async fn wait_for_socket(path: &std::path::Path) {
    for _ in 0..100 {
        if path.exists() {
            return;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    panic!("ipc socket never appeared at {}", path.display());
}
