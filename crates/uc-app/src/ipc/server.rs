//! The local IPC acceptor (spec.md §4.F, §5): one UNIX domain socket (mode
//! 0600) or Windows named pipe, framed per [`super::codec`], bounded
//! concurrency, and cooperative shutdown. Grounded in the accept-loop /
//! spawn-per-connection shape of the pack's `ipc_server.rs`, generalized to
//! length-delimited framing and a bounded handler pool instead of an
//! unbounded newline stream.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uc_core::ports::errors::{CoreError, ErrorKind};

use crate::deps::AppDeps;
use crate::ipc::codec::{read_message, write_message};
use crate::ipc::commands::{dispatch, wants_extended_deadline};
use crate::ipc::protocol::{Request, Response};

const DEFAULT_DEADLINE: Duration = Duration::from_secs(10);
const DELETE_ALL_DEADLINE: Duration = Duration::from_secs(60);
const DRAIN_DEADLINE: Duration = Duration::from_secs(5);

/// Runs the accept loop until `shutdown` is cancelled. Returns once every
/// in-flight handler has finished or the drain deadline elapses.
pub async fn serve(deps: AppDeps, shutdown: CancellationToken) -> Result<(), CoreError> {
    let pool_size = deps.config.ipc.handler_pool.max(1);
    let permits = Arc::new(Semaphore::new(pool_size));
    let mut handlers = JoinSet::new();

    let mut acceptor = bind(&deps).await?;
    info!(socket = %deps.config.ipc.socket_path.display(), pool_size, "ipc server listening");

    loop {
        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                debug!("ipc server received shutdown notice, no longer accepting connections");
                break;
            }

            accepted = acceptor.accept() => {
                let conn = match accepted {
                    Ok(conn) => conn,
                    Err(e) => {
                        warn!(error = %e, "failed to accept ipc connection");
                        continue;
                    }
                };

                let permit = permits.clone().acquire_owned().await.expect("semaphore never closed");
                let deps = deps.clone();
                let shutdown = shutdown.clone();
                handlers.spawn(async move {
                    let _permit = permit;
                    if let Err(e) = handle_connection(conn, &deps, &shutdown).await {
                        debug!(error = %e, "ipc connection ended with an error");
                    }
                });
            }
        }
    }

    drop(acceptor);
    let drained = tokio::time::timeout(DRAIN_DEADLINE, async {
        while handlers.join_next().await.is_some() {}
    })
    .await;
    if drained.is_err() {
        warn!("ipc handler drain deadline elapsed with tasks still in flight");
        handlers.shutdown().await;
    }

    Ok(())
}

async fn handle_connection(conn: Connection, deps: &AppDeps, shutdown: &CancellationToken) -> Result<(), CoreError> {
    let (mut reader, mut writer) = conn.into_split();

    let Some(frame) = read_message(&mut reader).await? else {
        return Ok(());
    };

    let response = match serde_json::from_slice::<Request>(&frame) {
        Ok(request) => {
            let deadline = if wants_extended_deadline(&request.command, &request.args) {
                DELETE_ALL_DEADLINE
            } else {
                DEFAULT_DEADLINE
            };
            match tokio::time::timeout(deadline, dispatch(&request.command, request.args, deps, shutdown)).await {
                Ok(response) => response,
                Err(_) => Response::error("request exceeded its deadline"),
            }
        }
        Err(e) => {
            debug!(error = %e, "malformed ipc request");
            Response::error("invalid request")
        }
    };

    let payload = serde_json::to_vec(&response)
        .map_err(|e| CoreError::new(ErrorKind::Fatal, "ipc", format!("cannot encode response: {e}")))?;
    write_message(&mut writer, &payload).await
}

#[cfg(unix)]
struct Connection(tokio::net::UnixStream);

#[cfg(unix)]
impl Connection {
    fn into_split(self) -> (tokio::net::unix::OwnedReadHalf, tokio::net::unix::OwnedWriteHalf) {
        self.0.into_split()
    }
}

#[cfg(unix)]
struct Acceptor(tokio::net::UnixListener);

#[cfg(unix)]
impl Acceptor {
    async fn accept(&mut self) -> std::io::Result<Connection> {
        let (stream, _addr) = self.0.accept().await?;
        Ok(Connection(stream))
    }
}

#[cfg(unix)]
async fn bind(deps: &AppDeps) -> Result<Acceptor, CoreError> {
    use std::os::unix::fs::PermissionsExt;

    let path = &deps.config.ipc.socket_path;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| CoreError::new(ErrorKind::Fatal, "ipc", format!("cannot create socket dir: {e}")))?;
    }
    // A stale socket from an unclean shutdown blocks bind; the PID lock
    // (acquired before this runs) already guarantees no other daemon owns it.
    let _ = std::fs::remove_file(path);

    let listener = tokio::net::UnixListener::bind(path)
        .map_err(|e| CoreError::new(ErrorKind::Fatal, "ipc", format!("cannot bind {}: {e}", path.display())))?;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .map_err(|e| CoreError::new(ErrorKind::Fatal, "ipc", format!("cannot chmod socket: {e}")))?;

    Ok(Acceptor(listener))
}

#[cfg(windows)]
struct Connection(tokio::net::windows::named_pipe::NamedPipeServer);

#[cfg(windows)]
impl Connection {
    fn into_split(self) -> (tokio::io::ReadHalf<tokio::net::windows::named_pipe::NamedPipeServer>, tokio::io::WriteHalf<tokio::net::windows::named_pipe::NamedPipeServer>) {
        tokio::io::split(self.0)
    }
}

#[cfg(windows)]
struct Acceptor {
    path: String,
    next: Option<tokio::net::windows::named_pipe::NamedPipeServer>,
}

#[cfg(windows)]
impl Acceptor {
    async fn accept(&mut self) -> std::io::Result<Connection> {
        let server = match self.next.take() {
            Some(s) => s,
            None => tokio::net::windows::named_pipe::ServerOptions::new().create(&self.path)?,
        };
        server.connect().await?;
        self.next = Some(tokio::net::windows::named_pipe::ServerOptions::new().create(&self.path)?);
        Ok(Connection(server))
    }
}

#[cfg(windows)]
async fn bind(deps: &AppDeps) -> Result<Acceptor, CoreError> {
    let path = deps.config.ipc.socket_path.to_string_lossy().to_string();
    let first = tokio::net::windows::named_pipe::ServerOptions::new()
        .first_pipe_instance(true)
        .create(&path)
        .map_err(|e| CoreError::new(ErrorKind::Fatal, "ipc", format!("cannot create named pipe {path}: {e}")))?;
    Ok(Acceptor { path, next: Some(first) })
}
