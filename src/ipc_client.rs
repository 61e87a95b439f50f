//! A thin client for every CLI verb except `daemon start`: connects to the
//! already-running daemon's IPC socket, sends one [`Request`], and returns
//! its [`Response`]. Framing and envelope types are shared with the server
//! side via `uc_app::ipc`, so the wire contract can never drift between the
//! two ends of this binary.

use std::path::Path;

use uc_app::ipc::{read_message, write_message, Request, Response};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("daemon is not running")]
    NotRunning,
    #[error("ipc protocol error: {0}")]
    Protocol(String),
}

pub async fn call(socket_path: &Path, command: &str, args: serde_json::Value) -> Result<Response, ClientError> {
    let request = Request { command: command.to_string(), args };
    let payload = serde_json::to_vec(&request).map_err(|e| ClientError::Protocol(e.to_string()))?;

    let frame = {
        #[cfg(unix)]
        {
            let mut stream = tokio::net::UnixStream::connect(socket_path)
                .await
                .map_err(|_| ClientError::NotRunning)?;
            exchange(&mut stream, &payload).await?
        }
        #[cfg(windows)]
        {
            let mut stream = tokio::net::windows::named_pipe::ClientOptions::new()
                .open(socket_path)
                .map_err(|_| ClientError::NotRunning)?;
            exchange(&mut stream, &payload).await?
        }
    };

    serde_json::from_slice(&frame).map_err(|e| ClientError::Protocol(e.to_string()))
}

async fn exchange<S>(stream: &mut S, payload: &[u8]) -> Result<Vec<u8>, ClientError>
where
    S: tokio::io::AsyncRead + tokio::io::AsyncWrite + Unpin,
{
    write_message(stream, payload).await.map_err(|e| ClientError::Protocol(e.to_string()))?;
    read_message(stream)
        .await
        .map_err(|e| ClientError::Protocol(e.to_string()))?
        .ok_or_else(|| ClientError::Protocol("daemon closed the connection without responding".to_string()))
}

/// Exit codes per spec.md §6: 0 success, 1 generic error, 3 daemon not
/// running, 4 already running. `2` (usage error) is produced by `clap`
/// itself before any of this module runs.
pub fn exit_code_for(response: &Response) -> u8 {
    match response.status {
        uc_app::ipc::Status::Ok => 0,
        uc_app::ipc::Status::Error => 1,
    }
}
