//! Length-delimited framing for the IPC wire protocol (spec.md §4.F):
//! little-endian u32 length prefix, then UTF-8 JSON bytes, 16 MiB ceiling.
//! Grounded in the teacher's pairing-stream framing
//! (`uc-platform/src/adapters/pairing_stream/framing/mod.rs`), swapped from
//! big-endian to little-endian and from `anyhow` to `CoreError` to match
//! this crate's error taxonomy.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;
use uc_core::ports::errors::{CoreError, ErrorKind};

pub const MAX_MESSAGE_BYTES: usize = 16 * 1024 * 1024;

pub async fn write_message<W>(writer: &mut W, payload: &[u8]) -> Result<(), CoreError>
where
    W: AsyncWrite + Unpin,
{
    let len: u32 = payload
        .len()
        .try_into()
        .map_err(|_| CoreError::new(ErrorKind::InvalidArgument, "ipc", "response too large to frame"))?;

    trace!(len, "writing ipc response frame");
    writer
        .write_all(&len.to_le_bytes())
        .await
        .map_err(|e| CoreError::new(ErrorKind::Transient, "ipc", format!("write length prefix: {e}")))?;
    writer
        .write_all(payload)
        .await
        .map_err(|e| CoreError::new(ErrorKind::Transient, "ipc", format!("write payload: {e}")))?;
    writer
        .flush()
        .await
        .map_err(|e| CoreError::new(ErrorKind::Transient, "ipc", format!("flush: {e}")))
}

/// Reads a single frame. Returns `Ok(None)` if the connection closed cleanly
/// before any bytes arrived (the peer connected and disconnected without
/// sending a request).
pub async fn read_message<R>(reader: &mut R) -> Result<Option<Vec<u8>>, CoreError>
where
    R: AsyncRead + Unpin,
{
    let mut len_buf = [0u8; 4];
    let n = reader
        .read(&mut len_buf)
        .await
        .map_err(|e| CoreError::new(ErrorKind::Transient, "ipc", format!("read length prefix: {e}")))?;
    if n == 0 {
        return Ok(None);
    }
    if n < 4 {
        reader
            .read_exact(&mut len_buf[n..])
            .await
            .map_err(|e| CoreError::new(ErrorKind::InvalidArgument, "ipc", format!("truncated length prefix: {e}")))?;
    }

    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_MESSAGE_BYTES {
        return Err(CoreError::new(
            ErrorKind::InvalidArgument,
            "ipc",
            format!("message of {len} bytes exceeds the 16 MiB limit"),
        ));
    }

    let mut buf = vec![0u8; len];
    reader
        .read_exact(&mut buf)
        .await
        .map_err(|e| CoreError::new(ErrorKind::InvalidArgument, "ipc", format!("truncated payload: {e}")))?;
    Ok(Some(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_a_payload() {
        let mut buf = Vec::new();
        write_message(&mut buf, b"{\"hello\":true}").await.unwrap();
        let mut cursor = std::io::Cursor::new(buf);
        let read_back = read_message(&mut cursor).await.unwrap().unwrap();
        assert_eq!(read_back, b"{\"hello\":true}");
    }

    #[tokio::test]
    async fn empty_stream_reads_as_none() {
        let mut cursor = std::io::Cursor::new(Vec::<u8>::new());
        assert!(read_message(&mut cursor).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn oversized_length_prefix_is_rejected() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&(MAX_MESSAGE_BYTES as u32 + 1).to_le_bytes());
        let mut cursor = std::io::Cursor::new(buf);
        let err = read_message(&mut cursor).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }
}
