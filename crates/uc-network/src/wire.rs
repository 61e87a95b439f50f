//! Wire format for the clipboard sync protocol: a request/response codec
//! carrying one [`ClipboardEnvelope`] per stream, JSON-encoded and
//! length-limited, grounded in the teacher's `uc-network/src/codec.rs`
//! `UniClipboardCodec` (same `AsyncRead`/`AsyncWrite`-take-then-`serde_json`
//! shape, generalized from pairing messages to clipboard envelopes).

use std::pin::Pin;

use futures::prelude::*;
use libp2p::{request_response::Codec, StreamProtocol};
use serde::{Deserialize, Serialize};
use uc_core::clipboard::ClipboardContent;

pub const PROTOCOL_NAME: StreamProtocol = StreamProtocol::new("/clipman/sync/1.0.0");

/// A clip published to a named group. The envelope is the unit exchanged
/// over the wire; [`ClipboardContent`] itself carries hash/type/origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipboardEnvelope {
    pub group: String,
    pub content: ClipboardContent,
}

/// Acknowledges receipt. Carries no payload; its presence is the signal
/// that at least one peer accepted the publish.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncAck {
    pub accepted: bool,
}

/// Maximum single-envelope size on the wire. Larger than `sync.max_item_size`
/// would ever allow through filtering, but bounds a misbehaving peer's
/// stream regardless of local configuration.
const MAX_ENVELOPE_BYTES: u64 = 32 * 1024 * 1024;

#[derive(Debug, Clone, Default)]
pub struct ClipboardCodec;

impl Codec for ClipboardCodec {
    type Protocol = StreamProtocol;
    type Request = ClipboardEnvelope;
    type Response = SyncAck;

    fn read_request<'life0, 'life1, 'life2, 'async_trait, T>(
        &'life0 mut self,
        _: &'life1 Self::Protocol,
        io: &'life2 mut T,
    ) -> Pin<Box<dyn Future<Output = std::io::Result<Self::Request>> + Send + 'async_trait>>
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        'life2: 'async_trait,
        T: AsyncRead + Unpin + Send + 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let mut buf = Vec::new();
            io.take(MAX_ENVELOPE_BYTES).read_to_end(&mut buf).await?;
            serde_json::from_slice(&buf)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }

    fn read_response<'life0, 'life1, 'life2, 'async_trait, T>(
        &'life0 mut self,
        _: &'life1 Self::Protocol,
        io: &'life2 mut T,
    ) -> Pin<Box<dyn Future<Output = std::io::Result<Self::Response>> + Send + 'async_trait>>
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        'life2: 'async_trait,
        T: AsyncRead + Unpin + Send + 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let mut buf = Vec::new();
            io.take(4096).read_to_end(&mut buf).await?;
            serde_json::from_slice(&buf)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        })
    }

    fn write_request<'life0, 'life1, 'life2, 'async_trait, T>(
        &'life0 mut self,
        _: &'life1 Self::Protocol,
        io: &'life2 mut T,
        req: Self::Request,
    ) -> Pin<Box<dyn Future<Output = std::io::Result<()>> + Send + 'async_trait>>
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        'life2: 'async_trait,
        T: AsyncWrite + Unpin + Send + 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let bytes = serde_json::to_vec(&req)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            io.write_all(&bytes).await?;
            io.close().await
        })
    }

    fn write_response<'life0, 'life1, 'life2, 'async_trait, T>(
        &'life0 mut self,
        _: &'life1 Self::Protocol,
        io: &'life2 mut T,
        res: Self::Response,
    ) -> Pin<Box<dyn Future<Output = std::io::Result<()>> + Send + 'async_trait>>
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        'life2: 'async_trait,
        T: AsyncWrite + Unpin + Send + 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            let bytes = serde_json::to_vec(&res)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
            io.write_all(&bytes).await?;
            io.close().await
        })
    }
}
