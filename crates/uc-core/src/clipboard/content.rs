//! The clipboard content model.
//!
//! [`ClipboardContent`] is the immutable unit stored, listed, and published by
//! the daemon: one observed clipboard snapshot, typed and hashed. It is never
//! mutated after construction; `put`-on-duplicate only bumps `created` (see
//! `uc-infra`'s history store), it never rewrites `data`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::device::DeviceId;

/// Closed content-type enumeration (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Text,
    /// Platform-specific raw text representation (e.g. a native string
    /// format distinct from plain UTF-8 text).
    String,
    Image,
    Url,
    /// A list of file paths.
    File,
    /// A single file path.
    Filepath,
    Html,
    Rtf,
    Unknown,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Text => "text",
            ContentType::String => "string",
            ContentType::Image => "image",
            ContentType::Url => "url",
            ContentType::File => "file",
            ContentType::Filepath => "filepath",
            ContentType::Html => "html",
            ContentType::Rtf => "rtf",
            ContentType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(ContentType::Text),
            "string" => Ok(ContentType::String),
            "image" => Ok(ContentType::Image),
            "url" => Ok(ContentType::Url),
            "file" => Ok(ContentType::File),
            "filepath" => Ok(ContentType::Filepath),
            "html" => Ok(ContentType::Html),
            "rtf" => Ok(ContentType::Rtf),
            "unknown" => Ok(ContentType::Unknown),
            other => Err(format!("unknown content type: {other}")),
        }
    }
}

/// 32-byte BLAKE3 digest of `data ∥ type`, used as the primary key and
/// de-duplication token (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(#[serde(with = "hash_hex")] pub [u8; 32]);

impl ContentHash {
    pub fn compute(data: &[u8], content_type: ContentType) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(data);
        hasher.update(&[0]);
        hasher.update(content_type.as_str().as_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, hex::FromHexError> {
        let bytes: Vec<u8> = hex::decode(s)?;
        let arr: [u8; 32] = bytes
            .try_into()
            .map_err(|_| hex::FromHexError::InvalidStringLength)?;
        Ok(Self(arr))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

mod hash_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(d)?;
        let v = hex::decode(&s).map_err(serde::de::Error::custom)?;
        v.try_into()
            .map_err(|_| serde::de::Error::custom("content hash must be 32 bytes"))
    }
}

/// A single captured clipboard snapshot: bytes plus type plus metadata.
///
/// Created by the monitor (local capture) or by an inbound sync event; never
/// mutated; destroyed only by eviction or explicit `history.delete`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardContent {
    pub data: Vec<u8>,
    #[serde(rename = "type")]
    pub content_type: ContentType,
    /// Monotonic-safe wall timestamp of first local observation, UTC,
    /// millisecond precision.
    pub created: DateTime<Utc>,
    pub hash: ContentHash,
    pub origin_device: DeviceId,
}

impl ClipboardContent {
    /// Builds a new content record, computing its hash from `data` and
    /// `content_type`. `created` should come from a [`crate::ports::ClockPort`]
    /// so callers stay testable.
    pub fn new(
        data: Vec<u8>,
        content_type: ContentType,
        created: DateTime<Utc>,
        origin_device: DeviceId,
    ) -> Self {
        let hash = ContentHash::compute(&data, content_type);
        Self {
            data,
            content_type,
            created,
            hash,
            origin_device,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic_for_same_data_and_type() {
        let a = ContentHash::compute(b"hello", ContentType::Text);
        let b = ContentHash::compute(b"hello", ContentType::Text);
        assert_eq!(a, b);
    }

    #[test]
    fn hash_differs_by_type() {
        let a = ContentHash::compute(b"hello", ContentType::Text);
        let b = ContentHash::compute(b"hello", ContentType::Html);
        assert_ne!(a, b);
    }

    #[test]
    fn hash_hex_round_trips() {
        let h = ContentHash::compute(b"hello", ContentType::Text);
        let hex = h.to_hex();
        assert_eq!(ContentHash::from_hex(&hex).unwrap(), h);
    }
}
