//! The sync filtering pipeline (spec.md §4.D), shared by every publisher
//! implementation so the core never branches on which transport is active.
//!
//! Per Design Note "Open question": the source's peer-to-peer and
//! broker-mediated paths disagreed subtly on filter order; this
//! implementation adopts the stricter broker-side rule set uniformly.

use regex::Regex;

use crate::clipboard::{ClipboardContent, ContentType};
use crate::config::SyncConfig;
use crate::ports::errors::{CoreError, ErrorKind};

pub fn check(cfg: &SyncConfig, content: &ClipboardContent) -> Result<(), CoreError> {
    if content.data.len() as u64 > cfg.max_item_size {
        return Err(CoreError::new(
            ErrorKind::TooLarge,
            "sync",
            format!(
                "item is {} bytes, exceeds sync.max_item_size of {}",
                content.data.len(),
                cfg.max_item_size
            ),
        ));
    }

    if let Some(allowed) = &cfg.allowed_types {
        if !allowed.contains(&content.content_type) {
            return Err(filtered(content.content_type, "not in sync.allowed_types"));
        }
    }
    if cfg.excluded_types.contains(&content.content_type) {
        return Err(filtered(content.content_type, "in sync.excluded_types"));
    }

    if matches_any(&cfg.exclude_patterns, &content.data)
        && !matches_any(&cfg.include_patterns, &content.data)
    {
        return Err(CoreError::new(
            ErrorKind::Filtered,
            "sync",
            "data matched an exclude_patterns rule with no overriding include_patterns match",
        ));
    }

    Ok(())
}

fn filtered(ty: ContentType, reason: &str) -> CoreError {
    CoreError::new(
        ErrorKind::Filtered,
        "sync",
        format!("content type {ty} is {reason}"),
    )
}

fn matches_any(patterns: &[String], data: &[u8]) -> bool {
    let Ok(text) = std::str::from_utf8(data) else {
        return false;
    };
    patterns.iter().any(|p| {
        Regex::new(p)
            .map(|re| re.is_match(text))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceId;
    use chrono::Utc;

    fn content(data: &[u8], ty: ContentType) -> ClipboardContent {
        ClipboardContent::new(data.to_vec(), ty, Utc::now(), DeviceId::new())
    }

    fn base_cfg() -> SyncConfig {
        SyncConfig {
            enabled: true,
            default_group: "default".into(),
            max_item_size: 1024,
            allowed_types: None,
            excluded_types: Vec::new(),
            include_patterns: Vec::new(),
            exclude_patterns: Vec::new(),
        }
    }

    #[test]
    fn rejects_oversized_content() {
        let cfg = SyncConfig {
            max_item_size: 4,
            ..base_cfg()
        };
        let c = content(b"hello world", ContentType::Text);
        assert_eq!(check(&cfg, &c).unwrap_err().kind(), ErrorKind::TooLarge);
    }

    #[test]
    fn excluded_type_is_filtered() {
        let cfg = SyncConfig {
            excluded_types: vec![ContentType::Image],
            ..base_cfg()
        };
        let c = content(b"bytes", ContentType::Image);
        assert_eq!(check(&cfg, &c).unwrap_err().kind(), ErrorKind::Filtered);
    }

    #[test]
    fn include_pattern_overrides_exclude_pattern() {
        let cfg = SyncConfig {
            exclude_patterns: vec!["secret".into()],
            include_patterns: vec!["not-secret".into()],
            ..base_cfg()
        };
        let c = content(b"this is not-secret but has secret in it", ContentType::Text);
        assert!(check(&cfg, &c).is_ok());
    }
}
