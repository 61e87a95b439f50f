//! Pure content-type classification (spec.md §4.B).
//!
//! `classify` never touches the network and only ever calls `stat` on a
//! bounded number of path candidates — it must stay safe to call on every
//! observed clipboard change without risking the daemon on slow or hostile
//! filesystem state.

use std::path::Path;

use crate::clipboard::ContentType;

/// A MIME hint the clipboard adapter observed alongside raw bytes (e.g. a
/// platform-reported format name such as `"image/png"` or `"text/html"`).
pub type MimeHint = str;

/// Classifier never stats more than this many candidate paths per call.
const MAX_PATH_CHECKS: usize = 10;

const URL_SCHEMES: &[&str] = &["http", "https", "ftp", "file", "mailto"];

/// Maps raw clipboard bytes plus MIME hints to a [`ContentType`].
///
/// Rules are evaluated in order; the first match wins (spec.md §4.B).
pub fn classify(bytes: &[u8], mime_hints: &[String]) -> ContentType {
    if mime_hints.iter().any(|m| m.starts_with("image/")) {
        return ContentType::Image;
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        let trimmed = text.trim();

        if is_well_formed_url(trimmed) {
            return ContentType::Url;
        }

        if let Some(paths) = as_json_path_array(trimmed) {
            if !paths.is_empty() && paths_exist(&paths) {
                return ContentType::File;
            }
        }
        if mime_hints.iter().any(|m| m == "text/uri-list" || m == "text/x-moz-url") {
            return ContentType::File;
        }

        if !trimmed.is_empty() && !trimmed.contains('\n') && path_exists(trimmed) {
            return ContentType::Filepath;
        }

        if mime_hints.iter().any(|m| m == "text/html") {
            return ContentType::Html;
        }
        if mime_hints.iter().any(|m| m == "text/rtf" || m == "application/rtf") {
            return ContentType::Rtf;
        }

        return ContentType::Text;
    }

    ContentType::Unknown
}

fn is_well_formed_url(text: &str) -> bool {
    match url::Url::parse(text) {
        Ok(u) => URL_SCHEMES.contains(&u.scheme()),
        Err(_) => false,
    }
}

fn as_json_path_array(text: &str) -> Option<Vec<String>> {
    let value: serde_json::Value = serde_json::from_str(text).ok()?;
    let arr = value.as_array()?;
    arr.iter()
        .map(|v| v.as_str().map(str::to_owned))
        .collect::<Option<Vec<_>>>()
}

fn paths_exist(paths: &[String]) -> bool {
    paths
        .iter()
        .take(MAX_PATH_CHECKS)
        .all(|p| Path::new(p).exists())
}

fn path_exists(candidate: &str) -> bool {
    Path::new(candidate).exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_mime_hint_wins_regardless_of_bytes() {
        let t = classify(b"not an image", &["image/png".to_string()]);
        assert_eq!(t, ContentType::Image);
    }

    #[test]
    fn recognizes_well_formed_urls() {
        let t = classify(b"https://example.com/path", &[]);
        assert_eq!(t, ContentType::Url);
    }

    #[test]
    fn plain_text_falls_through_to_text() {
        let t = classify(b"hello world", &[]);
        assert_eq!(t, ContentType::Text);
    }

    #[test]
    fn html_mime_hint_wins_over_plain_text_fallback() {
        let t = classify(b"<b>hi</b>", &["text/html".to_string()]);
        assert_eq!(t, ContentType::Html);
    }

    #[test]
    fn invalid_utf8_is_unknown() {
        let t = classify(&[0xff, 0xfe, 0x00, 0x80], &[]);
        assert_eq!(t, ContentType::Unknown);
    }

    #[test]
    fn newline_disqualifies_filepath_classification() {
        let t = classify(b"/tmp\n/var", &[]);
        assert_ne!(t, ContentType::Filepath);
    }
}
