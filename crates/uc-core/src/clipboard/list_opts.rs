use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clipboard::ContentType;

/// Filter/pagination options for `HistoryStore::list` and the `history.list`
/// IPC command (spec.md §4.C, §4.F).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListOpts {
    pub limit: Option<usize>,
    pub since: Option<DateTime<Utc>>,
    pub before: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub content_type: Option<ContentType>,
    pub min_size: Option<usize>,
    pub max_size: Option<usize>,
    #[serde(default)]
    pub reverse: bool,
}
