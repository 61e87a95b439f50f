use diesel::prelude::*;

use crate::db::schema::clipboard_item;

#[derive(Debug, Clone, Queryable, Identifiable, Selectable)]
#[diesel(table_name = clipboard_item)]
#[diesel(primary_key(hash))]
pub struct ClipboardItemRow {
    pub hash: String,
    pub data: Vec<u8>,
    pub content_type: String,
    pub created_at_ms: i64,
    pub origin_device: String,
    pub size_bytes: i64,
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = clipboard_item)]
pub struct NewClipboardItemRow<'a> {
    pub hash: &'a str,
    pub data: &'a [u8],
    pub content_type: &'a str,
    pub created_at_ms: i64,
    pub origin_device: &'a str,
    pub size_bytes: i64,
}
