use chrono::{DateTime, Utc};
use serde::Serialize;

use super::media::{MediaKey, MediaType};
use super::user::UserId;

/// A user-curated, ordered list of catalog items.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaList {
    pub id: i64,
    pub user_id: UserId,
    pub owner_username: String,
    pub name: String,
    pub description: Option<String>,
    pub is_numbered: bool,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub id: i64,
    pub list_id: i64,
    pub media_id: i64,
    pub media_type: MediaType,
    pub order: i32,
}

impl ListItem {
    pub fn key(&self) -> MediaKey {
        MediaKey::new(self.media_id, self.media_type)
    }
}

/// A list together with its items sorted by `order`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListWithItems {
    #[serde(flatten)]
    pub list: MediaList,
    pub items: Vec<ListItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewList {
    pub user_id: UserId,
    pub name: String,
    pub description: Option<String>,
    pub is_numbered: bool,
    pub is_public: bool,
}

/// Metadata update; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListChanges {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub is_numbered: Option<bool>,
    pub is_public: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewListItem {
    pub key: MediaKey,
    pub order: i32,
}
