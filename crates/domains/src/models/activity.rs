//! Per-media user state: ratings, likes, watchlist membership and reviews.
//! Each is keyed by the (user, media item) triple.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::media::{MediaKey, MediaType};
use super::user::{PublicUser, UserId};

/// Inclusive bounds of a rating score.
pub const MIN_SCORE: f64 = 0.5;
pub const MAX_SCORE: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: i64,
    pub user_id: UserId,
    pub media_id: i64,
    pub media_type: MediaType,
    pub score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Like {
    pub id: i64,
    pub user_id: UserId,
    pub media_id: i64,
    pub media_type: MediaType,
    pub created_at: DateTime<Utc>,
}

/// Watchlist membership. `is_public` is managed per user, in bulk.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    pub id: i64,
    pub user_id: UserId,
    pub media_id: i64,
    pub media_type: MediaType,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: i64,
    pub user_id: UserId,
    pub media_id: i64,
    pub media_type: MediaType,
    pub review_text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A review joined with its author's public fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthoredReview {
    #[serde(flatten)]
    pub review: Review,
    pub author: PublicUser,
}

/// An authored review plus the author's own rating and like for the same item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedReview {
    #[serde(flatten)]
    pub review: Review,
    pub author: PublicUser,
    pub rating: Option<f64>,
    pub has_liked: bool,
}

macro_rules! media_keyed {
    ($($ty:ty),+) => {
        $(impl $ty {
            pub fn key(&self) -> MediaKey {
                MediaKey::new(self.media_id, self.media_type)
            }
        })+
    };
}

media_keyed!(Rating, Like, WatchlistEntry, Review);
