use serde::Serialize;

use super::ranking::RankedEntry;
use super::user::PublicUser;

/// Activity counters shown on a profile page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileStats {
    pub ratings: i64,
    pub likes: i64,
    pub reviews: i64,
    pub lists: i64,
    /// `None` when the watchlist is private.
    pub watchlist: Option<i64>,
}

/// Read-only composition of everything a public profile page shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user: PublicUser,
    pub stats: ProfileStats,
    pub top_movies: Vec<RankedEntry>,
    pub top_directors: Vec<RankedEntry>,
    pub top_actors: Vec<RankedEntry>,
}
