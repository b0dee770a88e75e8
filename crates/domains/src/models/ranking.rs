use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::user::UserId;
use crate::errors::DomainError;

/// Most entries a ranked list may hold.
pub const RANKING_CAPACITY: usize = 10;

/// Which per-user Top-10 a ranked entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankingKind {
    /// Entries are catalog movie ids.
    Movies,
    /// Entries are catalog person ids.
    Directors,
    /// Entries are catalog person ids.
    Actors,
}

impl RankingKind {
    pub const ALL: [RankingKind; 3] = [RankingKind::Movies, RankingKind::Directors, RankingKind::Actors];

    /// The URL segment used for this ranking.
    pub fn slug(&self) -> &'static str {
        match self {
            RankingKind::Movies => "top-movies",
            RankingKind::Directors => "top-directors",
            RankingKind::Actors => "top-actors",
        }
    }
}

impl fmt::Display for RankingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for RankingKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RankingKind::ALL
            .into_iter()
            .find(|kind| kind.slug() == s)
            .ok_or_else(|| DomainError::not_found(format!("ranking {s:?}")))
    }
}

/// A stored ranked entry. `order` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntry {
    pub user_id: UserId,
    pub item_id: i64,
    pub order: i32,
    pub created_at: DateTime<Utc>,
}

/// An entry about to be written by a full replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedItem {
    pub item_id: i64,
    pub order: i32,
}
