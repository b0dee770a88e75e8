//! Ranked Top-10 lists (movies, directors, actors).
//!
//! Saving is always a full replace: the submitted array becomes the whole
//! ranking and `order` is its 1-based position. Removing a single entry
//! leaves the remaining orders as they are.

use std::sync::Arc;

use domains::errors::{DomainError, Result};
use domains::models::{RankedEntry, RankedItem, RankingKind, UserId, RANKING_CAPACITY};
use domains::ports::RankingRepository;
use tracing::{info, instrument};

use crate::validation;

pub struct RankingService {
    rankings: Arc<dyn RankingRepository>,
}

impl RankingService {
    pub fn new(rankings: Arc<dyn RankingRepository>) -> Self {
        Self { rankings }
    }

    #[instrument(skip(self, item_ids), fields(len = item_ids.len()))]
    pub async fn replace(&self, user_id: UserId, kind: RankingKind, item_ids: Vec<i64>) -> Result<Vec<RankedEntry>> {
        if item_ids.len() > RANKING_CAPACITY {
            return Err(DomainError::validation(format!(
                "{kind} holds at most {RANKING_CAPACITY} entries, got {}",
                item_ids.len()
            )));
        }
        for id in &item_ids {
            validation::positive_id("id", *id)?;
        }
        validation::no_duplicates("items", item_ids.iter().copied())?;

        let items = ranked(&item_ids);
        let stored = self.rankings.replace_ranking(user_id, kind, items).await?;
        info!(%kind, user_id, entries = stored.len(), "ranking replaced");
        Ok(stored)
    }

    pub async fn get(&self, user_id: UserId, kind: RankingKind) -> Result<Vec<RankedEntry>> {
        self.rankings.ranking_for_user(user_id, kind).await
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, user_id: UserId, kind: RankingKind, item_id: i64) -> Result<()> {
        if self.rankings.remove_ranked(user_id, kind, item_id).await? {
            Ok(())
        } else {
            Err(DomainError::not_found(format!("{kind} entry")))
        }
    }
}

/// Assigns `order = index + 1` in submission order.
fn ranked(item_ids: &[i64]) -> Vec<RankedItem> {
    item_ids
        .iter()
        .zip(1..)
        .map(|(&item_id, order)| RankedItem { item_id, order })
        .collect()
}
