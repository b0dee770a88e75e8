//! Per-media user state.
//!
//! Likes and watchlist membership are presence toggles: each call flips the
//! state. Ratings are create-or-overwrite. An item counts as "watched" as
//! soon as the user has rated it; there is no separate watched flag.

use std::sync::Arc;

use domains::errors::{DomainError, Result};
use domains::models::{MediaKey, Rating, Toggle, Upserted, UserId, WatchlistEntry};
use domains::ports::{LikeRepository, RatingRepository, WatchlistRepository};
use tracing::{debug, instrument, warn};

use crate::validation;

pub struct RatingService {
    ratings: Arc<dyn RatingRepository>,
}

impl RatingService {
    pub fn new(ratings: Arc<dyn RatingRepository>) -> Self {
        Self { ratings }
    }

    /// Creates the rating or overwrites the score of the existing one.
    #[instrument(skip(self))]
    pub async fn rate(&self, user_id: UserId, key: MediaKey, score: f64) -> Result<Upserted<Rating>> {
        let score = validation::score(score)?;
        validation::positive_id("mediaId", key.media_id)?;

        if let Some(existing) = self.ratings.find_rating(user_id, key).await? {
            return Ok(Upserted::Updated(self.ratings.update_rating(existing.id, score).await?));
        }

        match self.ratings.insert_rating(user_id, key, score).await {
            Ok(rating) => Ok(Upserted::Created(rating)),
            // Lost a race against a concurrent first rating; overwrite it instead.
            Err(DomainError::Conflict(_)) => {
                warn!("concurrent rating insert, overwriting the winner");
                let existing = self
                    .ratings
                    .find_rating(user_id, key)
                    .await?
                    .ok_or_else(|| DomainError::internal("rating vanished after conflict"))?;
                Ok(Upserted::Updated(self.ratings.update_rating(existing.id, score).await?))
            }
            Err(err) => Err(err),
        }
    }

    pub async fn rating(&self, user_id: UserId, key: MediaKey) -> Result<Rating> {
        self.ratings
            .find_rating(user_id, key)
            .await?
            .ok_or_else(|| DomainError::not_found("rating"))
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, user_id: UserId, key: MediaKey) -> Result<()> {
        if self.ratings.delete_rating(user_id, key).await? {
            Ok(())
        } else {
            Err(DomainError::not_found("rating"))
        }
    }

    pub async fn is_watched(&self, user_id: UserId, key: MediaKey) -> Result<bool> {
        Ok(self.ratings.find_rating(user_id, key).await?.is_some())
    }
}

pub struct LikeService {
    likes: Arc<dyn LikeRepository>,
}

impl LikeService {
    pub fn new(likes: Arc<dyn LikeRepository>) -> Self {
        Self { likes }
    }

    #[instrument(skip(self))]
    pub async fn toggle(&self, user_id: UserId, key: MediaKey) -> Result<Toggle> {
        validation::positive_id("mediaId", key.media_id)?;

        if self.likes.find_like(user_id, key).await?.is_some() {
            self.likes.delete_like(user_id, key).await?;
            debug!("like removed");
            return Ok(Toggle::Absent);
        }

        match self.likes.insert_like(user_id, key).await {
            Ok(_) => Ok(Toggle::Present),
            Err(DomainError::Conflict(_)) => {
                warn!("concurrent like insert, reporting as liked");
                Ok(Toggle::Present)
            }
            Err(err) => Err(err),
        }
    }

    pub async fn is_liked(&self, user_id: UserId, key: MediaKey) -> Result<bool> {
        Ok(self.likes.find_like(user_id, key).await?.is_some())
    }
}

pub struct WatchlistService {
    watchlist: Arc<dyn WatchlistRepository>,
}

impl WatchlistService {
    pub fn new(watchlist: Arc<dyn WatchlistRepository>) -> Self {
        Self { watchlist }
    }

    #[instrument(skip(self))]
    pub async fn toggle(&self, user_id: UserId, key: MediaKey) -> Result<Toggle> {
        validation::positive_id("mediaId", key.media_id)?;

        if self.watchlist.find_watchlist_entry(user_id, key).await?.is_some() {
            self.watchlist.delete_watchlist_entry(user_id, key).await?;
            debug!("watchlist entry removed");
            return Ok(Toggle::Absent);
        }

        match self.watchlist.insert_watchlist_entry(user_id, key).await {
            Ok(_) => Ok(Toggle::Present),
            Err(DomainError::Conflict(_)) => {
                warn!("concurrent watchlist insert, reporting as present");
                Ok(Toggle::Present)
            }
            Err(err) => Err(err),
        }
    }

    pub async fn contains(&self, user_id: UserId, key: MediaKey) -> Result<bool> {
        Ok(self.watchlist.find_watchlist_entry(user_id, key).await?.is_some())
    }

    /// The caller's own watchlist, regardless of visibility.
    pub async fn own(&self, user_id: UserId) -> Result<Vec<WatchlistEntry>> {
        self.watchlist.watchlist_for_user(user_id).await
    }

    /// Stores the per-user setting and applies it to every entry at once.
    #[instrument(skip(self))]
    pub async fn set_visibility(&self, user_id: UserId, is_public: bool) -> Result<u64> {
        let updated = self.watchlist.set_watchlist_visibility(user_id, is_public).await?;
        debug!(updated, "watchlist visibility changed");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use domains::ports::{MockLikeRepository, MockRatingRepository, MockWatchlistRepository};
    use mockall::predicate::eq;

    const KEY: MediaKey = MediaKey {
        media_id: 42,
        media_type: domains::models::MediaType::Movie,
    };

    #[tokio::test]
    async fn first_rating_is_created() {
        let mut ratings = MockRatingRepository::new();
        ratings.expect_find_rating().returning(|_, _| Ok(None));
        ratings
            .expect_insert_rating()
            .with(eq(1), eq(KEY), eq(4.5))
            .returning(|user, key, score| Ok(fixtures::rating(10, user, key, score)));

        let upserted = RatingService::new(Arc::new(ratings)).rate(1, KEY, 4.5).await.unwrap();
        assert!(upserted.was_created());
        assert_eq!(upserted.into_inner().score, 4.5);
    }

    #[tokio::test]
    async fn second_rating_overwrites_in_place() {
        let mut ratings = MockRatingRepository::new();
        ratings
            .expect_find_rating()
            .returning(|user, key| Ok(Some(fixtures::rating(10, user, key, 4.5))));
        ratings.expect_insert_rating().never();
        ratings
            .expect_update_rating()
            .with(eq(10), eq(3.0))
            .returning(|id, score| Ok(fixtures::rating(id, 1, KEY, score)));

        let upserted = RatingService::new(Arc::new(ratings)).rate(1, KEY, 3.0).await.unwrap();
        assert!(!upserted.was_created());
        assert_eq!(upserted.into_inner().score, 3.0);
    }

    #[tokio::test]
    async fn out_of_range_scores_never_reach_the_store() {
        let service = RatingService::new(Arc::new(MockRatingRepository::new()));
        for score in [0.0, 0.49, 5.5, -1.0] {
            let err = service.rate(1, KEY, score).await.unwrap_err();
            assert!(matches!(err, DomainError::Validation(_)), "score {score}");
        }
    }

    #[tokio::test]
    async fn rating_insert_race_falls_back_to_update() {
        let mut ratings = MockRatingRepository::new();
        let mut seq = mockall::Sequence::new();
        ratings
            .expect_find_rating()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(None));
        ratings
            .expect_insert_rating()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Err(DomainError::Conflict("ratings_user_media_key".to_owned())));
        ratings
            .expect_find_rating()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|user, key| Ok(Some(fixtures::rating(11, user, key, 2.0))));
        ratings
            .expect_update_rating()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|id, score| Ok(fixtures::rating(id, 1, KEY, score)));

        let upserted = RatingService::new(Arc::new(ratings)).rate(1, KEY, 4.0).await.unwrap();
        assert!(!upserted.was_created());
    }

    #[tokio::test]
    async fn watched_means_rated() {
        let mut ratings = MockRatingRepository::new();
        ratings
            .expect_find_rating()
            .with(eq(1), eq(KEY))
            .returning(|user, key| Ok(Some(fixtures::rating(1, user, key, 1.0))));
        ratings
            .expect_find_rating()
            .with(eq(2), eq(KEY))
            .returning(|_, _| Ok(None));

        let service = RatingService::new(Arc::new(ratings));
        assert!(service.is_watched(1, KEY).await.unwrap());
        assert!(!service.is_watched(2, KEY).await.unwrap());
    }

    #[tokio::test]
    async fn like_toggles_on_then_off() {
        let mut likes = MockLikeRepository::new();
        let mut seq = mockall::Sequence::new();
        likes
            .expect_find_like()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(None));
        likes
            .expect_insert_like()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|user, key| Ok(fixtures::like(1, user, key)));
        likes
            .expect_find_like()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|user, key| Ok(Some(fixtures::like(1, user, key))));
        likes
            .expect_delete_like()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(true));

        let service = LikeService::new(Arc::new(likes));
        assert_eq!(service.toggle(1, KEY).await.unwrap(), Toggle::Present);
        assert_eq!(service.toggle(1, KEY).await.unwrap(), Toggle::Absent);
    }

    #[tokio::test]
    async fn like_race_collapses_to_present() {
        let mut likes = MockLikeRepository::new();
        likes.expect_find_like().returning(|_, _| Ok(None));
        likes
            .expect_insert_like()
            .returning(|_, _| Err(DomainError::Conflict("likes_user_media_key".to_owned())));

        let toggle = LikeService::new(Arc::new(likes)).toggle(1, KEY).await.unwrap();
        assert_eq!(toggle, Toggle::Present);
    }

    #[tokio::test]
    async fn like_storage_failure_is_not_swallowed() {
        let mut likes = MockLikeRepository::new();
        likes.expect_find_like().returning(|_, _| Ok(None));
        likes
            .expect_insert_like()
            .returning(|_, _| Err(DomainError::internal("connection reset")));

        let err = LikeService::new(Arc::new(likes)).toggle(1, KEY).await.unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
    }

    #[tokio::test]
    async fn watchlist_race_collapses_to_present() {
        let mut watchlist = MockWatchlistRepository::new();
        watchlist.expect_find_watchlist_entry().returning(|_, _| Ok(None));
        watchlist
            .expect_insert_watchlist_entry()
            .returning(|_, _| Err(DomainError::Conflict("watchlist_user_media_key".to_owned())));

        let toggle = WatchlistService::new(Arc::new(watchlist)).toggle(3, KEY).await.unwrap();
        assert!(toggle.is_present());
    }

    #[tokio::test]
    async fn visibility_is_applied_in_bulk() {
        let mut watchlist = MockWatchlistRepository::new();
        watchlist
            .expect_set_watchlist_visibility()
            .with(eq(3), eq(false))
            .returning(|_, _| Ok(4));

        let updated = WatchlistService::new(Arc::new(watchlist))
            .set_visibility(3, false)
            .await
            .unwrap();
        assert_eq!(updated, 4);
    }
}
