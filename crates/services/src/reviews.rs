//! Reviews: one per (user, media item), create-or-overwrite, plus the
//! per-media feed where every row is enriched with the author's own rating
//! and like for the same item.

use std::sync::Arc;

use domains::errors::{DomainError, Result};
use domains::models::{AuthoredReview, EnrichedReview, MediaKey, Page, PageRequest, Review, Upserted, UserId};
use domains::ports::{LikeRepository, RatingRepository, ReviewRepository};
use tracing::{instrument, warn};

use crate::validation;

pub struct ReviewService {
    reviews: Arc<dyn ReviewRepository>,
    ratings: Arc<dyn RatingRepository>,
    likes: Arc<dyn LikeRepository>,
}

impl ReviewService {
    pub fn new(
        reviews: Arc<dyn ReviewRepository>,
        ratings: Arc<dyn RatingRepository>,
        likes: Arc<dyn LikeRepository>,
    ) -> Self {
        Self {
            reviews,
            ratings,
            likes,
        }
    }

    #[instrument(skip(self, text))]
    pub async fn upsert(&self, user_id: UserId, key: MediaKey, text: &str) -> Result<Upserted<Review>> {
        let text = validation::required_text("reviewText", text, validation::REVIEW_MAX)?;
        validation::positive_id("mediaId", key.media_id)?;

        if let Some(existing) = self.reviews.find_review(user_id, key).await? {
            return Ok(Upserted::Updated(self.reviews.update_review(existing.id, text).await?));
        }

        match self.reviews.insert_review(user_id, key, text.clone()).await {
            Ok(review) => Ok(Upserted::Created(review)),
            Err(DomainError::Conflict(_)) => {
                warn!("concurrent review insert, overwriting the winner");
                let existing = self
                    .reviews
                    .find_review(user_id, key)
                    .await?
                    .ok_or_else(|| DomainError::internal("review vanished after conflict"))?;
                Ok(Upserted::Updated(self.reviews.update_review(existing.id, text).await?))
            }
            Err(err) => Err(err),
        }
    }

    pub async fn own(&self, user_id: UserId, key: MediaKey) -> Result<Review> {
        self.reviews
            .find_review(user_id, key)
            .await?
            .ok_or_else(|| DomainError::not_found("review"))
    }

    #[instrument(skip(self))]
    pub async fn remove(&self, user_id: UserId, key: MediaKey) -> Result<()> {
        if self.reviews.delete_review(user_id, key).await? {
            Ok(())
        } else {
            Err(DomainError::not_found("review"))
        }
    }

    /// Every review of the item, newest first, each carrying the author's
    /// rating and like state. One rating and one like lookup per row.
    pub async fn for_media(&self, key: MediaKey) -> Result<Vec<EnrichedReview>> {
        let authored = self.reviews.reviews_for_media(key).await?;
        let mut enriched = Vec::with_capacity(authored.len());
        for AuthoredReview { review, author } in authored {
            let rating = self.ratings.find_rating(author.id, key).await?.map(|r| r.score);
            let has_liked = self.likes.find_like(author.id, key).await?.is_some();
            enriched.push(EnrichedReview {
                review,
                author,
                rating,
                has_liked,
            });
        }
        Ok(enriched)
    }

    pub async fn recent(&self, page: PageRequest) -> Result<Page<AuthoredReview>> {
        self.reviews.recent_reviews(page).await
    }
}
