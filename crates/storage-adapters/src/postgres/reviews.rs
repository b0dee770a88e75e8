use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::errors::{DomainError, Result};
use domains::models::{AuthoredReview, MediaKey, Page, PageRequest, PublicUser, Review, UserId};
use domains::ports::ReviewRepository;

use super::activity::convert_all;
use super::{db_error, media_type, PgStore};

const REVIEW_COLUMNS: &str = "id, user_id, media_id, media_type, review_text, created_at, updated_at";

const AUTHORED_SELECT: &str = "SELECT r.id, r.user_id, r.media_id, r.media_type, r.review_text, \
     r.created_at, r.updated_at, u.username, u.profile_picture, u.slogan, \
     u.created_at AS user_created_at \
     FROM reviews r JOIN users u ON u.id = r.user_id";

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: i64,
    user_id: i64,
    media_id: i64,
    media_type: String,
    review_text: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
    type Error = DomainError;

    fn try_from(row: ReviewRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            media_id: row.media_id,
            media_type: media_type(&row.media_type)?,
            review_text: row.review_text,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AuthoredRow {
    #[sqlx(flatten)]
    review: ReviewRow,
    username: String,
    profile_picture: Option<String>,
    slogan: Option<String>,
    user_created_at: DateTime<Utc>,
}

impl TryFrom<AuthoredRow> for AuthoredReview {
    type Error = DomainError;

    fn try_from(row: AuthoredRow) -> Result<Self> {
        let author = PublicUser {
            id: row.review.user_id,
            username: row.username,
            profile_picture: row.profile_picture,
            slogan: row.slogan,
            created_at: row.user_created_at,
        };
        Ok(Self {
            review: row.review.try_into()?,
            author,
        })
    }
}

#[async_trait]
impl ReviewRepository for PgStore {
    async fn find_review(&self, user_id: UserId, key: MediaKey) -> Result<Option<Review>> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE user_id = $1 AND media_id = $2 AND media_type = $3"
        );
        sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(user_id)
            .bind(key.media_id)
            .bind(key.media_type.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .map(Review::try_from)
            .transpose()
    }

    async fn insert_review(&self, user_id: UserId, key: MediaKey, text: String) -> Result<Review> {
        let sql = format!(
            "INSERT INTO reviews (user_id, media_id, media_type, review_text) VALUES ($1, $2, $3, $4) \
             RETURNING {REVIEW_COLUMNS}"
        );
        sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(user_id)
            .bind(key.media_id)
            .bind(key.media_type.as_str())
            .bind(text)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?
            .try_into()
    }

    async fn update_review(&self, review_id: i64, text: String) -> Result<Review> {
        let sql = format!(
            "UPDATE reviews SET review_text = $2, updated_at = now() WHERE id = $1 RETURNING {REVIEW_COLUMNS}"
        );
        sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(review_id)
            .bind(text)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or_else(|| DomainError::not_found("review"))?
            .try_into()
    }

    async fn delete_review(&self, user_id: UserId, key: MediaKey) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM reviews WHERE user_id = $1 AND media_id = $2 AND media_type = $3",
        )
        .bind(user_id)
        .bind(key.media_id)
        .bind(key.media_type.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn reviews_for_media(&self, key: MediaKey) -> Result<Vec<AuthoredReview>> {
        let sql = format!(
            "{AUTHORED_SELECT} WHERE r.media_id = $1 AND r.media_type = $2 \
             ORDER BY r.created_at DESC, r.id DESC"
        );
        let rows = sqlx::query_as::<_, AuthoredRow>(&sql)
            .bind(key.media_id)
            .bind(key.media_type.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        convert_all(rows)
    }

    async fn reviews_by_user(&self, user_id: UserId) -> Result<Vec<Review>> {
        let sql = format!(
            "SELECT {REVIEW_COLUMNS} FROM reviews WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, ReviewRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        convert_all(rows)
    }

    async fn recent_reviews(&self, page: PageRequest) -> Result<Page<AuthoredReview>> {
        let sql = format!("{AUTHORED_SELECT} ORDER BY r.created_at DESC, r.id DESC LIMIT $1 OFFSET $2");
        let rows = sqlx::query_as::<_, AuthoredRow>(&sql)
            .bind(i64::from(page.limit))
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reviews")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(Page::new(convert_all(rows)?, page, total))
    }

    async fn count_reviews(&self, user_id: UserId) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM reviews WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)
    }
}
