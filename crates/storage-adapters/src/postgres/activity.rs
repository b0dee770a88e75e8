//! Ratings, likes and watchlist rows: one per (user, media_id, media_type).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::errors::{DomainError, Result};
use domains::models::{Like, MediaKey, Rating, UserId, WatchlistEntry};
use domains::ports::{LikeRepository, RatingRepository, WatchlistRepository};

use super::{db_error, media_type, PgStore};

const RATING_COLUMNS: &str = "id, user_id, media_id, media_type, score, created_at, updated_at";
const LIKE_COLUMNS: &str = "id, user_id, media_id, media_type, created_at";
const WATCHLIST_COLUMNS: &str = "id, user_id, media_id, media_type, is_public, created_at";

#[derive(sqlx::FromRow)]
struct RatingRow {
    id: i64,
    user_id: i64,
    media_id: i64,
    media_type: String,
    score: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<RatingRow> for Rating {
    type Error = DomainError;

    fn try_from(row: RatingRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            media_id: row.media_id,
            media_type: media_type(&row.media_type)?,
            score: row.score,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct LikeRow {
    id: i64,
    user_id: i64,
    media_id: i64,
    media_type: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<LikeRow> for Like {
    type Error = DomainError;

    fn try_from(row: LikeRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            media_id: row.media_id,
            media_type: media_type(&row.media_type)?,
            created_at: row.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct WatchlistRow {
    id: i64,
    user_id: i64,
    media_id: i64,
    media_type: String,
    is_public: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<WatchlistRow> for WatchlistEntry {
    type Error = DomainError;

    fn try_from(row: WatchlistRow) -> Result<Self> {
        Ok(Self {
            id: row.id,
            user_id: row.user_id,
            media_id: row.media_id,
            media_type: media_type(&row.media_type)?,
            is_public: row.is_public,
            created_at: row.created_at,
        })
    }
}

/// Converts fetched rows, failing on the first corrupt one.
pub(crate) fn convert_all<R, T>(rows: Vec<R>) -> Result<Vec<T>>
where
    T: TryFrom<R, Error = DomainError>,
{
    rows.into_iter().map(T::try_from).collect()
}

const KEY_FILTER: &str = "user_id = $1 AND media_id = $2 AND media_type = $3";

#[async_trait]
impl RatingRepository for PgStore {
    async fn find_rating(&self, user_id: UserId, key: MediaKey) -> Result<Option<Rating>> {
        let sql = format!("SELECT {RATING_COLUMNS} FROM ratings WHERE {KEY_FILTER}");
        sqlx::query_as::<_, RatingRow>(&sql)
            .bind(user_id)
            .bind(key.media_id)
            .bind(key.media_type.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .map(Rating::try_from)
            .transpose()
    }

    async fn insert_rating(&self, user_id: UserId, key: MediaKey, score: f64) -> Result<Rating> {
        let sql = format!(
            "INSERT INTO ratings (user_id, media_id, media_type, score) VALUES ($1, $2, $3, $4) \
             RETURNING {RATING_COLUMNS}"
        );
        sqlx::query_as::<_, RatingRow>(&sql)
            .bind(user_id)
            .bind(key.media_id)
            .bind(key.media_type.as_str())
            .bind(score)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?
            .try_into()
    }

    async fn update_rating(&self, rating_id: i64, score: f64) -> Result<Rating> {
        let sql = format!(
            "UPDATE ratings SET score = $2, updated_at = now() WHERE id = $1 RETURNING {RATING_COLUMNS}"
        );
        sqlx::query_as::<_, RatingRow>(&sql)
            .bind(rating_id)
            .bind(score)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .ok_or_else(|| DomainError::not_found("rating"))?
            .try_into()
    }

    async fn delete_rating(&self, user_id: UserId, key: MediaKey) -> Result<bool> {
        let sql = format!("DELETE FROM ratings WHERE {KEY_FILTER}");
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(key.media_id)
            .bind(key.media_type.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn ratings_for_user(&self, user_id: UserId) -> Result<Vec<Rating>> {
        let sql = format!(
            "SELECT {RATING_COLUMNS} FROM ratings WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, RatingRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        convert_all(rows)
    }

    async fn count_ratings(&self, user_id: UserId) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ratings WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)
    }
}

#[async_trait]
impl LikeRepository for PgStore {
    async fn find_like(&self, user_id: UserId, key: MediaKey) -> Result<Option<Like>> {
        let sql = format!("SELECT {LIKE_COLUMNS} FROM likes WHERE {KEY_FILTER}");
        sqlx::query_as::<_, LikeRow>(&sql)
            .bind(user_id)
            .bind(key.media_id)
            .bind(key.media_type.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .map(Like::try_from)
            .transpose()
    }

    async fn insert_like(&self, user_id: UserId, key: MediaKey) -> Result<Like> {
        let sql = format!(
            "INSERT INTO likes (user_id, media_id, media_type) VALUES ($1, $2, $3) RETURNING {LIKE_COLUMNS}"
        );
        sqlx::query_as::<_, LikeRow>(&sql)
            .bind(user_id)
            .bind(key.media_id)
            .bind(key.media_type.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?
            .try_into()
    }

    async fn delete_like(&self, user_id: UserId, key: MediaKey) -> Result<bool> {
        let sql = format!("DELETE FROM likes WHERE {KEY_FILTER}");
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(key.media_id)
            .bind(key.media_type.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn likes_for_user(&self, user_id: UserId) -> Result<Vec<Like>> {
        let sql = format!(
            "SELECT {LIKE_COLUMNS} FROM likes WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, LikeRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        convert_all(rows)
    }

    async fn count_likes(&self, user_id: UserId) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM likes WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)
    }
}

#[async_trait]
impl WatchlistRepository for PgStore {
    async fn find_watchlist_entry(&self, user_id: UserId, key: MediaKey) -> Result<Option<WatchlistEntry>> {
        let sql = format!("SELECT {WATCHLIST_COLUMNS} FROM watchlist WHERE {KEY_FILTER}");
        sqlx::query_as::<_, WatchlistRow>(&sql)
            .bind(user_id)
            .bind(key.media_id)
            .bind(key.media_type.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .map(WatchlistEntry::try_from)
            .transpose()
    }

    async fn insert_watchlist_entry(&self, user_id: UserId, key: MediaKey) -> Result<WatchlistEntry> {
        // The setting lives on the user; rows carry a copy of it.
        let sql = format!(
            "INSERT INTO watchlist (user_id, media_id, media_type, is_public) \
             VALUES ($1, $2, $3, COALESCE((SELECT watchlist_public FROM users WHERE id = $1), TRUE)) \
             RETURNING {WATCHLIST_COLUMNS}"
        );
        sqlx::query_as::<_, WatchlistRow>(&sql)
            .bind(user_id)
            .bind(key.media_id)
            .bind(key.media_type.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?
            .try_into()
    }

    async fn delete_watchlist_entry(&self, user_id: UserId, key: MediaKey) -> Result<bool> {
        let sql = format!("DELETE FROM watchlist WHERE {KEY_FILTER}");
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(key.media_id)
            .bind(key.media_type.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn watchlist_for_user(&self, user_id: UserId) -> Result<Vec<WatchlistEntry>> {
        let sql = format!(
            "SELECT {WATCHLIST_COLUMNS} FROM watchlist WHERE user_id = $1 ORDER BY created_at DESC, id DESC"
        );
        let rows = sqlx::query_as::<_, WatchlistRow>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        convert_all(rows)
    }

    async fn count_watchlist(&self, user_id: UserId) -> Result<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM watchlist WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)
    }

    async fn watchlist_visibility(&self, user_id: UserId) -> Result<bool> {
        let setting = sqlx::query_scalar::<_, bool>("SELECT watchlist_public FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(setting.unwrap_or(true))
    }

    async fn set_watchlist_visibility(&self, user_id: UserId, is_public: bool) -> Result<u64> {
        let mut tx = self.pool.begin().await.map_err(db_error)?;

        sqlx::query("UPDATE users SET watchlist_public = $2 WHERE id = $1")
            .bind(user_id)
            .bind(is_public)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        let result = sqlx::query("UPDATE watchlist SET is_public = $2 WHERE user_id = $1")
            .bind(user_id)
            .bind(is_public)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        Ok(result.rows_affected())
    }
}
