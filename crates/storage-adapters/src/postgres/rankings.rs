use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::errors::Result;
use domains::models::{RankedEntry, RankedItem, RankingKind, UserId};
use domains::ports::RankingRepository;

use super::{db_error, PgStore};

/// Each ranking lives in its own table with its own item column.
fn storage(kind: RankingKind) -> (&'static str, &'static str) {
    match kind {
        RankingKind::Movies => ("top_movies", "media_id"),
        RankingKind::Directors => ("top_directors", "person_id"),
        RankingKind::Actors => ("user_top_actors", "actor_id"),
    }
}

#[derive(sqlx::FromRow)]
struct RankedRow {
    user_id: i64,
    item_id: i64,
    position: i32,
    created_at: DateTime<Utc>,
}

impl From<RankedRow> for RankedEntry {
    fn from(row: RankedRow) -> Self {
        Self {
            user_id: row.user_id,
            item_id: row.item_id,
            order: row.position,
            created_at: row.created_at,
        }
    }
}

fn select_ranking(kind: RankingKind) -> String {
    let (table, column) = storage(kind);
    format!(
        "SELECT user_id, {column} AS item_id, position, created_at FROM {table} \
         WHERE user_id = $1 ORDER BY position, id"
    )
}

#[async_trait]
impl RankingRepository for PgStore {
    async fn replace_ranking(
        &self,
        user_id: UserId,
        kind: RankingKind,
        items: Vec<RankedItem>,
    ) -> Result<Vec<RankedEntry>> {
        let (table, column) = storage(kind);
        let (ids, positions): (Vec<i64>, Vec<i32>) =
            items.iter().map(|item| (item.item_id, item.order)).unzip();

        let mut tx = self.pool.begin().await.map_err(db_error)?;

        // Serializes replaces per user: the DELETE below must see rows a
        // concurrent replace committed, or both item sets survive.
        sqlx::query("SELECT 1 FROM users WHERE id = $1 FOR NO KEY UPDATE")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_error)?;

        sqlx::query(&format!("DELETE FROM {table} WHERE user_id = $1"))
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;

        if !ids.is_empty() {
            sqlx::query(&format!(
                "INSERT INTO {table} (user_id, {column}, position) \
                 SELECT $1, item, pos FROM UNNEST($2::bigint[], $3::int[]) AS t(item, pos)"
            ))
            .bind(user_id)
            .bind(&ids)
            .bind(&positions)
            .execute(&mut *tx)
            .await
            .map_err(db_error)?;
        }

        let rows = sqlx::query_as::<_, RankedRow>(&select_ranking(kind))
            .bind(user_id)
            .fetch_all(&mut *tx)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;
        Ok(rows.into_iter().map(RankedEntry::from).collect())
    }

    async fn ranking_for_user(&self, user_id: UserId, kind: RankingKind) -> Result<Vec<RankedEntry>> {
        let rows = sqlx::query_as::<_, RankedRow>(&select_ranking(kind))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(RankedEntry::from).collect())
    }

    async fn remove_ranked(&self, user_id: UserId, kind: RankingKind, item_id: i64) -> Result<bool> {
        let (table, column) = storage(kind);
        let result = sqlx::query(&format!("DELETE FROM {table} WHERE user_id = $1 AND {column} = $2"))
            .bind(user_id)
            .bind(item_id)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected() > 0)
    }
}
